//! Serialization of node trees, and the gzip framing around it.

use std::io::{Read, Write};
use std::sync::Arc;

use bytes::Bytes;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use bundlefs_tree::{Metadata, Node, NodeKind};

use crate::{Bundle, DecodeError, EncodeError};

const KIND_FILE: u8 = 0x00;
const KIND_DIR: u8 = 0x01;

/// Decode a bundle into a node tree.
///
/// Decompresses the body, then parses the serialized tree in one forward
/// pass. The top-level node must be a directory. On error nothing
/// caller-visible has been mutated; the partial tree is simply dropped.
pub fn decode(bundle: &Bundle) -> Result<Arc<Node>, DecodeError> {
    let mut data = Vec::new();
    GzDecoder::new(bundle.body())
        .read_to_end(&mut data)
        .map_err(DecodeError::Compression)?;

    let mut reader = Reader {
        buf: &data,
        pos: 0,
    };
    let root = decode_node(&mut reader, 0)?;
    if reader.remaining() > 0 {
        return Err(DecodeError::TrailingBytes(reader.remaining()));
    }
    Ok(root)
}

/// Encode a directory-rooted tree into a compressed bundle body.
pub fn encode(root: &Arc<Node>) -> Result<Bytes, EncodeError> {
    if !root.is_dir() {
        return Err(EncodeError::RootNotDirectory);
    }
    let mut raw = Vec::new();
    encode_node(root, &mut raw);

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw)?;
    Ok(Bytes::from(encoder.finish()?))
}

fn encode_node(node: &Arc<Node>, out: &mut Vec<u8>) {
    out.push(match node.kind() {
        NodeKind::File => KIND_FILE,
        NodeKind::Dir => KIND_DIR,
    });
    let name = node.name().as_bytes();
    put_varint(name.len() as u64, out);
    out.extend_from_slice(name);

    let meta = node.metadata();
    out.extend_from_slice(&meta.modified.to_le_bytes());
    out.extend_from_slice(&meta.mode.to_le_bytes());

    match node.kind() {
        NodeKind::File => {
            let content = node.content();
            put_varint(content.len() as u64, out);
            out.extend_from_slice(&content);
        }
        NodeKind::Dir => {
            let children = node.children();
            put_varint(children.len() as u64, out);
            for child in &children {
                encode_node(child, out);
            }
        }
    }
}

fn decode_node(r: &mut Reader<'_>, depth: usize) -> Result<Arc<Node>, DecodeError> {
    let kind = r.u8()?;
    if depth == 0 && kind != KIND_DIR {
        return Err(DecodeError::RootNotDirectory);
    }

    let name_len = r.len_field()?;
    let name = std::str::from_utf8(r.bytes(name_len)?).map_err(|_| DecodeError::InvalidUtf8)?;
    let name = name.to_string();
    let meta = Metadata {
        modified: r.i64_le()?,
        mode: r.u32_le()?,
    };

    match kind {
        KIND_FILE => {
            let content_len = r.len_field()?;
            let content = r.bytes(content_len)?.to_vec();
            Ok(Node::file(name, meta, content)?)
        }
        KIND_DIR => {
            let node = if depth == 0 && name.is_empty() {
                // Only the synthetic root may carry an empty name.
                Node::root(meta)
            } else {
                Node::dir(name, meta)?
            };
            let child_count = r.varint()?;
            for _ in 0..child_count {
                node.insert_child(decode_node(r, depth + 1)?)?;
            }
            Ok(node)
        }
        other => Err(DecodeError::InvalidKind { kind: other }),
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        let b = *self.buf.get(self.pos).ok_or(DecodeError::Truncated)?;
        self.pos += 1;
        Ok(b)
    }

    fn bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining() {
            return Err(DecodeError::Truncated);
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u32_le(&mut self) -> Result<u32, DecodeError> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.bytes(4)?);
        Ok(u32::from_le_bytes(raw))
    }

    fn i64_le(&mut self) -> Result<i64, DecodeError> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.bytes(8)?);
        Ok(i64::from_le_bytes(raw))
    }

    /// LEB128 unsigned integer.
    fn varint(&mut self) -> Result<u64, DecodeError> {
        let mut value: u64 = 0;
        let mut shift = 0;
        loop {
            let byte = self.u8()?;
            if shift == 63 && byte > 0x01 {
                return Err(DecodeError::VarintOverflow);
            }
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    /// A varint that measures a byte run still to come; anything larger
    /// than the remaining input is a truncation.
    fn len_field(&mut self) -> Result<usize, DecodeError> {
        let v = self.varint()?;
        let n = usize::try_from(v).map_err(|_| DecodeError::Truncated)?;
        if n > self.remaining() {
            return Err(DecodeError::Truncated);
        }
        Ok(n)
    }
}

fn put_varint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundlefs_tree::path;

    fn gz(raw: &[u8]) -> Bundle {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(raw).unwrap();
        Bundle::new("test", encoder.finish().unwrap())
    }

    fn sample_tree() -> Arc<Node> {
        let root = Node::root(Metadata::DIR_DEFAULT);
        let site = Node::dir(
            "website",
            Metadata {
                mode: 0o755,
                modified: 1700000000,
            },
        )
        .unwrap();
        site.insert_child(
            Node::file(
                "index.html",
                Metadata {
                    mode: 0o644,
                    modified: 1700000001,
                },
                "<html></html>",
            )
            .unwrap(),
        )
        .unwrap();
        site.insert_child(Node::dir("css", Metadata::DIR_DEFAULT).unwrap())
            .unwrap();
        root.insert_child(site).unwrap();
        root.insert_child(
            Node::file("message.txt", Metadata::FILE_DEFAULT, "hello world").unwrap(),
        )
        .unwrap();
        root
    }

    #[test]
    fn round_trip_preserves_structure() {
        let root = sample_tree();
        let bundle = Bundle::new("assets", encode(&root).unwrap());
        let decoded = decode(&bundle).unwrap();
        assert_eq!(*decoded, *root);
    }

    #[test]
    fn round_trip_preserves_child_order() {
        let root = sample_tree();
        let decoded = decode(&Bundle::new("assets", encode(&root).unwrap())).unwrap();
        let site = decoded.lookup(&path!("website")).unwrap();
        let children = site.children();
        let names: Vec<&str> = children.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["index.html", "css"]);
    }

    #[test]
    fn round_trip_large_content() {
        let root = Node::root(Metadata::DIR_DEFAULT);
        let blob: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        root.insert_child(Node::file("blob.bin", Metadata::FILE_DEFAULT, blob.clone()).unwrap())
            .unwrap();
        let decoded = decode(&Bundle::new("big", encode(&root).unwrap())).unwrap();
        assert_eq!(
            &decoded.lookup(&path!("blob.bin")).unwrap().content()[..],
            &blob[..]
        );
    }

    #[test]
    fn wire_layout_is_stable() {
        let root = Node::root(Metadata { mode: 0o755, modified: 0 });
        root.insert_child(
            Node::file(
                "a",
                Metadata {
                    mode: 0o644,
                    modified: 1700000000,
                },
                "hi",
            )
            .unwrap(),
        )
        .unwrap();

        let mut raw = Vec::new();
        encode_node(&root, &mut raw);
        assert_eq!(
            raw,
            vec![
                0x01, // dir
                0x00, // empty root name
                0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // mtime 0
                0xed, 0x01, 0x00, 0x00, // mode 0o755
                0x01, // one child
                0x00, // file
                0x01, b'a', // name
                0x00, 0xf1, 0x53, 0x65, 0x00, 0x00, 0x00, 0x00, // mtime 1700000000
                0xa4, 0x01, 0x00, 0x00, // mode 0o644
                0x02, b'h', b'i', // content
            ]
        );
    }

    #[test]
    fn encode_rejects_file_root() {
        let file = Node::file("f", Metadata::FILE_DEFAULT, "x").unwrap();
        assert!(matches!(
            encode(&file),
            Err(EncodeError::RootNotDirectory)
        ));
    }

    #[test]
    fn decode_rejects_file_root() {
        // kind=file, empty name, zeroed header, empty content
        let raw = [
            0x00, 0x00, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x00,
        ];
        assert!(matches!(
            decode(&gz(&raw)),
            Err(DecodeError::RootNotDirectory)
        ));
    }

    #[test]
    fn decode_rejects_bad_gzip() {
        let bundle = Bundle::new("junk", &b"definitely not gzip"[..]);
        assert!(matches!(
            decode(&bundle),
            Err(DecodeError::Compression(_))
        ));
    }

    #[test]
    fn decode_rejects_truncation_at_every_point() {
        let full = encode(&sample_tree()).unwrap();
        let mut raw = Vec::new();
        GzDecoder::new(&full[..]).read_to_end(&mut raw).unwrap();

        for cut in 0..raw.len() {
            let err = decode(&gz(&raw[..cut])).unwrap_err();
            assert!(
                matches!(err, DecodeError::Truncated),
                "cut at {} produced {:?}",
                cut,
                err
            );
        }
    }

    #[test]
    fn decode_rejects_invalid_kind() {
        let raw = [
            0x01, 0x00, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01, // root dir, one child
            0x07, // bogus kind flag
            0x01, b'a', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x00,
        ];
        assert!(matches!(
            decode(&gz(&raw)),
            Err(DecodeError::InvalidKind { kind: 0x07 })
        ));
    }

    #[test]
    fn decode_rejects_separator_in_name() {
        let raw = [
            0x01, 0x00, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01, //
            0x00, 0x03, b'a', b'/', b'b', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x00,
        ];
        assert!(matches!(
            decode(&gz(&raw)),
            Err(DecodeError::InvalidName { .. })
        ));
    }

    #[test]
    fn decode_rejects_empty_child_name() {
        let raw = [
            0x01, 0x00, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01, //
            0x00, 0x00, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x00,
        ];
        assert!(matches!(
            decode(&gz(&raw)),
            Err(DecodeError::InvalidName { .. })
        ));
    }

    #[test]
    fn decode_rejects_duplicate_siblings() {
        let root = Node::root(Metadata::DIR_DEFAULT);
        root.insert_child(Node::file("a", Metadata::FILE_DEFAULT, "1").unwrap())
            .unwrap();

        // Re-encode the single child twice by hand.
        let mut raw = Vec::new();
        encode_node(&root, &mut raw);
        let mut child = Vec::new();
        encode_node(&root.child("a").unwrap(), &mut child);
        raw[14] = 0x02; // child count
        raw.extend_from_slice(&child);

        assert!(matches!(
            decode(&gz(&raw)),
            Err(DecodeError::DuplicateName { .. })
        ));
    }

    #[test]
    fn decode_rejects_trailing_bytes() {
        let mut raw = Vec::new();
        encode_node(&Node::root(Metadata::DIR_DEFAULT), &mut raw);
        raw.extend_from_slice(&[0xaa, 0xbb]);
        assert!(matches!(
            decode(&gz(&raw)),
            Err(DecodeError::TrailingBytes(2))
        ));
    }

    #[test]
    fn decode_rejects_invalid_utf8_name() {
        let raw = [
            0x01, 0x00, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01, //
            0x00, 0x02, 0xff, 0xfe, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x00,
        ];
        assert!(matches!(decode(&gz(&raw)), Err(DecodeError::InvalidUtf8)));
    }

    #[test]
    fn varint_round_trip() {
        for value in [0u64, 1, 127, 128, 300, 16384, u32::MAX as u64, u64::MAX] {
            let mut out = Vec::new();
            put_varint(value, &mut out);
            let mut r = Reader { buf: &out, pos: 0 };
            assert_eq!(r.varint().unwrap(), value);
            assert_eq!(r.remaining(), 0);
        }
    }

    #[test]
    fn varint_overflow_rejected() {
        let mut r = Reader {
            buf: &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02],
            pos: 0,
        };
        assert!(matches!(r.varint(), Err(DecodeError::VarintOverflow)));
    }

    #[test]
    fn oversized_length_field_is_truncation() {
        // Root claims a name longer than the remaining input.
        let raw = [0x01, 0x7f, b'x'];
        assert!(matches!(decode(&gz(&raw)), Err(DecodeError::Truncated)));
    }

    #[test]
    fn empty_root_round_trips() {
        let root = Node::root(Metadata::DIR_DEFAULT);
        let decoded = decode(&Bundle::new("empty", encode(&root).unwrap())).unwrap();
        assert_eq!(decoded.child_count(), 0);
        assert!(decoded.is_dir());
        assert_eq!(decoded.name(), "");
    }
}
