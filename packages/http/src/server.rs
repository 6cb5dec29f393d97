//! Response assembly for serving a directory view.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Response, StatusCode};

use bundlefs_registry::Dir;
use bundlefs_tree::{Node, NodeKind, Path};

use crate::Error;

/// Serves one directory view as static content.
///
/// The server is synchronous and framework-agnostic: it maps a request
/// path to a complete `http::Response`, leaving transport to whatever
/// generic server the application already runs. Files are served with a
/// mime type guessed from their name; directories render their
/// `index.html` when present and an HTML index otherwise; anything absent
/// is a `404` in plain text.
pub struct ResourceServer {
    root: Dir,
}

impl ResourceServer {
    pub fn new(root: Dir) -> Self {
        ResourceServer { root }
    }

    /// Build the response for a request path.
    ///
    /// `Err` only signals response assembly failure; missing resources are
    /// the 404 response, not an error.
    pub fn respond(&self, path: &str) -> Result<Response<Bytes>, Error> {
        let parsed = Path::parse(path);
        let node = match self.root.lookup(&parsed) {
            Some(node) => node,
            None => return not_found(),
        };

        if !node.is_dir() {
            return file_response(&node);
        }
        if let Some(index) = node.child("index.html").filter(|n| !n.is_dir()) {
            return file_response(&index);
        }
        let listing = self.render_listing(&parsed)?;
        Ok(Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, "text/html; charset=utf-8")
            .body(Bytes::from(listing))?)
    }

    /// Serialize the listing of the directory at `path` as JSON.
    pub fn entries_json(&self, path: &str) -> Result<String, Error> {
        let entries = self.root.entries_at(&Path::parse(path))?;
        Ok(serde_json::to_string(&entries)?)
    }

    fn render_listing(&self, path: &Path) -> Result<String, Error> {
        let mut html = String::new();
        let title = format!("/{}", path);
        html.push_str("<!DOCTYPE html>\n<html>\n<head><title>Index of ");
        html.push_str(&escape_html(&title));
        html.push_str("</title></head>\n<body>\n<h1>Index of ");
        html.push_str(&escape_html(&title));
        html.push_str("</h1>\n<ul>\n");
        for entry in self.root.entries_at(path)? {
            let display = if entry.kind == NodeKind::Dir {
                format!("{}/", entry.name)
            } else {
                entry.name.clone()
            };
            let escaped = escape_html(&display);
            html.push_str(&format!("<li><a href=\"{}\">{}</a></li>\n", escaped, escaped));
        }
        html.push_str("</ul>\n</body>\n</html>\n");
        Ok(html)
    }
}

fn file_response(node: &Node) -> Result<Response<Bytes>, Error> {
    let mime = mime_guess::from_path(node.name()).first_or_octet_stream();
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, mime.as_ref())
        .body(node.content())?)
}

fn not_found() -> Result<Response<Bytes>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(CONTENT_TYPE, "text/plain")
        .body(Bytes::from_static(b"404 page not found"))?)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
