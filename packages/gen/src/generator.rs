//! Emitting the registration source for a bundle.

use std::io::Write;

use bundlefs_codec::Bundle;

use crate::{Error, FileSystem};

/// Options that shape the generated source text.
///
/// They never affect runtime behavior; the bundle bytes are identical
/// whatever these are set to.
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    /// Module identifier the generated code is wrapped in. Required;
    /// composing with an empty value is an error.
    pub package: String,
    /// Directory the generated `<bundle>.rs` file is written into.
    pub output: std::path::PathBuf,
    /// Emit human-readable documentation comments. Default off.
    pub include_docs: bool,
}

/// Emits a Rust source file that registers one bundle at startup.
pub struct Generator<'a> {
    pub fs: &'a dyn FileSystem,
    pub config: GeneratorConfig,
}

impl Generator<'_> {
    /// Write `<bundle>.rs` through the filesystem capability.
    ///
    /// The emitted file wraps a `register()` function and the compressed
    /// bundle bytes in `pub mod <package>`; the application calls
    /// `register()` once during startup.
    pub fn compose(&self, bundle: &Bundle) -> Result<(), Error> {
        let package = self.config.package.as_str();
        if package.is_empty() {
            return Err(Error::MissingPackage);
        }
        if !is_identifier(package) {
            return Err(Error::InvalidPackage {
                name: package.to_string(),
            });
        }

        let filename = self.config.output.join(format!("{}.rs", bundle.name()));
        let source = render(package, bundle, self.config.include_docs);

        let mut out = self.fs.open_write(&filename)?;
        out.write_all(source.as_bytes())?;
        out.flush()?;
        log::debug!("wrote {}", filename.display());
        Ok(())
    }
}

fn render(package: &str, bundle: &Bundle, include_docs: bool) -> String {
    let mut src = String::new();
    if include_docs {
        src.push_str("// Code generated by bfsgen; DO NOT EDIT.\n\n");
        src.push_str(&format!(
            "/// Embedded resource bundle `{}`.\n",
            bundle.name()
        ));
    }
    src.push_str(&format!("pub mod {} {{\n", package));
    if include_docs {
        src.push_str("    /// Registers the bundle with the process-wide bundlefs registry.\n");
        src.push_str("    ///\n");
        src.push_str("    /// Call once during startup, before the first `bundlefs::open`.\n");
    }
    src.push_str(
        "    pub fn register() -> Result<bundlefs::MergeOutcome, bundlefs::Error> {\n",
    );
    src.push_str("        bundlefs::add_resource(bundlefs::Bundle::new(NAME, &BODY[..]))\n");
    src.push_str("    }\n\n");
    src.push_str(&format!("    const NAME: &str = {:?};\n\n", bundle.name()));
    src.push_str(&format!("    static BODY: [u8; {}] = [\n", bundle.body().len()));
    for chunk in bundle.body().chunks(12) {
        src.push_str("        ");
        for byte in chunk {
            src.push_str(&format!("{:#04x}, ", byte));
        }
        // Drop the trailing space, keep the comma.
        src.pop();
        src.push('\n');
    }
    src.push_str("    ];\n");
    src.push_str("}\n");
    src
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
