//! In-memory deployment archives

use std::io::{Cursor, Write};

use quick_xml::se::Serializer;
use scratchforce_domain::{ForceError, Result};
use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::InfraError;

pub const METADATA_NAMESPACE: &str = "http://soap.sforce.com/2006/04/metadata";
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Render `value` as an indented metadata XML document rooted at `root`.
pub fn render_xml<T: Serialize>(root: &str, value: &T) -> Result<String> {
    let mut document = String::from(XML_DECLARATION);
    document.push('\n');

    let mut serializer = Serializer::with_root(&mut document, Some(root))
        .map_err(|e| ForceError::from(InfraError::from(e)))?;
    serializer.indent(' ', 4);
    value.serialize(serializer).map_err(|e| ForceError::from(InfraError::from(e)))?;

    Ok(document)
}

/// Zip archive assembled in memory
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    entries: Vec<String>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            entries: Vec::new(),
        }
    }

    /// Add one file. Paths use `/` separators and must be unique.
    pub fn add_file(&mut self, path: &str, contents: &[u8]) -> Result<()> {
        if self.entries.iter().any(|entry| entry == path) {
            return Err(ForceError::Archive(format!("duplicate archive entry '{path}'")));
        }

        self.writer
            .start_file(path, self.options)
            .map_err(|e| ForceError::from(InfraError::from(e)))?;
        self.writer.write_all(contents).map_err(|e| ForceError::from(InfraError::from(e)))?;
        self.entries.push(path.to_string());
        Ok(())
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Close the archive and return its bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self.writer.finish().map_err(|e| ForceError::from(InfraError::from(e)))?;
        Ok(cursor.into_inner())
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `package.xml` manifest
#[derive(Debug, Clone, Serialize)]
pub struct PackageManifest {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    types: Vec<PackageTypes>,
    version: String,
}

#[derive(Debug, Clone, Serialize)]
struct PackageTypes {
    members: String,
    name: String,
}

impl PackageManifest {
    pub fn new(version: impl Into<String>) -> Self {
        Self { xmlns: METADATA_NAMESPACE, types: Vec::new(), version: version.into() }
    }

    /// Declare one member of a metadata type, e.g. `Security` of `Settings`.
    pub fn with_member(mut self, member: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.types.push(PackageTypes { members: member.into(), name: type_name.into() });
        self
    }

    pub fn render(&self) -> Result<String> {
        render_xml("Package", self)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use zip::ZipArchive;

    use super::*;

    #[test]
    fn test_archive_round_trips_entries() {
        let mut builder = ArchiveBuilder::new();
        builder.add_file("package.xml", b"<Package/>").unwrap();
        builder.add_file("settings/Quote.settings", b"<QuoteSettings/>").unwrap();
        let bytes = builder.finish().unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut contents = String::new();
        archive.by_name("settings/Quote.settings").unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "<QuoteSettings/>");
    }

    #[test]
    fn test_duplicate_entries_are_rejected() {
        let mut builder = ArchiveBuilder::new();
        builder.add_file("package.xml", b"a").unwrap();

        let err = builder.add_file("package.xml", b"b").unwrap_err();
        assert!(matches!(err, ForceError::Archive(_)));
        assert_eq!(builder.entries().len(), 1);
    }

    #[test]
    fn test_manifest_lists_members_and_version() {
        let xml = PackageManifest::new("53.0")
            .with_member("Security", "Settings")
            .with_member("Quote", "Settings")
            .render()
            .unwrap();

        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains(r#"<Package xmlns="http://soap.sforce.com/2006/04/metadata">"#));
        assert!(xml.contains("<members>Security</members>"));
        assert!(xml.contains("<members>Quote</members>"));
        assert_eq!(xml.matches("<name>Settings</name>").count(), 2);
        assert!(xml.contains("<version>53.0</version>"));
        assert!(xml.find("Security").unwrap() < xml.find("Quote").unwrap());
    }
}
