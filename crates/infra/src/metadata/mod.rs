//! Metadata deployment archives
//!
//! Zip packaging plus the XML documents deployed to new environments.

pub mod archive;
pub mod settings;

pub use archive::{render_xml, ArchiveBuilder, PackageManifest};
pub use settings::SettingsArchivePackager;
