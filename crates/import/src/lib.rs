//! Metadata importers.
//!
//! An [`Importer`] pulls an ordered list of strings out of one source: a
//! file's tags or URLs (through [`MediaRecord`]), or a JSON or text sidecar
//! file whose name is derived from the target file's. The result optionally
//! runs through the importer's [`StringProcessor`](tagport_strings::StringProcessor).
//!
//! Importers persist as versioned blobs; [`importers()`] loads any released
//! version of any of them.
//!
//! ```
//! use tagport_import::{Importer, Source, TxtSidecarImporter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = tempfile::tempdir()?;
//! std::fs::write(dir.path().join("photo.jpg.txt"), "blue eyes\nblonde hair\n\nskirt")?;
//!
//! let importer = Importer::from(TxtSidecarImporter::default());
//! let strings = importer.import(Source::File(&dir.path().join("photo.jpg")))?;
//! assert_eq!(strings, vec!["blue eyes", "blonde hair", "skirt"]);
//! # Ok(())
//! # }
//! ```

pub mod error;
mod importer;
mod key;
mod media;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod registry;
mod sidecar;

pub use crate::importer::{
    Importer, JsonSidecarImporter, MediaTagsImporter, MediaUrlsImporter, Source, TxtSidecarImporter, split_lines,
};
pub use crate::key::{COMBINED_TAG_SERVICE_KEY, ServiceKey};
pub use crate::media::{MediaRecord, ServiceRegistry};
pub use crate::registry::importers;
pub use crate::sidecar::{Sidecar, SidecarImporter, sidecar_path};
