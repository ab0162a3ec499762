use crate::Importer;
use crate::importer::{JsonSidecarImporter, MediaTagsImporter, MediaUrlsImporter, TxtSidecarImporter};
use std::sync::LazyLock;
use tagport_query::JsonFormula;
use tagport_serialise::error::Result;
use tagport_serialise::{Registry, validate};
use tagport_strings::{StringConverter, StringMatch, StringProcessor, StringSplitter};

static IMPORTERS: LazyLock<Registry<Importer>> = LazyLock::new(|| {
    // Migration tables are constants, so this only fails on a programming error.
    build().unwrap()
});

/// Every importer type, keyed by type tag. Built on first use and never
/// changed afterwards.
pub fn importers() -> &'static Registry<Importer> {
    &IMPORTERS
}

/// Nested types first, then the importers embedding them.
fn build() -> Result<Registry<Importer>> {
    validate::<StringConverter>()?;
    validate::<StringMatch>()?;
    validate::<StringSplitter>()?;
    validate::<StringProcessor>()?;
    validate::<JsonFormula>()?;
    Ok(Registry::builder()
        .register::<MediaTagsImporter>(Importer::MediaTags)?
        .register::<MediaUrlsImporter>(Importer::MediaUrls)?
        .register::<JsonSidecarImporter>(Importer::JsonSidecar)?
        .register::<TxtSidecarImporter>(Importer::TxtSidecar)?
        .build())
}
