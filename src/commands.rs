use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::{fs, io};
use tagport_import::{Importer, ServiceRegistry, Source};
use tagport_serialise::VersionedBlob;
use tracing::{info, instrument, warn};

/// Runs every sidecar importer over each file, writing `file<TAB>value` lines.
#[instrument(skip_all, fields(files = files.len(), importers = importers.len()))]
pub fn import(importers: &[Importer], files: &[PathBuf], out: &mut impl Write) -> Result<()> {
    for importer in importers.iter().filter(|importer| importer.sidecar().is_none()) {
        warn!(importer = %importer.tag(), "skipping importer: media records are not available here");
    }
    for file in files {
        for importer in importers.iter().filter(|importer| importer.sidecar().is_some()) {
            let strings = importer.import(Source::File(file)).or_raise(|| ErrorKind::Import(file.clone()))?;
            info!(file = %file.display(), importer = %importer.tag(), count = strings.len(), "imported");
            for string in strings {
                writeln!(out, "{}\t{string}", file.display()).or_raise(|| ErrorKind::Output)?;
            }
        }
    }
    Ok(())
}

/// Writes `file<TAB>sidecar<TAB>exists|missing` for every sidecar importer.
pub fn sidecars(importers: &[Importer], files: &[PathBuf], out: &mut impl Write) -> Result<()> {
    for file in files {
        for importer in importers {
            let path = importer.expected_sidecar_path(file).or_raise(|| ErrorKind::Import(file.clone()))?;
            let Some(path) = path else { continue };
            let state = if path.exists() { "exists" } else { "missing" };
            writeln!(out, "{}\t{}\t{state}", file.display(), path.display()).or_raise(|| ErrorKind::Output)?;
        }
    }
    Ok(())
}

pub fn describe(importers: &[Importer], services: &dyn ServiceRegistry, out: &mut impl Write) -> Result<()> {
    for (i, importer) in importers.iter().enumerate() {
        writeln!(out, "{i}\t{}", importer.describe(services)).or_raise(|| ErrorKind::Output)?;
    }
    Ok(())
}

/// Loads a blob of any released version and writes it back out at the current
/// one, nested objects included.
#[instrument(skip_all, fields(source = %source.display()))]
pub fn migrate(source: &Path, out: &mut impl Write) -> Result<()> {
    let text = read_source(source).or_raise(|| ErrorKind::ReadBlob(source.display().to_string()))?;
    let blob = VersionedBlob::from_json(&text).or_raise(|| ErrorKind::Migrate)?;
    info!(tag = %blob.tag, version = blob.version, "upgrading");
    let importer = Importer::from_blob(blob).or_raise(|| ErrorKind::Migrate)?;
    writeln!(out, "{}", importer.to_blob().to_json()).or_raise(|| ErrorKind::Output)
}

/// `-` is standard input.
fn read_source(source: &Path) -> io::Result<String> {
    if source == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    fs::read_to_string(source)
}
