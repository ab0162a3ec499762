use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::{fs, io};
use tagport_strings::StringConverter;
use tracing::debug;

/// Where a sidecar lives relative to the file it describes.
///
/// Resolution keeps the target's directory and only rewrites the file name:
///
/// 1. take the file name, or its stem when `remove_source_extension` is set,
/// 2. run it through `filename_converter`,
/// 3. append `suffix`, a dot, and the sidecar extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sidecar {
    remove_source_extension: bool,
    suffix: String,
    filename_converter: StringConverter,
}
impl Sidecar {
    pub fn new(remove_source_extension: bool, suffix: impl Into<String>, filename_converter: StringConverter) -> Self {
        Self {
            remove_source_extension,
            suffix: suffix.into(),
            filename_converter,
        }
    }

    /// Sidecar defaults: keep the extension, no suffix, no conversions.
    pub(crate) fn with_example(example: &str) -> Self {
        Self::new(false, "", StringConverter::with_example(example))
    }

    pub fn remove_source_extension(&self) -> bool {
        self.remove_source_extension
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn filename_converter(&self) -> &StringConverter {
        &self.filename_converter
    }

    pub fn path_for(&self, target: impl AsRef<Path>, extension: &str) -> Result<PathBuf> {
        sidecar_path(target.as_ref(), self, extension)
    }
}

/// Computes the expected sidecar path for `target`.
///
/// Pure: the filesystem is never consulted, and the result need not exist.
/// Fails with [`InvalidPath`](ErrorKind::InvalidPath) when the target has no
/// file name (`dir/..`, `/`), or when the filename converter makes changes and
/// the file name is not valid UTF-8.
pub fn sidecar_path(target: &Path, sidecar: &Sidecar, extension: &str) -> Result<PathBuf> {
    let base = match sidecar.remove_source_extension {
        true => target.file_stem(),
        false => target.file_name(),
    };
    let base = base.ok_or_raise(|| ErrorKind::InvalidPath(target.to_path_buf()))?.to_owned();
    let mut name = match sidecar.filename_converter.makes_changes() {
        true => {
            let utf8 = base.to_str().ok_or_raise(|| ErrorKind::InvalidPath(target.to_path_buf()))?;
            OsString::from(sidecar.filename_converter.convert(utf8))
        },
        false => base,
    };
    name.push(&sidecar.suffix);
    name.push(".");
    name.push(extension);
    Ok(target.with_file_name(name))
}

/// Implemented by importers that read a sidecar file next to their target.
pub trait SidecarImporter {
    /// Extension of the sidecar files this importer reads, without the dot.
    const EXTENSION: &'static str;

    fn sidecar(&self) -> &Sidecar;

    fn expected_sidecar_path(&self, target: &Path) -> Result<PathBuf> {
        self.sidecar().path_for(target, Self::EXTENSION)
    }
}

/// Reads a sidecar as UTF-8 text. `None` when there is no file at `path`,
/// including when one of its parents is a file rather than a directory.
///
/// The file handle is closed before this returns, on every path.
pub(crate) fn read(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
            debug!(path = %path.display(), "no sidecar");
            Ok(None)
        },
        Err(e) => Err(e).or_raise(|| ErrorKind::SidecarRead(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tagport_strings::Conversion;

    fn converter(conversions: impl IntoIterator<Item = Conversion>) -> StringConverter {
        StringConverter::new(conversions, "my_image.jpg")
    }

    #[rstest]
    #[case("photo.jpg", false, "", vec![], "json", "photo.jpg.json")]
    #[case("photo.jpg", true, "", vec![], "json", "photo.json")]
    #[case("photo.jpg", false, ".tags", vec![], "txt", "photo.jpg.tags.txt")]
    #[case("/srv/media/photo.jpg", true, "_meta", vec![], "txt", "/srv/media/photo_meta.txt")]
    #[case("archive.tar.gz", true, "", vec![], "json", "archive.tar.json")]
    #[case("README", true, "", vec![], "txt", "README.txt")]
    #[case(".hidden", true, "", vec![], "txt", ".hidden.txt")]
    #[case("dir/photo.jpg", true, "", vec![Conversion::Prepend("meta_".to_string())], "json", "dir/meta_photo.json")]
    #[case("photo.jpg", false, "", vec![Conversion::RemoveFromEnd(4)], "txt", "photo.txt")]
    fn test_sidecar_path(
        #[case] target: &str,
        #[case] remove_source_extension: bool,
        #[case] suffix: &str,
        #[case] conversions: Vec<Conversion>,
        #[case] extension: &str,
        #[case] expected: &str,
    ) {
        let sidecar = Sidecar::new(remove_source_extension, suffix, converter(conversions));
        assert_eq!(sidecar.path_for(target, extension).unwrap(), PathBuf::from(expected));
    }

    #[test]
    fn test_sidecar_path_is_stable() {
        let sidecar = Sidecar::new(true, "_x", converter([Conversion::Reverse]));
        let first = sidecar.path_for("a/b/photo.png", "json").unwrap();
        let second = sidecar.path_for("a/b/photo.png", "json").unwrap();
        assert_eq!(first, second);
        assert_eq!(first, PathBuf::from("a/b/otohp_x.json"));
    }

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read(&dir.path().join("absent.txt")).unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_as_parent_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("photo.jpg"), "not a directory").unwrap();
        assert_eq!(read(&dir.path().join("photo.jpg").join("inner.jpg.txt")).unwrap(), None);
    }

    #[rstest]
    #[case("foo/..")]
    #[case("/")]
    #[case("")]
    fn test_target_without_file_name(#[case] target: &str) {
        for remove_source_extension in [false, true] {
            let sidecar = Sidecar::new(remove_source_extension, "", StringConverter::default());
            let err = sidecar.path_for(target, "json").unwrap_err();
            assert_eq!(*err, ErrorKind::InvalidPath(PathBuf::from(target)));
        }
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.txt");
        fs::write(&path, [0xff, 0xfe, 0x00, 0xc3]).unwrap();
        let err = read(&path).unwrap_err();
        assert_eq!(*err, ErrorKind::SidecarRead(path));
        assert!(err.is_retryable());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_name_with_converter() {
        use std::os::unix::ffi::OsStrExt;
        let target = Path::new(std::ffi::OsStr::from_bytes(b"caf\xe9.jpg"));
        let plain = Sidecar::new(false, "", StringConverter::default());
        assert!(plain.path_for(target, "txt").is_ok());
        let converting = Sidecar::new(false, "", converter([Conversion::Reverse]));
        let err = converting.path_for(target, "txt").unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidPath(target.to_path_buf()));
    }
}
