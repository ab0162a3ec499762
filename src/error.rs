use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not import metadata for {}", _0.display())]
    Import(#[error(not(source))] PathBuf),
    #[display("could not read importer blob from {_0}")]
    ReadBlob(#[error(not(source))] String),
    #[display("could not upgrade importer blob")]
    Migrate,
    #[display("could not write output")]
    Output,
}
