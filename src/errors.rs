use std::io;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("malformed spec file line {line}: {reason}")]
    SpecParse { line: usize, reason: String },

    #[error("invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("spec file has no {0} tag")]
    MissingTag(&'static str),

    #[error("inventory store failed: {0}")]
    Store(String),

    #[error("package metadata lookup for {package} failed: {reason}")]
    MetadataLookup { package: String, reason: String },
}
