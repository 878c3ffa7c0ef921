use thiserror::Error;

/// Configuration errors. Converting text never fails; malformed markup degrades to literal text.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown flavor `{0}` (expected markdown, gfm, extra or leanpub)")]
    UnknownFlavor(String),
    #[error("invalid options: {0}")]
    Options(#[from] serde_json::Error),
    #[error("maximum nesting level must be at least 1")]
    InvalidNestingLevel,
}
