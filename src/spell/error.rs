//! Errors raised while loading spell-check data

use std::path::PathBuf;

/// Failure while opening or parsing dictionary data
#[derive(Debug, thiserror::Error)]
pub enum SpellError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed affix file {}, line {line}: {reason}", path.display())]
    MalformedAffix {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("malformed dictionary file {}: {reason}", path.display())]
    MalformedDictionary { path: PathBuf, reason: String },

    #[error("unsupported dictionary encoding \"{0}\"")]
    UnsupportedEncoding(String),
}

impl SpellError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SpellError>;
