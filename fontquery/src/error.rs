use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing file '{0}'")]
    FileExpected(PathBuf),
    #[error("Bad --glyph-name-filter: {0}")]
    BadRegex(#[from] regex::Error),
    #[error("Unable to parse request {0}: {1}")]
    BadRequest(PathBuf, String),
    #[error("io failed for '{path}': '{source}'")]
    FileIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write to stdout or stderr: '{0}'")]
    StdioWriteFail(#[source] io::Error),
    #[error(transparent)]
    JsonSerError(#[from] serde_json::Error),
    #[error(transparent)]
    Document(#[from] fontdoc::error::Error),
    #[error(transparent)]
    Geometry(#[from] fontgeom::Error),
}
