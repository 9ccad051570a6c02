use std::{io, path::PathBuf};

use thiserror::Error;

use crate::{store::ShapeKind, types::GlyphName};

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO failure")]
    IoError(#[from] io::Error),
    #[error("Unable to parse {0}: {1}")]
    ParseError(PathBuf, String),
    #[error("Invalid document: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Shape {index} is a {actual}, not a {expected}")]
    WrongShapeKind {
        index: usize,
        expected: ShapeKind,
        actual: ShapeKind,
    },
    #[error("A glyph named '{0}' already exists")]
    DuplicateGlyph(GlyphName),
    #[error("The {0} this handle points at is no longer in the document")]
    StaleHandle(&'static str),
}
