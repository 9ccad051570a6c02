use fontdoc::GlyphName;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Component reference cycle: {}", display_chain(.0))]
    CyclicComponent(Vec<GlyphName>),
    #[error(transparent)]
    Document(#[from] fontdoc::error::Error),
}

fn display_chain(chain: &[GlyphName]) -> String {
    chain
        .iter()
        .map(GlyphName::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
