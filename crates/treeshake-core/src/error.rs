use crate::span::Span;
use thiserror::Error;

/// Internal-consistency failures of a tree-shaking run.
///
/// None of these are recoverable: they mean the renderer asked for an edit that
/// could corrupt the output, or the AST violated its shape contract.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShakeError {
    #[error("Overlapping edits: {first} and {second}")]
    OverlappingEdit { first: Span, second: Span },

    #[error("Edit {start}..{end} is outside of the source (length {len})")]
    EditOutOfBounds { start: u32, end: u32, len: u32 },

    #[error("Inverted edit range {start}..{end}")]
    InvertedRange { start: u32, end: u32 },

    #[error("Insertion at {offset} falls inside removed range {removed}")]
    InsertInsideRemoved { offset: u32, removed: Span },

    #[error("Expected {expected} at {span}, found {found}")]
    UnexpectedNode {
        expected: &'static str,
        found: &'static str,
        span: Span,
    },

    #[error("Unknown module: {0}")]
    UnknownModule(String),

    #[error("Cannot tree-shake a bundle whose modules have not been bound")]
    Unbound,

    #[error("Cannot render before tree-shaking has reached its fixed point")]
    RenderBeforeFixedPoint,
}

pub type Result<T> = std::result::Result<T, ShakeError>;
