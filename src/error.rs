use thiserror::Error;

/// A JSONC source document could not be parsed into a concrete syntax tree.
///
/// Every failure mode - an unterminated string, a stray character, a duplicate
/// object key - collapses into this one variant. Callers of the public facade
/// never see it directly: it is caught and turned into a fallback render plus
/// a warning (see [`crate::facade::stringify_preserving_comments`]).
#[derive(Debug, Error)]
#[error("JSONC parse error at byte {offset}: {message}")]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn at(offset: usize, message: impl Into<String>) -> Self {
        ParseError {
            offset,
            message: message.into(),
        }
    }
}

/// Failure to render a target value back into JSONC.
#[derive(Debug, Error)]
pub enum StringifyError {
    /// The facade only accepts object-shaped target values; a config document
    /// is always an object at its root.
    #[error("target value must be a JSON object, found {0}")]
    TargetNotAnObject(&'static str),
}
