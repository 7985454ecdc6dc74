//! Rendering error types.

/// Errors raised while turning a template into a prompt string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The output would grow past the fixed prompt bound.
    #[error("prompt exceeds {limit} bytes")]
    PromptTooLong { limit: usize },

    /// The template's `\[...\]` / `\e[...m` sequences are not well formed.
    #[error("malformed escape sequence: {0}")]
    MalformedTemplate(#[from] EscapeError),
}

/// Why a template failed the escape-sequence well-formedness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EscapeError {
    #[error("found a new opening bracket before closing the previous one")]
    NestedBracket,
    #[error("found a closing bracket without a matching opening bracket")]
    UnmatchedClose,
    #[error("found an escape sequence outside of brackets")]
    EscapeOutsideBrackets,
    #[error("found closing of escape sequence outside of brackets")]
    TerminatorOutsideBrackets,
    #[error("escape sequence is not terminated with 'm'")]
    UnterminatedEscape,
    #[error("bracket sequence is not closed")]
    UnclosedBracket,
}

/// Result type alias for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
