//! The analyzer's single, external error shape.

use carlos_util::Span;
use thiserror::Error;

/// A semantic-analysis failure. The message text is the contract: callers
/// and tests match on `message`, not on a variant tag, since every
/// rejection scenario in this analyzer is distinguished only by its
/// wording (§7).
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct AnalysisError {
    pub message: String,
    pub span: Option<Span>,
}

impl AnalysisError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span: Some(span),
        }
    }

    pub fn without_span(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_shows_message_only() {
        let err = AnalysisError::new("Identifier x already declared", Span::DUMMY);
        assert_eq!(err.to_string(), "Identifier x already declared");
    }

    #[test]
    fn without_span_has_no_span() {
        let err = AnalysisError::without_span("Break can only appear in a loop");
        assert!(err.span.is_none());
    }
}
