//! Error types for reading result sources.

/// A single field could not be read. Always recoverable: the field takes its
/// default and extraction of its siblings continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("no element matches `{0}`")]
    MissingNode(&'static str),
    #[error("no detail line labelled `{0}` carries a value")]
    MissingLine(&'static str),
    #[error("expected a scalar at `{path}`, found {found}")]
    TypeMismatch { path: String, found: &'static str },
    #[error("expected a number at `{path}`, found `{value}`")]
    NotNumeric { path: String, value: String },
}

/// The source cannot be read at all; the item becomes a failure placeholder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("report page did not load: `{0}` not found")]
    PageNotLoaded(&'static str),
    #[error("report payload is not a JSON object")]
    NotAnObject,
    #[error("report payload has no `book` section")]
    MissingBook,
}
