use thiserror::Error;

/// Fatal document-level failure. Only a malformed top-level document aborts a
/// render; everything below that boundary is recovered in place.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Decode failure for the top-level NJN document, carrying enough positional
/// detail to highlight the offending region in a diagnostic page.
#[derive(Debug, Error)]
#[error("document decode failed at byte {offset} (line {line}, column {column}): {message}")]
pub struct DecodeError {
    /// Byte offset of the failure within the input.
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub message: String,
    /// Raw bytes surrounding the failure, with the offending position marked.
    pub snippet: String,
}

/// Unit-level failure for one block or field. Non-fatal at the document
/// level: the walker converts these into inline error diagnostics and keeps
/// rendering the surrounding document.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("unsupported {class} type `{name}`")]
    UnsupportedType { class: &'static str, name: String },
    #[error("`{type_name}` is missing required key `{key}`")]
    MissingKey {
        type_name: String,
        key: &'static str,
    },
    #[error("`{type_name}` key `{key}` must be {expected}")]
    InvalidValue {
        type_name: String,
        key: &'static str,
        expected: &'static str,
    },
    #[error("`{type_name}` key `{key}` value `{value}` is not one of {allowed}")]
    OutOfRange {
        type_name: String,
        key: &'static str,
        value: String,
        allowed: &'static str,
    },
    #[error("nesting depth limit of {limit} exceeded")]
    TooDeep { limit: usize },
    #[error(transparent)]
    Template(#[from] crate::templates::TemplateError),
}

impl FieldError {
    pub fn unsupported(class: &'static str, name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            class,
            name: name.into(),
        }
    }

    pub fn missing_key(type_name: impl Into<String>, key: &'static str) -> Self {
        Self::MissingKey {
            type_name: type_name.into(),
            key,
        }
    }

    pub fn invalid_value(
        type_name: impl Into<String>,
        key: &'static str,
        expected: &'static str,
    ) -> Self {
        Self::InvalidValue {
            type_name: type_name.into(),
            key,
            expected,
        }
    }

    pub fn out_of_range(
        type_name: impl Into<String>,
        key: &'static str,
        value: impl Into<String>,
        allowed: &'static str,
    ) -> Self {
        Self::OutOfRange {
            type_name: type_name.into(),
            key,
            value: value.into(),
            allowed,
        }
    }
}
