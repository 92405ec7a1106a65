use thiserror::Error;

// ============================================================================
// Construction
// ============================================================================

/// An invariant was violated while building a value from typed fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("feed title must not be empty")]
    EmptyTitle,

    #[error("author needs at least one of name, url or avatar")]
    EmptyAuthor,
}

// ============================================================================
// Decoding
// ============================================================================

/// A document could not be turned into a [`Feed`](crate::Feed).
///
/// Produced for malformed JSON, a missing or mistyped required field, an
/// unrecognized attachment mime type, or any failure inside a nested item.
/// Optional fields that are missing or malformed never produce this error;
/// they fall back to their defaults.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{entity}: expected a JSON object")]
    NotAnObject { entity: &'static str },

    #[error("{entity}: missing required field `{field}`")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("{entity}: invalid value for `{field}`: {reason}")]
    InvalidField {
        entity: &'static str,
        field: &'static str,
        reason: String,
    },

    #[error("unsupported feed version `{0}`")]
    UnsupportedVersion(String),

    #[error("unrecognized attachment mime type `{0}`")]
    UnknownMimeType(String),

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    /// Failure inside one element of a list field (`items`, `hubs`,
    /// `attachments`).
    #[error("{field}[{index}]: {source}")]
    Element {
        field: &'static str,
        index: usize,
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    pub(crate) fn in_element(self, field: &'static str, index: usize) -> Self {
        DecodeError::Element {
            field,
            index,
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any list-element wrappers.
    pub fn root_cause(&self) -> &DecodeError {
        match self {
            DecodeError::Element { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
