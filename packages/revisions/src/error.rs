//! Error types for change application and marker parsing

use thiserror::Error;

/// Result type for change application
pub type ApplyResult<T> = Result<T, ApplyError>;

/// Result type for marker parsing
pub type MarkupResult<T> = Result<T, MarkupError>;

/// Result type for the combined apply + parse pass
pub type RevisionResult<T> = Result<T, RevisionError>;

/// A batch of edits that cannot be applied to the original text.
///
/// Every variant is fatal: the batch is rejected before any splicing happens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("Edit at index {index} has an empty id")]
    EmptyId { index: usize },

    #[error("Duplicate edit id '{id}'")]
    DuplicateId { id: String },

    #[error("Edit '{id}' spans {position}..{end}, outside the original text ({length} characters)")]
    OutOfBounds {
        id: String,
        position: usize,
        end: usize,
        length: usize,
    },

    #[error("Deletion '{id}' at position {position} has no content")]
    EmptyDeletion { id: String, position: usize },

    #[error("Deletion '{id}' at position {position} expected {expected:?}, original text has {found:?}")]
    SpanMismatch {
        id: String,
        position: usize,
        expected: String,
        found: String,
    },

    #[error("Edit '{first}' overlaps edit '{second}'")]
    Overlap { first: String, second: String },

    #[error("Reserved marker character U+{codepoint:04X} found in {location}")]
    ReservedCharacter { codepoint: u32, location: String },

    #[error("Character U+{codepoint:04X} in {location} is not allowed in XML")]
    NonXmlCharacter { codepoint: u32, location: String },
}

impl ApplyError {
    pub fn out_of_bounds(id: impl Into<String>, position: usize, end: usize, length: usize) -> Self {
        Self::OutOfBounds {
            id: id.into(),
            position,
            end,
            length,
        }
    }

    pub fn span_mismatch(
        id: impl Into<String>,
        position: usize,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::SpanMismatch {
            id: id.into(),
            position,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn overlap(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self::Overlap {
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn reserved_character(ch: char, location: impl Into<String>) -> Self {
        Self::ReservedCharacter {
            codepoint: ch as u32,
            location: location.into(),
        }
    }

    pub fn non_xml_character(ch: char, location: impl Into<String>) -> Self {
        Self::NonXmlCharacter {
            codepoint: ch as u32,
            location: location.into(),
        }
    }
}

/// Annotated text whose markers do not form a flat sequence of matched pairs.
///
/// Positions are byte offsets into the annotated text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    #[error("Unrecognized marker at byte {pos}")]
    Unrecognized { pos: usize },

    #[error("Closing marker {found} at byte {pos} has no open span")]
    UnexpectedClose { pos: usize, found: String },

    #[error("Closing marker {found} at byte {pos} does not match open span {expected}")]
    MismatchedClose {
        pos: usize,
        expected: String,
        found: String,
    },

    #[error("Marker {found} at byte {pos} opens inside span {outer}")]
    NestedOpen {
        pos: usize,
        outer: String,
        found: String,
    },

    #[error("Span {tag} opened at byte {pos} is never closed")]
    Unterminated { pos: usize, tag: String },
}

impl MarkupError {
    pub fn pos(&self) -> usize {
        match self {
            MarkupError::Unrecognized { pos }
            | MarkupError::UnexpectedClose { pos, .. }
            | MarkupError::MismatchedClose { pos, .. }
            | MarkupError::NestedOpen { pos, .. }
            | MarkupError::Unterminated { pos, .. } => *pos,
        }
    }
}

/// Either half of the apply + parse pass failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RevisionError {
    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error("Malformed annotated text: {0}")]
    Markup(#[from] MarkupError),
}
