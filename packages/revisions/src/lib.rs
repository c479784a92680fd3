//! # Redline Revisions
//!
//! Turns a plain text and a batch of edits into an ordered sequence of
//! segments, each one plain text or a single edit's span.
//!
//! ```text
//! original text + edits ──apply──▶ annotated text ──parse──▶ segments
//! ```
//!
//! The annotated text carries each edit as a matched marker pair. Deletions
//! are marked, not removed, so rejecting every edit gives back the original.

pub mod applier;
pub mod error;
pub mod parser;
pub mod record;
pub mod segment;
pub mod tokenizer;


pub use applier::{apply, AnnotatedText};
pub use error::{
    ApplyError, ApplyResult, MarkupError, MarkupResult, RevisionError, RevisionResult,
};
pub use parser::parse;
pub use record::{
    default_timestamp, Authors, BatchInput, DocumentMetadata, EditKind, EditRecord, EditTable,
    RevisionMeta, DEFAULT_AUTHOR,
};
pub use segment::{accepted_text, rejected_text, visible_text, Segment, SegmentKind};

/// Apply `edits` to `original` and parse the result back into segments,
/// returning them with the metadata table
pub fn apply_and_parse(
    original: &str,
    edits: &[EditRecord],
) -> RevisionResult<(Vec<Segment>, EditTable)> {
    let (annotated, metadata) = apply(original, edits)?.into_parts();
    let segments = parse(&annotated)?;
    Ok((segments, metadata))
}
