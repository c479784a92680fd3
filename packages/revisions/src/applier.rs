use crate::error::{ApplyError, ApplyResult};
use crate::record::{EditKind, EditRecord, EditTable, RevisionMeta};
use crate::tokenizer::{find_non_xml, find_reserved, wrap};
use std::cmp::Reverse;
use tracing::debug;

/// The original text with every edit spliced in as a marker pair, plus the
/// metadata table for those edits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedText {
    text: String,
    metadata: EditTable,
}

impl AnnotatedText {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn metadata(&self) -> &EditTable {
        &self.metadata
    }

    pub fn into_parts(self) -> (String, EditTable) {
        (self.text, self.metadata)
    }
}

/// An edit resolved against the original text
struct Splice<'a> {
    edit: &'a EditRecord,
    /// Submission order within the batch
    seq: usize,
    /// Byte range in the original text
    start: usize,
    end: usize,
}

impl Splice<'_> {
    /// Deletions splice before insertions at the same position, so the
    /// insertions end up in front of the deleted span
    fn rank(&self) -> u8 {
        match self.edit.kind {
            EditKind::Deletion => 0,
            EditKind::Insertion => 1,
        }
    }
}

/// Splice every edit into `original` as a marker pair.
///
/// Edits are applied from the highest position down so that no splice moves
/// the offset of an edit still waiting to be applied. At a shared position
/// the output lists insertions in submission order, then the deletion
/// starting there.
pub fn apply(original: &str, edits: &[EditRecord]) -> ApplyResult<AnnotatedText> {
    check_text(original, || "the original text".to_string())?;

    let boundaries = char_boundaries(original);
    let length = boundaries.len() - 1;

    let mut metadata = EditTable::with_capacity(edits.len());
    let mut splices = Vec::with_capacity(edits.len());

    for (seq, edit) in edits.iter().enumerate() {
        if edit.id.is_empty() {
            return Err(ApplyError::EmptyId { index: seq });
        }
        check_text(&edit.id, || format!("the id of edit {seq}"))?;
        check_text(&edit.content, || format!("edit '{}'", edit.id))?;
        check_text(&edit.author, || format!("the author of edit '{}'", edit.id))?;
        check_text(&edit.timestamp, || format!("the date of edit '{}'", edit.id))?;
        if let Some(comment) = &edit.comment {
            check_text(comment, || format!("the comment of edit '{}'", edit.id))?;
        }
        if metadata.contains_key(&edit.id) {
            return Err(ApplyError::DuplicateId {
                id: edit.id.clone(),
            });
        }
        if edit.kind == EditKind::Deletion && edit.content.is_empty() {
            return Err(ApplyError::EmptyDeletion {
                id: edit.id.clone(),
                position: edit.position,
            });
        }

        let end_char = edit.position.checked_add(edit.span_len());
        let span = end_char.and_then(|end_char| {
            Some((*boundaries.get(edit.position)?, *boundaries.get(end_char)?))
        });
        let Some((start, end)) = span else {
            return Err(ApplyError::out_of_bounds(
                &edit.id,
                edit.position,
                end_char.unwrap_or(usize::MAX),
                length,
            ));
        };

        if edit.kind == EditKind::Deletion && original[start..end] != edit.content {
            return Err(ApplyError::span_mismatch(
                &edit.id,
                edit.position,
                &edit.content,
                &original[start..end],
            ));
        }

        metadata.insert(edit.id.clone(), RevisionMeta::from(edit));
        splices.push(Splice {
            edit,
            seq,
            start,
            end,
        });
    }

    reject_overlaps(&splices)?;

    splices.sort_by_key(|s| (Reverse(s.start), s.rank(), Reverse(s.seq)));

    let mut text = original.to_string();
    for splice in &splices {
        let edit = splice.edit;
        let content = match edit.kind {
            EditKind::Insertion => edit.content.as_str(),
            EditKind::Deletion => &original[splice.start..splice.end],
        };
        let marked = wrap(edit.kind, &edit.id, content);

        debug!(
            id = %edit.id,
            kind = edit.kind.tag(),
            position = edit.position,
            "splicing edit"
        );
        text.replace_range(splice.start..splice.end, &marked);
    }

    Ok(AnnotatedText { text, metadata })
}

/// Reject marker sentinels and characters XML cannot carry
pub(crate) fn check_text(text: &str, location: impl Fn() -> String) -> ApplyResult<()> {
    if let Some(ch) = find_reserved(text) {
        return Err(ApplyError::reserved_character(ch, location()));
    }
    if let Some(ch) = find_non_xml(text) {
        return Err(ApplyError::non_xml_character(ch, location()));
    }
    Ok(())
}

/// Byte offset of every character, followed by the text length
fn char_boundaries(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .collect()
}

/// Deletions may touch but not intersect; an insertion may sit at either
/// edge of a deletion but not strictly inside it
fn reject_overlaps(splices: &[Splice<'_>]) -> ApplyResult<()> {
    let mut deletions: Vec<&Splice<'_>> = splices
        .iter()
        .filter(|s| s.edit.kind == EditKind::Deletion)
        .collect();
    deletions.sort_by_key(|s| s.start);

    for pair in deletions.windows(2) {
        if pair[0].end > pair[1].start {
            return Err(ApplyError::overlap(&pair[0].edit.id, &pair[1].edit.id));
        }
    }

    for insertion in splices.iter().filter(|s| s.edit.kind == EditKind::Insertion) {
        let before = deletions.partition_point(|d| d.start < insertion.start);
        if let Some(deletion) = before.checked_sub(1).map(|i| deletions[i]) {
            if insertion.start < deletion.end {
                return Err(ApplyError::overlap(&deletion.edit.id, &insertion.edit.id));
            }
        }
    }

    Ok(())
}
