use crate::record::EditKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Plain,
    Insertion,
    Deletion,
}

impl From<EditKind> for SegmentKind {
    fn from(kind: EditKind) -> Self {
        match kind {
            EditKind::Insertion => SegmentKind::Insertion,
            EditKind::Deletion => SegmentKind::Deletion,
        }
    }
}

/// A typed piece of annotated text: plain content or one edit's span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
    /// Set for insertions and deletions, never for plain text
    pub edit_id: Option<String>,
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Plain,
            text: text.into(),
            edit_id: None,
        }
    }

    pub fn insertion(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::edit(EditKind::Insertion, id, text)
    }

    pub fn deletion(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::edit(EditKind::Deletion, id, text)
    }

    pub fn edit(kind: EditKind, id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            text: text.into(),
            edit_id: Some(id.into()),
        }
    }

    pub fn is_plain(&self) -> bool {
        self.kind == SegmentKind::Plain
    }
}

/// Every segment's text in order: insertions added, deletions retained
pub fn visible_text(segments: &[Segment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect()
}

/// The text after accepting every edit
pub fn accepted_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .filter(|s| s.kind != SegmentKind::Deletion)
        .map(|s| s.text.as_str())
        .collect()
}

/// The text after rejecting every edit, which is the original text
pub fn rejected_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .filter(|s| s.kind != SegmentKind::Insertion)
        .map(|s| s.text.as_str())
        .collect()
}
