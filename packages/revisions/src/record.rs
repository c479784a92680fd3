use crate::applier::check_text;
use crate::error::ApplyResult;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Author recorded on edits that do not name one
pub const DEFAULT_AUTHOR: &str = "SMAIRS";

/// Metadata table built by the change applier, keyed by edit id
pub type EditTable = HashMap<String, RevisionMeta>;

/// Kind of a single edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKind {
    Insertion,
    Deletion,
}

impl EditKind {
    /// Tag used inside annotation markers
    pub fn tag(self) -> &'static str {
        match self {
            EditKind::Insertion => "INS",
            EditKind::Deletion => "DEL",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "INS" => Some(EditKind::Insertion),
            "DEL" => Some(EditKind::Deletion),
            _ => None,
        }
    }
}

/// One insertion or deletion against the original text.
///
/// `position` and the length of `content` are counted in characters. For a
/// deletion, `content` must equal the original text starting at `position`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRecord {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,

    #[serde(rename = "type")]
    pub kind: EditKind,

    pub position: usize,

    pub content: String,

    #[serde(default = "default_author")]
    pub author: String,

    /// ISO-8601 date-time, serialized as `date`
    #[serde(rename = "date", default = "default_timestamp")]
    pub timestamp: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl EditRecord {
    pub fn new(
        id: impl Into<String>,
        kind: EditKind,
        position: usize,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            content: content.into(),
            author: default_author(),
            timestamp: default_timestamp(),
            comment: None,
        }
    }

    pub fn insertion(id: impl Into<String>, position: usize, content: impl Into<String>) -> Self {
        Self::new(id, EditKind::Insertion, position, content)
    }

    pub fn deletion(id: impl Into<String>, position: usize, content: impl Into<String>) -> Self {
        Self::new(id, EditKind::Deletion, position, content)
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Number of characters of the original text this edit consumes
    pub fn span_len(&self) -> usize {
        match self.kind {
            EditKind::Insertion => 0,
            EditKind::Deletion => self.content.chars().count(),
        }
    }
}

/// Who made an edit and when, looked up by id while encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionMeta {
    pub author: String,
    pub timestamp: String,
    pub comment: String,
}

impl RevisionMeta {
    /// Default used when an edit id has no metadata.
    ///
    /// The timestamp is taken once, so callers should build this once per
    /// document and reuse it for every miss.
    pub fn fallback() -> Self {
        Self {
            author: default_author(),
            timestamp: default_timestamp(),
            comment: String::new(),
        }
    }
}

impl From<&EditRecord> for RevisionMeta {
    fn from(edit: &EditRecord) -> Self {
        Self {
            author: edit.author.clone(),
            timestamp: edit.timestamp.clone(),
            comment: edit.comment.clone().unwrap_or_default(),
        }
    }
}

/// Document-level metadata supplied with a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Authors>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl DocumentMetadata {
    /// Reject characters the core properties part cannot carry
    pub fn validate(&self) -> ApplyResult<()> {
        if let Some(title) = &self.title {
            check_text(title, || "the document title".to_string())?;
        }
        if let Some(subject) = &self.subject {
            check_text(subject, || "the document subject".to_string())?;
        }
        let authors: &[String] = match &self.author {
            Some(Authors::One(author)) => std::slice::from_ref(author),
            Some(Authors::Many(authors)) => authors,
            None => &[],
        };
        for author in authors {
            check_text(author, || "the document author".to_string())?;
        }
        Ok(())
    }
}

/// A single author or a list of co-authors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Authors {
    One(String),
    Many(Vec<String>),
}

impl Authors {
    /// Display form, co-authors joined with `", "`
    pub fn joined(&self) -> String {
        match self {
            Authors::One(author) => author.clone(),
            Authors::Many(authors) => authors.join(", "),
        }
    }
}

/// Complete input for one export: the text, its edits and document metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchInput {
    #[serde(default)]
    pub original_text: String,

    #[serde(default)]
    pub changes: Vec<EditRecord>,

    #[serde(default)]
    pub metadata: DocumentMetadata,
}

fn default_author() -> String {
    DEFAULT_AUTHOR.to_string()
}

/// Current time as an ISO-8601 UTC date-time with second precision
pub fn default_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_edit_record_with_defaults() {
        let json = r#"{ "id": "7", "type": "insertion", "position": 3, "content": "abc" }"#;

        let edit: EditRecord = serde_json::from_str(json).unwrap();
        assert_eq!(edit.id, "7");
        assert_eq!(edit.kind, EditKind::Insertion);
        assert_eq!(edit.position, 3);
        assert_eq!(edit.author, DEFAULT_AUTHOR);
        assert!(!edit.timestamp.is_empty());
        assert_eq!(edit.comment, None);
    }

    #[test]
    fn test_parse_numeric_id_and_date() {
        let json = r#"{
            "id": 12,
            "type": "deletion",
            "position": 0,
            "content": "x",
            "author": "Editor",
            "date": "2024-05-01T10:00:00Z",
            "comment": "tighten"
        }"#;

        let edit: EditRecord = serde_json::from_str(json).unwrap();
        assert_eq!(edit.id, "12");
        assert_eq!(edit.kind, EditKind::Deletion);
        assert_eq!(edit.timestamp, "2024-05-01T10:00:00Z");
        assert_eq!(RevisionMeta::from(&edit).comment, "tighten");
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let json = r#"{ "id": "1", "type": "move", "position": 0, "content": "x" }"#;
        assert!(serde_json::from_str::<EditRecord>(json).is_err());
    }

    #[test]
    fn test_missing_position_is_rejected() {
        let json = r#"{ "id": "1", "type": "insertion", "content": "x" }"#;
        assert!(serde_json::from_str::<EditRecord>(json).is_err());
    }

    #[test]
    fn test_batch_input_author_list() {
        let json = r#"{
            "originalText": "Hello",
            "revisedText": "ignored",
            "changes": [],
            "metadata": { "title": "Draft", "author": ["Ann", "Bo"] }
        }"#;

        let batch: BatchInput = serde_json::from_str(json).unwrap();
        assert_eq!(batch.original_text, "Hello");
        assert_eq!(batch.metadata.title.as_deref(), Some("Draft"));
        assert_eq!(batch.metadata.author.unwrap().joined(), "Ann, Bo");
    }

    #[test]
    fn test_batch_input_defaults_when_empty() {
        let batch: BatchInput = serde_json::from_str("{}").unwrap();
        assert!(batch.original_text.is_empty());
        assert!(batch.changes.is_empty());
        assert_eq!(batch.metadata, DocumentMetadata::default());
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(EditKind::from_tag(EditKind::Insertion.tag()), Some(EditKind::Insertion));
        assert_eq!(EditKind::from_tag(EditKind::Deletion.tag()), Some(EditKind::Deletion));
        assert_eq!(EditKind::from_tag("MOV"), None);
    }

    #[test]
    fn test_metadata_validation() {
        let metadata: DocumentMetadata =
            serde_json::from_str(r#"{ "title": "Draft", "author": ["Ann", "Bob"] }"#).unwrap();
        assert!(metadata.validate().is_ok());

        let metadata = DocumentMetadata {
            author: Some(Authors::Many(vec!["Ann".to_string(), "B\u{8}ob".to_string()])),
            ..Default::default()
        };
        let err = metadata.validate().unwrap_err();
        assert!(err.to_string().contains("the document author"));

        let metadata = DocumentMetadata {
            title: Some("\u{0}".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            metadata.validate().unwrap_err(),
            crate::ApplyError::NonXmlCharacter { codepoint: 0, .. }
        ));
    }
}
