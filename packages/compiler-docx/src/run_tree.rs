use chrono::{DateTime, NaiveDateTime};
use redline_revisions::EditKind;
use thiserror::Error;

/// Why a revision fragment could not be attached to the run tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttachError {
    #[error("Revision '{id}' has date {date:?}, expected an ISO-8601 date-time")]
    InvalidDate { id: String, date: String },

    #[error("Revision '{id}' has no paragraph to attach to")]
    NoParagraph { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Green,
    Red,
}

impl Highlight {
    /// `w:highlight` value
    pub fn value(self) -> &'static str {
        match self {
            Highlight::Green => "green",
            Highlight::Red => "red",
        }
    }
}

/// Character formatting of a plain run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunFormat {
    pub highlight: Option<Highlight>,
    pub strike: bool,
}

impl RunFormat {
    /// Visual stand-in for a revision: insertions highlighted, deletions
    /// struck through with a different highlight
    pub fn visual(kind: EditKind) -> Self {
        match kind {
            EditKind::Insertion => Self {
                highlight: Some(Highlight::Green),
                strike: false,
            },
            EditKind::Deletion => Self {
                highlight: Some(Highlight::Red),
                strike: true,
            },
        }
    }

    pub fn is_plain(&self) -> bool {
        self.highlight.is_none() && !self.strike
    }
}

/// A tracked insertion or deletion carrying its identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionFragment {
    pub kind: EditKind,
    /// Edit id from the batch, used for lookup and logging
    pub id: String,
    pub author: String,
    pub date: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Run { text: String, format: RunFormat },
    /// `w:id` is numbered by the tree, independent of the edit id
    Revision { w_id: u32, revision: RevisionFragment },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub fragments: Vec<Fragment>,
}

/// Counts of what the encoder emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeStats {
    pub plain: usize,
    pub tracked: usize,
    pub visual: usize,
}

/// Paragraphs of runs and revision fragments, in document order
#[derive(Debug, Default)]
pub struct RunTree {
    paragraphs: Vec<Paragraph>,
    next_revision_id: u32,
    stats: EncodeStats,
}

impl RunTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn stats(&self) -> EncodeStats {
        self.stats
    }

    pub fn start_paragraph(&mut self) {
        self.paragraphs.push(Paragraph::default());
    }

    /// Append a plain or visually formatted run, opening a paragraph if
    /// none is open
    pub fn push_run(&mut self, text: &str, format: RunFormat) {
        if self.paragraphs.is_empty() {
            self.start_paragraph();
        }
        if format.is_plain() {
            self.stats.plain += 1;
        } else {
            self.stats.visual += 1;
        }
        if let Some(paragraph) = self.paragraphs.last_mut() {
            paragraph.fragments.push(Fragment::Run {
                text: text.to_string(),
                format,
            });
        }
    }

    /// Attach a revision to the current paragraph and return its `w:id`.
    ///
    /// Revisions are numbered from 1 in attach order. The date must be an
    /// ISO-8601 date-time. On error the tree is unchanged.
    pub fn attach(&mut self, fragment: &RevisionFragment) -> Result<u32, AttachError> {
        if !is_iso_datetime(&fragment.date) {
            return Err(AttachError::InvalidDate {
                id: fragment.id.clone(),
                date: fragment.date.clone(),
            });
        }
        let paragraph = self
            .paragraphs
            .last_mut()
            .ok_or_else(|| AttachError::NoParagraph {
                id: fragment.id.clone(),
            })?;

        self.next_revision_id += 1;
        let w_id = self.next_revision_id;
        paragraph.fragments.push(Fragment::Revision {
            w_id,
            revision: fragment.clone(),
        });
        self.stats.tracked += 1;
        Ok(w_id)
    }
}

fn is_iso_datetime(date: &str) -> bool {
    DateTime::parse_from_rfc3339(date).is_ok()
        || NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}
