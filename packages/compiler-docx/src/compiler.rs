use crate::context::Context;
use crate::escape::escape_xml;
use crate::options::{CompileOptions, RevisionMode};
use crate::run_tree::{EncodeStats, Fragment, RevisionFragment, RunFormat, RunTree};
use redline_revisions::{
    apply_and_parse, EditKind, EditRecord, EditTable, RevisionError, RevisionMeta, Segment,
    SegmentKind,
};
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Paragraphs are separated by a blank line
pub const PARAGRAPH_BREAK: &str = "\n\n";

/// Errors that can occur during document compilation
#[derive(Error, Debug)]
pub enum CompileError {
    #[error(transparent)]
    Revision(#[from] RevisionError),
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Encodes segments as runs and revision fragments
pub struct RevisionEncoder {
    mode: RevisionMode,
    fallback: RevisionMeta,
}

impl RevisionEncoder {
    /// The lookup-miss default is built here, once, so every miss in the
    /// document gets the same author and date
    pub fn new(mode: RevisionMode) -> Self {
        Self::with_fallback(mode, RevisionMeta::fallback())
    }

    pub fn with_fallback(mode: RevisionMode, fallback: RevisionMeta) -> Self {
        Self { mode, fallback }
    }

    pub fn mode(&self) -> RevisionMode {
        self.mode
    }

    pub fn fallback(&self) -> &RevisionMeta {
        &self.fallback
    }

    /// Metadata for `id`, with the fallback filling a missing entry or an
    /// empty author or date
    pub fn resolve(&self, id: &str, metadata: &EditTable) -> RevisionMeta {
        match metadata.get(id) {
            Some(meta) => RevisionMeta {
                author: non_empty_or(&meta.author, &self.fallback.author),
                timestamp: non_empty_or(&meta.timestamp, &self.fallback.timestamp),
                comment: meta.comment.clone(),
            },
            None => {
                trace!(id, "no metadata for edit, using defaults");
                self.fallback.clone()
            }
        }
    }

    /// Split `segments` into paragraphs and encode each one
    pub fn encode(&self, segments: &[Segment], metadata: &EditTable) -> RunTree {
        let mut tree = RunTree::new();

        for paragraph in split_paragraphs(segments) {
            tree.start_paragraph();
            for segment in &paragraph {
                self.encode_segment(segment, metadata, &mut tree);
            }
        }

        tree
    }

    fn encode_segment(&self, segment: &Segment, metadata: &EditTable, tree: &mut RunTree) {
        let (kind, id) = match (segment.kind, segment.edit_id.as_deref()) {
            (SegmentKind::Insertion, Some(id)) => (EditKind::Insertion, id),
            (SegmentKind::Deletion, Some(id)) => (EditKind::Deletion, id),
            _ => {
                tree.push_run(&segment.text, RunFormat::default());
                return;
            }
        };

        if self.mode == RevisionMode::Visual {
            tree.push_run(&segment.text, RunFormat::visual(kind));
            return;
        }

        let meta = self.resolve(id, metadata);
        if !meta.comment.is_empty() {
            debug!(id, comment = %meta.comment, "edit comment is not emitted");
        }

        let fragment = RevisionFragment {
            kind,
            id: id.to_string(),
            author: meta.author,
            date: meta.timestamp,
            text: segment.text.clone(),
        };

        match tree.attach(&fragment) {
            Ok(w_id) => debug!(id, w_id, kind = kind.tag(), "attached revision"),
            Err(err) => {
                warn!(id, error = %err, "revision could not be attached, rendering visually");
                tree.push_run(&segment.text, RunFormat::visual(kind));
            }
        }
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Split segments into paragraphs at blank lines.
///
/// Only plain text is split; an edit's span always stays in one paragraph.
/// Paragraphs holding nothing but whitespace are dropped.
pub fn split_paragraphs(segments: &[Segment]) -> Vec<Vec<Segment>> {
    let mut paragraphs: Vec<Vec<Segment>> = vec![Vec::new()];

    for segment in segments {
        if !segment.is_plain() {
            if let Some(current) = paragraphs.last_mut() {
                current.push(segment.clone());
            }
            continue;
        }

        for (i, part) in segment.text.split(PARAGRAPH_BREAK).enumerate() {
            if i > 0 {
                paragraphs.push(Vec::new());
            }
            if !part.is_empty() {
                if let Some(current) = paragraphs.last_mut() {
                    current.push(Segment::plain(part));
                }
            }
        }
    }

    paragraphs.retain(|paragraph| !is_blank(paragraph));
    paragraphs
}

fn is_blank(paragraph: &[Segment]) -> bool {
    paragraph
        .iter()
        .all(|segment| segment.is_plain() && segment.text.trim().is_empty())
}

/// Encoded document body
#[derive(Debug, Clone)]
pub struct CompiledBody {
    /// Paragraph elements, ready to be wrapped in `w:body`
    pub xml: String,
    pub stats: EncodeStats,
}

/// Apply `edits` to `original`, parse the result and encode it
pub fn compile_body(
    original: &str,
    edits: &[EditRecord],
    options: &CompileOptions,
) -> CompileResult<CompiledBody> {
    let (segments, metadata) = apply_and_parse(original, edits)?;
    let encoder = RevisionEncoder::new(options.mode);
    let tree = encoder.encode(&segments, &metadata);

    Ok(CompiledBody {
        xml: write_run_tree(&tree, options),
        stats: tree.stats(),
    })
}

/// Serialize a run tree as a sequence of `w:p` elements
pub fn write_run_tree(tree: &RunTree, options: &CompileOptions) -> String {
    let mut ctx = Context::new(options.clone());

    for paragraph in tree.paragraphs() {
        ctx.add_line("<w:p>");
        ctx.indent();
        for fragment in &paragraph.fragments {
            ctx.add_line(&compile_fragment(fragment));
        }
        ctx.dedent();
        ctx.add_line("</w:p>");
    }

    ctx.get_output()
}

fn compile_fragment(fragment: &Fragment) -> String {
    match fragment {
        Fragment::Run { text, format } => compile_run(text, format, "w:t"),
        Fragment::Revision { w_id, revision } => {
            let (element, text_element) = match revision.kind {
                EditKind::Insertion => ("w:ins", "w:t"),
                EditKind::Deletion => ("w:del", "w:delText"),
            };
            format!(
                "<{element} w:id=\"{w_id}\" w:author=\"{}\" w:date=\"{}\">{}</{element}>",
                escape_xml(&revision.author),
                escape_xml(&revision.date),
                compile_run(&revision.text, &RunFormat::default(), text_element),
            )
        }
    }
}

fn compile_run(text: &str, format: &RunFormat, text_element: &str) -> String {
    let mut out = String::from("<w:r>");

    if !format.is_plain() {
        out.push_str("<w:rPr>");
        if format.strike {
            out.push_str("<w:strike/>");
        }
        if let Some(highlight) = format.highlight {
            out.push_str(&format!("<w:highlight w:val=\"{}\"/>", highlight.value()));
        }
        out.push_str("</w:rPr>");
    }

    let mut pending = String::new();
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            // CRLF and a lone CR are one line break, same as LF
            '\r' | '\n' => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                flush_text(&mut out, &mut pending, text_element);
                out.push_str("<w:br/>");
            }
            '\t' => {
                flush_text(&mut out, &mut pending, text_element);
                out.push_str("<w:tab/>");
            }
            _ => pending.push(ch),
        }
    }
    flush_text(&mut out, &mut pending, text_element);

    out.push_str("</w:r>");
    out
}

fn flush_text(out: &mut String, pending: &mut String, text_element: &str) {
    if pending.is_empty() {
        return;
    }
    out.push_str(&format!(
        "<{text_element} xml:space=\"preserve\">{}</{text_element}>",
        escape_xml(pending)
    ));
    pending.clear();
}
