//! Lexer for annotated text using logos
//!
//! A span is written as `\u{E000}INS:id\u{E001}content\u{E000}/INS:id\u{E001}`.
//! The sentinels sit in the private-use area so ordinary text never lexes as
//! a marker.

use crate::error::{MarkupError, MarkupResult};
use crate::record::EditKind;
use logos::Logos;
use std::fmt;
use std::ops::Range;

/// Opens every marker
pub const MARKER_START: char = '\u{E000}';

/// Closes every marker
pub const MARKER_END: char = '\u{E001}';

/// Kind and edit id carried by one marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerTag<'src> {
    pub kind: EditKind,
    pub id: &'src str,
}

impl fmt::Display for MarkerTag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.tag(), self.id)
    }
}

/// Token types for annotated text
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token<'src> {
    #[regex(r"\x{E000}(INS|DEL):[^\x{E000}\x{E001}]+\x{E001}", |lex| marker_tag(lex.slice(), false))]
    Open(MarkerTag<'src>),

    #[regex(r"\x{E000}/(INS|DEL):[^\x{E000}\x{E001}]+\x{E001}", |lex| marker_tag(lex.slice(), true))]
    Close(MarkerTag<'src>),

    #[regex(r"[^\x{E000}]+", |lex| lex.slice())]
    Text(&'src str),
}

fn marker_tag(slice: &str, closing: bool) -> Option<MarkerTag<'_>> {
    let inner = slice.strip_prefix(MARKER_START)?.strip_suffix(MARKER_END)?;
    let inner = if closing {
        inner.strip_prefix('/')?
    } else {
        inner
    };
    let (tag, id) = inner.split_once(':')?;
    Some(MarkerTag {
        kind: EditKind::from_tag(tag)?,
        id,
    })
}

/// Tokenize annotated text, failing on the first sentinel that does not
/// start a well-formed marker
pub fn tokenize(source: &str) -> MarkupResult<Vec<(Token<'_>, Range<usize>)>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(token) = lexer.next() {
        let span = lexer.span();
        match token {
            Ok(token) => tokens.push((token, span)),
            Err(()) => return Err(MarkupError::Unrecognized { pos: span.start }),
        }
    }

    Ok(tokens)
}

pub fn open_marker(kind: EditKind, id: &str) -> String {
    format!("{MARKER_START}{}:{id}{MARKER_END}", kind.tag())
}

pub fn close_marker(kind: EditKind, id: &str) -> String {
    format!("{MARKER_START}/{}:{id}{MARKER_END}", kind.tag())
}

/// Wrap `content` in a matched marker pair
pub fn wrap(kind: EditKind, id: &str, content: &str) -> String {
    let mut out = open_marker(kind, id);
    out.push_str(content);
    out.push_str(&close_marker(kind, id));
    out
}

/// True when `text` contains either sentinel
pub fn find_reserved(text: &str) -> Option<char> {
    text.chars().find(|ch| *ch == MARKER_START || *ch == MARKER_END)
}

/// First character that XML 1.0 does not allow in a document
pub fn find_non_xml(text: &str) -> Option<char> {
    text.chars().find(|ch| !is_xml_char(*ch))
}

fn is_xml_char(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}
