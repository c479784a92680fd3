use crate::error::{MarkupError, MarkupResult};
use crate::segment::Segment;
use crate::tokenizer::{tokenize, MarkerTag, Token};

/// An edit span that has been opened but not yet closed
struct OpenSpan<'src> {
    tag: MarkerTag<'src>,
    pos: usize,
    text: String,
}

/// Parse annotated text into an ordered sequence of segments.
///
/// Single pass, no nesting: every closer must match the span opened directly
/// before it. Plain text is kept verbatim, whitespace included.
pub fn parse(annotated: &str) -> MarkupResult<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut open: Option<OpenSpan<'_>> = None;

    for (token, span) in tokenize(annotated)? {
        match token {
            Token::Text(text) => match open.as_mut() {
                Some(current) => current.text.push_str(text),
                None => segments.push(Segment::plain(text)),
            },

            Token::Open(tag) => {
                if let Some(outer) = &open {
                    return Err(MarkupError::NestedOpen {
                        pos: span.start,
                        outer: outer.tag.to_string(),
                        found: tag.to_string(),
                    });
                }
                open = Some(OpenSpan {
                    tag,
                    pos: span.start,
                    text: String::new(),
                });
            }

            Token::Close(tag) => {
                let current = open.take().ok_or_else(|| MarkupError::UnexpectedClose {
                    pos: span.start,
                    found: tag.to_string(),
                })?;
                if current.tag != tag {
                    return Err(MarkupError::MismatchedClose {
                        pos: span.start,
                        expected: current.tag.to_string(),
                        found: tag.to_string(),
                    });
                }
                segments.push(Segment::edit(tag.kind, tag.id, current.text));
            }
        }
    }

    if let Some(current) = open {
        return Err(MarkupError::Unterminated {
            pos: current.pos,
            tag: current.tag.to_string(),
        });
    }

    Ok(segments)
}
