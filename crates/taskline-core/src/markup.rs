//! Style tags for output text.
//!
//! Text written through [`Output::write`](crate::Output::write) may contain
//! `<info>`, `<comment>`, `<question>` and `<error>` spans. Decorated
//! destinations render them as ANSI colors, undecorated ones strip the tags.
//! A span ends at the matching closing tag, at `</>`, or at the end of the
//! text. Unknown tags are left untouched.

use crossterm::style::Stylize;

/// Named style of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Info,
    Comment,
    Question,
    Error,
}

impl Style {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "info" => Some(Self::Info),
            "comment" => Some(Self::Comment),
            "question" => Some(Self::Question),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    fn apply(self, content: &str) -> String {
        match self {
            Self::Info => content.green().to_string(),
            Self::Comment => content.yellow().to_string(),
            Self::Question => content.black().on_cyan().to_string(),
            Self::Error => content.white().on_red().to_string(),
        }
    }
}

/// Render style tags in `text`.
pub fn render(text: &str, decorated: bool) -> String {
    let mut rendered = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('<') {
        rendered.push_str(&rest[..start]);
        let tail = &rest[start..];

        match parse_span(tail) {
            Some((style, content, consumed)) => {
                let content = render(content, decorated);
                if decorated && !content.is_empty() {
                    rendered.push_str(&style.apply(&content));
                } else {
                    rendered.push_str(&content);
                }
                rest = &tail[consumed..];
            }
            None => {
                rendered.push('<');
                rest = &tail[1..];
            }
        }
    }

    rendered.push_str(rest);
    rendered
}

/// Parse a styled span at the start of `tail`.
///
/// Returns the style, the span content and the number of bytes consumed.
fn parse_span(tail: &str) -> Option<(Style, &str, usize)> {
    let open_end = tail.find('>')?;
    let tag = &tail[1..open_end];
    let style = Style::from_tag(tag)?;

    let body = &tail[open_end + 1..];
    let closing = format!("</{tag}>");
    let (content_len, closing_len) = match body.find(&closing) {
        Some(index) => (index, closing.len()),
        None => match body.find("</>") {
            Some(index) => (index, 3),
            None => (body.len(), 0),
        },
    };

    Some((
        style,
        &body[..content_len],
        open_end + 1 + content_len + closing_len,
    ))
}
