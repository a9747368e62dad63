//! Markdown codec: encode-only rendering of a small markdown subset to
//! HTML. Headings, unordered lists and paragraphs at block level; inline
//! code spans, bold and italic.

use std::sync::Arc;

use super::registry::{Coder, CodecSpec};
use super::{CodecError, Errors};

fn encode(text: &str, _errors: Errors) -> Result<String, CodecError> {
    Ok(render(text))
}

fn render(text: &str) -> String {
    let mut out = String::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut list_open = false;

    let flush_paragraph = |out: &mut String, paragraph: &mut Vec<&str>| {
        if !paragraph.is_empty() {
            out.push_str("<p>");
            out.push_str(&inline(&paragraph.join(" ")));
            out.push_str("</p>\n");
            paragraph.clear();
        }
    };

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            flush_paragraph(&mut out, &mut paragraph);
            if list_open {
                out.push_str("</ul>\n");
                list_open = false;
            }
            continue;
        }
        if let Some((level, title)) = heading(trimmed) {
            flush_paragraph(&mut out, &mut paragraph);
            if list_open {
                out.push_str("</ul>\n");
                list_open = false;
            }
            out.push_str(&format!("<h{level}>{}</h{level}>\n", inline(title)));
            continue;
        }
        if let Some(item) = list_item(trimmed) {
            flush_paragraph(&mut out, &mut paragraph);
            if !list_open {
                out.push_str("<ul>\n");
                list_open = true;
            }
            out.push_str(&format!("<li>{}</li>\n", inline(item)));
            continue;
        }
        if list_open {
            out.push_str("</ul>\n");
            list_open = false;
        }
        paragraph.push(trimmed);
    }
    flush_paragraph(&mut out, &mut paragraph);
    if list_open {
        out.push_str("</ul>\n");
    }
    out
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&level) {
        let rest = &line[level..];
        if let Some(title) = rest.strip_prefix(' ') {
            return Some((level, title.trim()));
        }
    }
    None
}

fn list_item(line: &str) -> Option<&str> {
    line.strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .map(str::trim)
}

/// Inline rendering: code spans first so their contents escape markup
/// processing, then bold, then italic.
fn inline(text: &str) -> String {
    let mut out = String::new();
    let mut rest = text;
    while let Some(open) = rest.find('`') {
        if let Some(close) = rest[open + 1..].find('`') {
            out.push_str(&emphasis(&escape(&rest[..open])));
            out.push_str("<code>");
            out.push_str(&escape(&rest[open + 1..open + 1 + close]));
            out.push_str("</code>");
            rest = &rest[open + close + 2..];
        } else {
            break;
        }
    }
    out.push_str(&emphasis(&escape(rest)));
    out
}

fn emphasis(text: &str) -> String {
    let bold = replace_paired(text, "**", "<strong>", "</strong>");
    replace_paired(&bold, "*", "<em>", "</em>")
}

fn replace_paired(text: &str, delim: &str, open: &str, close: &str) -> String {
    let mut out = String::new();
    let mut rest = text;
    loop {
        let Some(start) = rest.find(delim) else { break };
        let after = &rest[start + delim.len()..];
        let Some(end) = after.find(delim) else { break };
        if end == 0 {
            break;
        }
        out.push_str(&rest[..start]);
        out.push_str(open);
        out.push_str(&after[..end]);
        out.push_str(close);
        rest = &after[end + delim.len()..];
    }
    out.push_str(rest);
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub(super) fn spec() -> CodecSpec {
    CodecSpec {
        name: "markdown",
        encode: Some(Coder::Direct(Arc::new(encode))),
        decode: None,
        pattern: Some(r"^(?:markdown|Markdown|md)$"),
        text_only: true,
    }
}
