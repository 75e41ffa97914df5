//! Markdown emission: the inverse of [`parse_markdown`](super::parse_markdown).
//!
//! Output re-parses to an equivalent tree up to whitespace and list
//! looseness. Internal link targets travel as `[text](<> "target")`, where
//! resolved targets use the carrier encoding.

use crate::model::{CodeBlock, Entity, Image, Link, LinkTarget, carrier};

/// Backslash-escapes every ASCII punctuation character so `text` re-parses
/// as inert text.
///
/// Spaces and tabs that start a line are written as character references
/// (`&#32;`, `&#9;`), so indentation survives without opening a code block.
pub fn escape(text: &str) -> String {
    escape_from(text, true)
}

fn escape_from(text: &str, mut line_start: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ' ' if line_start => out.push_str("&#32;"),
            '\t' if line_start => out.push_str("&#9;"),
            _ => {
                line_start = c == '\n';
                if c.is_ascii_punctuation() {
                    out.push('\\');
                }
                out.push(c);
            }
        }
    }
    out
}

/// Renders entities as markdown blocks separated by blank lines.
///
/// Runs of inline entities at block level are emitted as one paragraph.
pub fn emit(entities: &[Entity]) -> String {
    let mut blocks = Vec::new();
    let mut inline = String::new();
    for entity in entities {
        if entity.is_block() {
            if !inline.is_empty() {
                blocks.push(std::mem::take(&mut inline));
            }
            let block = emit_block(entity);
            if !block.is_empty() {
                blocks.push(block);
            }
        } else {
            push_inline(entity, &mut inline);
        }
    }
    if !inline.is_empty() {
        blocks.push(inline);
    }
    blocks.join("\n\n")
}

/// Renders entities as inline markdown.
pub fn emit_inline(entities: &[Entity]) -> String {
    let mut out = String::new();
    for entity in entities {
        push_inline(entity, &mut out);
    }
    out
}

fn emit_block(entity: &Entity) -> String {
    match entity {
        Entity::Paragraph(children) => emit_inline(children),
        Entity::Heading(h) => format!(
            "{} {}",
            "#".repeat(usize::from(h.level.clamp(1, 6))),
            emit_inline(&h.children).replace('\n', " ")
        ),
        Entity::ThematicBreak => "---".to_string(),
        Entity::CodeBlock(c) => code_block(c),
        Entity::BlockQuote(children) => prefix_lines(&emit(children), "> ", ">"),
        Entity::List(list) => list
            .children
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let marker = if list.ordered {
                    format!("{}.", i + 1)
                } else {
                    "-".to_string()
                };
                list_item(&marker, item)
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Entity::ListItem(_) => list_item("-", entity),
        Entity::Section(_)
        | Entity::Document(_)
        | Entity::Module(_)
        | Entity::Group(_)
        | Entity::Declaration(_) => emit(entity.children()),
        _ => emit_inline(std::slice::from_ref(entity)),
    }
}

fn push_inline(entity: &Entity, out: &mut String) {
    match entity {
        Entity::Text(t) => {
            let line_start = out.is_empty() || out.ends_with('\n');
            out.push_str(&escape_from(t, line_start));
        }
        Entity::SoftBreak => out.push('\n'),
        Entity::HardBreak => out.push_str("\\\n"),
        Entity::Emphasis(children) => {
            out.push('*');
            out.push_str(&emit_inline(children));
            out.push('*');
        }
        Entity::StrongEmphasis(children) => {
            out.push_str("**");
            out.push_str(&emit_inline(children));
            out.push_str("**");
        }
        Entity::Code(code) => out.push_str(&code_span(code)),
        Entity::Link(link) => out.push_str(&link_markup(link)),
        Entity::Image(image) => out.push_str(&image_markup(image)),
        block => out.push_str(&emit_block(block)),
    }
}

fn link_markup(link: &Link) -> String {
    let text = emit_inline(&link.children);
    let (dest, title) = match &link.target {
        LinkTarget::Uri(uri) => (format!("<{}>", escape_destination(uri)), link.title.clone()),
        LinkTarget::Unresolved(raw) => ("<>".to_string(), raw.clone()),
        resolved => ("<>".to_string(), carrier_title(resolved)),
    };
    if title.is_empty() {
        format!("[{text}]({dest})")
    } else {
        format!("[{text}]({dest} \"{}\")", escape_title(&title))
    }
}

fn carrier_title(target: &LinkTarget) -> String {
    match carrier::encode(target) {
        Ok(uri) => uri,
        Err(e) => {
            log::warn!("cannot encode link target {target:?}: {e}");
            String::new()
        }
    }
}

fn image_markup(image: &Image) -> String {
    let alt = emit_inline(&image.children);
    let dest = escape_destination(&image.src);
    if image.title.is_empty() {
        format!("![{alt}](<{dest}>)")
    } else {
        format!("![{alt}](<{dest}> \"{}\")", escape_title(&image.title))
    }
}

fn escape_destination(dest: &str) -> String {
    dest.replace('\\', "\\\\")
        .replace('<', "\\<")
        .replace('>', "\\>")
}

fn escape_title(title: &str) -> String {
    title.replace('\\', "\\\\").replace('"', "\\\"")
}

fn longest_run(s: &str, ch: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in s.chars() {
        if c == ch {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn code_span(code: &str) -> String {
    let fence = "`".repeat(longest_run(code, '`') + 1);
    let padded = code.starts_with('`')
        || code.ends_with('`')
        || (code.starts_with(' ') && code.ends_with(' ') && !code.trim().is_empty());
    let pad = if padded { " " } else { "" };
    format!("{fence}{pad}{code}{pad}{fence}")
}

fn code_block(block: &CodeBlock) -> String {
    let fence = "`".repeat(longest_run(&block.code, '`').max(2) + 1);
    let newline = if block.code.is_empty() || block.code.ends_with('\n') {
        ""
    } else {
        "\n"
    };
    format!("{fence}{}\n{}{newline}{fence}", block.language, block.code)
}

fn list_item(marker: &str, item: &Entity) -> String {
    let body = match item {
        Entity::ListItem(children) => emit(children),
        other => emit(std::slice::from_ref(other)),
    };
    let indent = " ".repeat(marker.len() + 1);
    body.lines()
        .enumerate()
        .map(|(i, line)| match (i, line.is_empty()) {
            (0, _) => format!("{marker} {line}"),
            (_, true) => String::new(),
            _ => format!("{indent}{line}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

fn prefix_lines(text: &str, prefix: &str, empty: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                empty.to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
