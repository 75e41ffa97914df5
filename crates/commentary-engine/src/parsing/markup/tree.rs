use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag};

use crate::model::{CodeBlock, Entity, Heading, Image, Link, LinkTarget, List};

/// Leading characters of a `[name]()` target requesting a fuzzy lookup.
pub const FUZZY_PREFIXES: [char; 2] = ['*', '?'];

#[derive(Debug)]
enum FrameKind {
    Root,
    Paragraph,
    Heading(u8),
    BlockQuote,
    CodeBlock(String),
    HtmlBlock,
    List(bool),
    Item,
    Emphasis,
    Strong,
    Link { dest: String, title: String },
    Image { dest: String, title: String },
    /// Constructs outside the model; children are spliced into the parent.
    Transparent,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    children: Vec<Entity>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            children: vec![],
        }
    }

    /// Appends a child, merging adjacent text.
    fn push(&mut self, entity: Entity) {
        if let (Entity::Text(new), Some(Entity::Text(last))) = (&entity, self.children.last_mut()) {
            last.push_str(new);
            return;
        }
        self.children.push(entity);
    }

    fn finish(self) -> Vec<Entity> {
        let children = self.children;
        let entity = match self.kind {
            FrameKind::Root | FrameKind::Transparent => return children,
            FrameKind::Paragraph | FrameKind::HtmlBlock => Entity::Paragraph(children),
            FrameKind::Heading(level) => Entity::Heading(Heading { level, children }),
            FrameKind::BlockQuote => Entity::BlockQuote(children),
            FrameKind::CodeBlock(language) => {
                let code = children.iter().map(Entity::plain_text).collect();
                Entity::CodeBlock(CodeBlock { language, code })
            }
            FrameKind::List(ordered) => Entity::List(List { ordered, children }),
            FrameKind::Item => Entity::ListItem(children),
            FrameKind::Emphasis => Entity::Emphasis(children),
            FrameKind::Strong => Entity::StrongEmphasis(children),
            FrameKind::Link { dest, title } => link(dest, title, children),
            FrameKind::Image { dest, title } => Entity::Image(Image {
                src: dest,
                title,
                children,
            }),
        };
        vec![entity]
    }
}

/// Builds a link, deciding its initial target from the destination.
///
/// - `[text](<> "title")`: unresolved, target is the title
/// - `[name]()`: unresolved, target is the raw name; a fuzzy prefix is
///   dropped from the display text only
/// - any non-empty destination: a URI
fn link(dest: String, title: String, mut children: Vec<Entity>) -> Entity {
    if !dest.is_empty() {
        return Entity::Link(Link {
            target: LinkTarget::Uri(dest),
            title,
            children,
        });
    }
    if !title.is_empty() {
        return Entity::Link(Link {
            target: LinkTarget::Unresolved(title),
            title: String::new(),
            children,
        });
    }
    let raw = match children.as_mut_slice() {
        [Entity::Text(text)] => {
            let raw = text.clone();
            if let Some(display) = raw.strip_prefix(FUZZY_PREFIXES) {
                *text = display.to_string();
            }
            raw
        }
        _ => children.iter().map(Entity::plain_text).collect(),
    };
    Entity::Link(Link {
        target: LinkTarget::Unresolved(raw),
        title,
        children,
    })
}

/// Parses markdown into block-level entities.
///
/// Never fails: anything the model has no node for degrades to its text.
pub fn parse_markdown(text: &str) -> Vec<Entity> {
    let mut stack = vec![Frame::new(FrameKind::Root)];

    for event in Parser::new(text) {
        match event {
            Event::Start(tag) => stack.push(Frame::new(frame_kind(tag))),
            Event::End(_) => close_frame(&mut stack),
            event => {
                if let (Some(entity), Some(frame)) = (leaf(event), stack.last_mut()) {
                    frame.push(entity);
                }
            }
        }
    }

    while stack.len() > 1 {
        close_frame(&mut stack);
    }
    stack.pop().map(Frame::finish).unwrap_or_default()
}

/// Pops the innermost frame into its parent. The root is never popped.
fn close_frame(stack: &mut Vec<Frame>) {
    if stack.len() < 2 {
        return;
    }
    let Some(frame) = stack.pop() else {
        return;
    };
    if let Some(parent) = stack.last_mut() {
        for entity in frame.finish() {
            parent.push(entity);
        }
    }
}

fn frame_kind(tag: Tag<'_>) -> FrameKind {
    match tag {
        Tag::Paragraph => FrameKind::Paragraph,
        Tag::Heading { level, .. } => FrameKind::Heading(level as u8),
        Tag::BlockQuote(_) => FrameKind::BlockQuote,
        Tag::CodeBlock(CodeBlockKind::Fenced(info)) => FrameKind::CodeBlock(info.to_string()),
        Tag::CodeBlock(CodeBlockKind::Indented) => FrameKind::CodeBlock(String::new()),
        Tag::HtmlBlock => FrameKind::HtmlBlock,
        Tag::List(start) => FrameKind::List(start.is_some()),
        Tag::Item => FrameKind::Item,
        Tag::Emphasis => FrameKind::Emphasis,
        Tag::Strong => FrameKind::Strong,
        Tag::Link {
            dest_url, title, ..
        } => FrameKind::Link {
            dest: dest_url.to_string(),
            title: title.to_string(),
        },
        Tag::Image {
            dest_url, title, ..
        } => FrameKind::Image {
            dest: dest_url.to_string(),
            title: title.to_string(),
        },
        _ => FrameKind::Transparent,
    }
}

fn leaf(event: Event<'_>) -> Option<Entity> {
    Some(match event {
        Event::Text(t) | Event::Html(t) | Event::InlineHtml(t) => Entity::Text(t.to_string()),
        Event::Code(c) | Event::InlineMath(c) | Event::DisplayMath(c) => Entity::Code(c.to_string()),
        Event::SoftBreak => Entity::SoftBreak,
        Event::HardBreak => Entity::HardBreak,
        Event::Rule => Entity::ThematicBreak,
        Event::FootnoteReference(name) => Entity::Text(format!("[^{name}]")),
        Event::TaskListMarker(done) => Entity::Text(if done { "[x] " } else { "[ ] " }.into()),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn single_link(text: &str) -> Link {
        match parse_markdown(text).as_slice() {
            [Entity::Paragraph(children)] => match children.as_slice() {
                [Entity::Link(link)] => link.clone(),
                other => panic!("expected a lone link, got {other:?}"),
            },
            other => panic!("expected one paragraph, got {other:?}"),
        }
    }

    #[test]
    fn paragraph_with_markup() {
        let blocks = parse_markdown("Swaps *a* and `b`.");
        assert_eq!(
            blocks,
            vec![Entity::Paragraph(vec![
                Entity::text("Swaps "),
                Entity::Emphasis(vec![Entity::text("a")]),
                Entity::text(" and "),
                Entity::Code("b".into()),
                Entity::text("."),
            ])]
        );
    }

    #[test]
    fn empty_destination_is_unresolved_name() {
        let link = single_link("[swap]()");
        assert_eq!(link.target, LinkTarget::Unresolved("swap".into()));
        assert_eq!(link.children, vec![Entity::text("swap")]);
    }

    #[test]
    fn fuzzy_prefix_is_kept_in_target_only() {
        let link = single_link("[*swap]()");
        assert_eq!(link.target, LinkTarget::Unresolved("*swap".into()));
        assert_eq!(link.children, vec![Entity::text("swap")]);

        let link = single_link("[?Swap]()");
        assert_eq!(link.target, LinkTarget::Unresolved("?Swap".into()));
        assert_eq!(link.children, vec![Entity::text("Swap")]);
    }

    #[test]
    fn title_of_empty_destination_is_the_target() {
        let link = single_link(r#"[the swap](<> "ns1::swap")"#);
        assert_eq!(link.target, LinkTarget::Unresolved("ns1::swap".into()));
        assert_eq!(link.title, "");
        assert_eq!(link.children, vec![Entity::text("the swap")]);
    }

    #[test]
    fn styled_link_text_uses_plain_text() {
        let link = single_link("[*ns*::swap]()");
        assert_eq!(link.target, LinkTarget::Unresolved("ns::swap".into()));
    }

    #[test]
    fn non_empty_destination_is_uri() {
        let link = single_link(r#"[docs](https://example.com "Docs")"#);
        assert_eq!(link.target, LinkTarget::Uri("https://example.com".into()));
        assert_eq!(link.title, "Docs");
    }

    #[test]
    fn blocks_are_recognised() {
        let blocks = parse_markdown("# Title\n\n> quoted\n\n- a\n- b\n\n```cpp\nint x;\n```\n\n---\n");
        assert!(matches!(&blocks[0], Entity::Heading(h) if h.level == 1));
        assert!(matches!(&blocks[1], Entity::BlockQuote(_)));
        assert!(matches!(&blocks[2], Entity::List(l) if !l.ordered && l.children.len() == 2));
        assert_eq!(
            blocks[3],
            Entity::CodeBlock(CodeBlock {
                language: "cpp".into(),
                code: "int x;\n".into(),
            })
        );
        assert_eq!(blocks[4], Entity::ThematicBreak);
    }

    #[test]
    fn html_degrades_to_text() {
        let blocks = parse_markdown("a <b>bold</b> word");
        assert_eq!(blocks[0].plain_text(), "a <b>bold</b> word");
    }

    #[test]
    fn empty_input_has_no_blocks() {
        assert!(parse_markdown("").is_empty());
        assert!(parse_markdown("\n\n").is_empty());
    }
}
