use super::documentation::{
    DeclarationDocumentation, DocFields, Document, GroupDocumentation, ModuleDocumentation,
    Section, SectionKind,
};
use super::index::EntityKey;
use super::markup::{CodeBlock, Heading, Image, Link, List};

/// A node of the document model.
///
/// Container variants own their children; the model is a tree with no
/// sharing. Capabilities (anchored, documentation) are plain fields on the
/// variants that have them and are reached through the accessors below.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Text(String),
    SoftBreak,
    HardBreak,
    ThematicBreak,
    Emphasis(Vec<Entity>),
    StrongEmphasis(Vec<Entity>),
    Code(String),
    CodeBlock(CodeBlock),
    Image(Image),
    Link(Link),
    List(List),
    ListItem(Vec<Entity>),
    Paragraph(Vec<Entity>),
    BlockQuote(Vec<Entity>),
    Heading(Heading),
    Section(Section),
    Document(Document),
    Module(ModuleDocumentation),
    Group(GroupDocumentation),
    Declaration(DeclarationDocumentation),
}

impl Entity {
    pub fn text(s: impl Into<String>) -> Self {
        Entity::Text(s.into())
    }

    /// Children of container kinds; leaves have none.
    pub fn children(&self) -> &[Entity] {
        match self {
            Entity::Text(_)
            | Entity::SoftBreak
            | Entity::HardBreak
            | Entity::ThematicBreak
            | Entity::Code(_)
            | Entity::CodeBlock(_) => &[],
            Entity::Emphasis(c)
            | Entity::StrongEmphasis(c)
            | Entity::ListItem(c)
            | Entity::Paragraph(c)
            | Entity::BlockQuote(c) => c,
            Entity::Image(i) => &i.children,
            Entity::Link(l) => &l.children,
            Entity::List(l) => &l.children,
            Entity::Heading(h) => &h.children,
            Entity::Section(s) => &s.children,
            Entity::Document(d) => &d.children,
            Entity::Module(m) => &m.children,
            Entity::Group(g) => &g.children,
            Entity::Declaration(d) => &d.children,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Entity>> {
        match self {
            Entity::Text(_)
            | Entity::SoftBreak
            | Entity::HardBreak
            | Entity::ThematicBreak
            | Entity::Code(_)
            | Entity::CodeBlock(_) => None,
            Entity::Emphasis(c)
            | Entity::StrongEmphasis(c)
            | Entity::ListItem(c)
            | Entity::Paragraph(c)
            | Entity::BlockQuote(c) => Some(c),
            Entity::Image(i) => Some(&mut i.children),
            Entity::Link(l) => Some(&mut l.children),
            Entity::List(l) => Some(&mut l.children),
            Entity::Heading(h) => Some(&mut h.children),
            Entity::Section(s) => Some(&mut s.children),
            Entity::Document(d) => Some(&mut d.children),
            Entity::Module(m) => Some(&mut m.children),
            Entity::Group(g) => Some(&mut g.children),
            Entity::Declaration(d) => Some(&mut d.children),
        }
    }

    /// Cross-reference id of anchored kinds (empty until the anchor pass).
    pub fn anchor(&self) -> Option<&str> {
        match self {
            Entity::Document(d) => Some(&d.id),
            Entity::Module(m) => Some(&m.id),
            Entity::Group(g) => Some(&g.id),
            Entity::Declaration(d) => Some(&d.id),
            _ => None,
        }
    }

    pub fn anchor_mut(&mut self) -> Option<&mut String> {
        match self {
            Entity::Document(d) => Some(&mut d.id),
            Entity::Module(m) => Some(&mut m.id),
            Entity::Group(g) => Some(&mut g.id),
            Entity::Declaration(d) => Some(&mut d.id),
            _ => None,
        }
    }

    pub fn documentation(&self) -> Option<&DocFields> {
        match self {
            Entity::Module(m) => Some(&m.fields),
            Entity::Group(g) => Some(&g.fields),
            Entity::Declaration(d) => Some(&d.fields),
            _ => None,
        }
    }

    pub fn documentation_mut(&mut self) -> Option<&mut DocFields> {
        match self {
            Entity::Module(m) => Some(&mut m.fields),
            Entity::Group(g) => Some(&mut g.fields),
            Entity::Declaration(d) => Some(&mut d.fields),
            _ => None,
        }
    }

    pub fn is_documentation(&self) -> bool {
        self.documentation().is_some()
    }

    /// Identity of a top-level entity in the index.
    pub fn key(&self) -> Option<EntityKey> {
        match self {
            Entity::Declaration(d) => Some(EntityKey::Declaration(d.declaration)),
            Entity::Module(m) => Some(EntityKey::Module(m.name.clone())),
            Entity::Document(d) => Some(EntityKey::Document(d.path.clone())),
            Entity::Group(g) => g.children.iter().find_map(Entity::key),
            _ => None,
        }
    }

    /// Concatenated text content with markup stripped.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.push_plain_text(&mut out);
        out
    }

    fn push_plain_text(&self, out: &mut String) {
        match self {
            Entity::Text(t) | Entity::Code(t) => out.push_str(t),
            Entity::SoftBreak | Entity::HardBreak => out.push(' '),
            Entity::CodeBlock(c) => out.push_str(&c.code),
            _ => {
                for child in self.children() {
                    child.push_plain_text(out);
                }
            }
        }
    }

    /// Pre-order traversal over this entity and all descendants.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Entity)) {
        f(self);
        if let Some(children) = self.children_mut() {
            for child in children {
                child.walk_mut(f);
            }
        }
    }

    /// First entity of this subtree, `self` included, documenting `key`.
    pub fn find_documentation(&self, key: &EntityKey) -> Option<&Entity> {
        if self.key().as_ref() == Some(key) {
            return Some(self);
        }
        self.children()
            .iter()
            .find_map(|child| child.find_documentation(key))
    }

    pub fn walk(&self, f: &mut impl FnMut(&Entity)) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }

    /// First section of `kind` among the direct children.
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.children().iter().find_map(|c| match c {
            Entity::Section(s) if s.kind == kind => Some(s),
            _ => None,
        })
    }

    pub fn section_mut(&mut self, kind: SectionKind) -> Option<&mut Section> {
        self.children_mut()?.iter_mut().find_map(|c| match c {
            Entity::Section(s) if s.kind == kind => Some(s),
            _ => None,
        })
    }

    /// Returns the section of `kind`, appending an empty one if absent.
    ///
    /// Returns `None` for kinds that cannot hold sections.
    pub fn ensure_section(&mut self, kind: SectionKind) -> Option<&mut Section> {
        let children = self.children_mut()?;
        let pos = match children
            .iter()
            .position(|c| matches!(c, Entity::Section(s) if s.kind == kind))
        {
            Some(pos) => pos,
            None => {
                children.push(Entity::Section(Section::new(kind)));
                children.len() - 1
            }
        };
        match &mut children[pos] {
            Entity::Section(s) => Some(s),
            _ => None,
        }
    }

    pub fn remove_section(&mut self, kind: SectionKind) -> Option<Section> {
        let children = self.children_mut()?;
        let pos = children
            .iter()
            .position(|c| matches!(c, Entity::Section(s) if s.kind == kind))?;
        match children.remove(pos) {
            Entity::Section(s) => Some(s),
            _ => None,
        }
    }

    /// True for kinds laid out as blocks rather than inline content.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Entity::ThematicBreak
                | Entity::CodeBlock(_)
                | Entity::List(_)
                | Entity::ListItem(_)
                | Entity::Paragraph(_)
                | Entity::BlockQuote(_)
                | Entity::Heading(_)
                | Entity::Section(_)
                | Entity::Document(_)
                | Entity::Module(_)
                | Entity::Group(_)
                | Entity::Declaration(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::DeclId;

    fn doc_with_brief() -> Entity {
        let mut doc = DeclarationDocumentation::new(DeclId(1));
        doc.children.push(Entity::Section(Section {
            kind: SectionKind::Brief,
            children: vec![Entity::Paragraph(vec![Entity::text("Swaps.")])],
        }));
        Entity::Declaration(doc)
    }

    #[test]
    fn plain_text_flattens_markup() {
        let para = Entity::Paragraph(vec![
            Entity::text("Namespace "),
            Entity::Emphasis(vec![Entity::Code("ns1".into())]),
            Entity::SoftBreak,
            Entity::text("end"),
        ]);
        assert_eq!(para.plain_text(), "Namespace ns1 end");
    }

    #[test]
    fn section_lookup_and_removal() {
        let mut doc = doc_with_brief();
        assert!(doc.section(SectionKind::Brief).is_some());
        assert!(doc.section(SectionKind::Details).is_none());

        let removed = doc.remove_section(SectionKind::Brief).unwrap();
        assert_eq!(removed.children.len(), 1);
        assert!(doc.section(SectionKind::Brief).is_none());
    }

    #[test]
    fn ensure_section_is_idempotent() {
        let mut doc = doc_with_brief();
        doc.ensure_section(SectionKind::Parameters);
        doc.ensure_section(SectionKind::Parameters);
        let count = doc
            .children()
            .iter()
            .filter(|c| matches!(c, Entity::Section(s) if s.kind == SectionKind::Parameters))
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn leaves_have_no_sections() {
        let mut text = Entity::text("x");
        assert!(text.ensure_section(SectionKind::Brief).is_none());
        assert!(text.anchor().is_none());
        assert!(text.key().is_none());
    }

    #[test]
    fn group_key_is_first_member() {
        let group = Entity::Group(GroupDocumentation {
            name: "swap".into(),
            id: String::new(),
            fields: DocFields::default(),
            children: vec![doc_with_brief()],
        });
        assert_eq!(group.key(), Some(EntityKey::Declaration(DeclId(1))));
    }
}
