//! Display text for links written without any.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;

use crate::format::{Formatter, NoSections};
use crate::model::{Entity, EntityIndex, Link, LinkTarget};
use crate::parsing::parse_markdown;
use crate::source::{DeclId, SourceTree};

use super::Pass;
use super::project::{project_declaration, project_entity, project_target};

/// Link text template per target kind. An empty template leaves the link
/// without text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTemplates {
    pub declaration: String,
    pub module: String,
    pub inventory: String,
    pub uri: String,
    pub unresolved: String,
}

impl Default for LinkTemplates {
    fn default() -> Self {
        Self {
            declaration: "`{{ name|safe }}`".into(),
            module: "{{ name }}".into(),
            inventory: "`{{ entry|safe }}`".into(),
            uri: String::new(),
            unresolved: String::new(),
        }
    }
}

impl LinkTemplates {
    fn for_target(&self, target: &LinkTarget) -> &str {
        match target {
            LinkTarget::DeclarationRef(_) => &self.declaration,
            LinkTarget::Module(_) => &self.module,
            LinkTarget::ExternalInventoryRef(_) => &self.inventory,
            LinkTarget::Uri(_) => &self.uri,
            LinkTarget::Unresolved(_) => &self.unresolved,
        }
    }
}

/// Projections of every documented declaration and module, taken before
/// the pass so link text never sees another entity mid-transform.
#[derive(Debug, Default)]
pub struct TargetProjections {
    declarations: HashMap<DeclId, Value>,
    modules: HashMap<String, Value>,
}

impl TargetProjections {
    fn build(index: &EntityIndex, source: &SourceTree) -> Self {
        let mut projections = Self::default();
        for entity in index {
            entity.walk(&mut |e| {
                let projected = match e {
                    Entity::Declaration(_) | Entity::Module(_) => project_entity(e, source),
                    _ => return,
                };
                match (e, projected) {
                    (Entity::Declaration(d), Ok(value)) => {
                        projections.declarations.entry(d.declaration).or_insert(value);
                    }
                    (Entity::Module(m), Ok(value)) => {
                        projections.modules.entry(m.name.clone()).or_insert(value);
                    }
                    (_, Err(err)) => log::warn!("cannot project entity: {err}"),
                    _ => {}
                }
            });
        }
        projections
    }
}

pub struct LinkTextPass {
    source: Arc<SourceTree>,
    templates: LinkTemplates,
    formatter: Arc<dyn Formatter>,
}

impl LinkTextPass {
    pub fn new(
        source: Arc<SourceTree>,
        templates: LinkTemplates,
        formatter: Arc<dyn Formatter>,
    ) -> Self {
        Self {
            source,
            templates,
            formatter,
        }
    }

    fn projection(&self, target: &LinkTarget, known: &TargetProjections) -> anyhow::Result<Value> {
        let cached = match target {
            LinkTarget::DeclarationRef(id) => known.declarations.get(id),
            LinkTarget::Module(name) => known.modules.get(name),
            _ => None,
        };
        Ok(match (cached, target) {
            (Some(value), _) => value.clone(),
            (None, LinkTarget::DeclarationRef(id)) if self.source.contains(*id) => {
                project_declaration(*id, &Default::default(), &self.source)?
            }
            (None, _) => project_target(target)?,
        })
    }

    fn fill(&self, link: &mut Link, known: &TargetProjections) -> anyhow::Result<()> {
        if !link.children.is_empty() {
            return Ok(());
        }
        if let LinkTarget::DeclarationRef(id) = &link.target
            && !self.source.contains(*id)
        {
            log::warn!("link to unknown declaration #{} left without text", id.0);
            return Ok(());
        }
        let template = self.templates.for_target(&link.target);
        if template.trim().is_empty() {
            return Ok(());
        }
        let projection = self.projection(&link.target, known)?;
        let rendered = self
            .formatter
            .format(template, &projection, &mut NoSections)
            .with_context(|| format!("{} link template", link.target.kind_name()))?;
        link.children = inline_content(parse_markdown(&rendered));
        Ok(())
    }
}

/// Flattens rendered blocks to the inline content a link can hold.
fn inline_content(blocks: Vec<Entity>) -> Vec<Entity> {
    let mut inline = Vec::new();
    for block in blocks {
        match block {
            Entity::Paragraph(children) => inline.extend(children),
            Entity::Heading(h) => inline.extend(h.children),
            other if other.is_block() => inline.push(Entity::text(other.plain_text())),
            other => inline.push(other),
        }
    }
    inline
}

impl Pass for LinkTextPass {
    type Snapshot = TargetProjections;

    fn name(&self) -> &'static str {
        "link text"
    }

    fn snapshot(&self, index: &EntityIndex) -> Self::Snapshot {
        TargetProjections::build(index, &self.source)
    }

    fn apply(&self, entity: &mut Entity, known: &TargetProjections) -> anyhow::Result<()> {
        let mut result = Ok(());
        entity.walk_mut(&mut |e| {
            if result.is_err() {
                return;
            }
            if let Entity::Link(link) = e {
                result = self.fill(link, known);
            }
        });
        result
    }
}
