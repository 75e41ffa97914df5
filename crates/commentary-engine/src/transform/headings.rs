//! Heading synthesis from per-kind templates.

use std::sync::Arc;

use anyhow::Context;

use crate::format::{EntitySections, Formatter};
use crate::model::{Entity, EntityIndex, ExcludeMode};
use crate::parsing::parse_markdown;
use crate::source::SourceTree;

use super::Pass;
use super::project::project_entity;

const MAX_HEADING_LEVEL: u8 = 6;

/// Heading template per documentation kind. An empty template synthesizes
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingTemplates {
    pub declaration: String,
    pub module: String,
    pub group: String,
    pub document: String,
}

impl Default for HeadingTemplates {
    fn default() -> Self {
        Self {
            declaration: "# {{ kind_label }} {{ qualified_name }}".into(),
            module: "# Module {{ name }}".into(),
            group: "# {{ output_section }}".into(),
            document: String::new(),
        }
    }
}

impl HeadingTemplates {
    fn for_entity(&self, entity: &Entity) -> Option<&str> {
        let template = match entity {
            Entity::Declaration(_) => &self.declaration,
            Entity::Module(_) => &self.module,
            Entity::Group(_) => &self.group,
            Entity::Document(_) => &self.document,
            _ => return None,
        };
        Some(template.as_str()).filter(|t| !t.trim().is_empty())
    }
}

pub struct HeadingPass {
    source: Arc<SourceTree>,
    templates: HeadingTemplates,
    formatter: Arc<dyn Formatter>,
}

impl HeadingPass {
    pub fn new(
        source: Arc<SourceTree>,
        templates: HeadingTemplates,
        formatter: Arc<dyn Formatter>,
    ) -> Self {
        Self {
            source,
            templates,
            formatter,
        }
    }

    fn synthesize(&self, entity: &mut Entity, depth: u8) -> anyhow::Result<()> {
        self.prepend_heading(entity, depth)?;
        let depth = if entity.is_documentation() {
            depth.saturating_add(1)
        } else {
            depth
        };
        if let Some(children) = entity.children_mut() {
            for child in children
                .iter_mut()
                .filter(|c| matches!(c, Entity::Section(_)) || c.is_documentation())
            {
                self.synthesize(child, depth)?;
            }
        }
        Ok(())
    }

    fn prepend_heading(&self, entity: &mut Entity, depth: u8) -> anyhow::Result<()> {
        let Some(template) = self.templates.for_entity(entity) else {
            return Ok(());
        };
        if matches!(entity.children().first(), Some(Entity::Heading(_))) {
            return Ok(());
        }
        if let Some(fields) = entity.documentation() {
            if fields.exclude_mode == ExcludeMode::Exclude {
                return Ok(());
            }
            if matches!(entity, Entity::Group(_)) && fields.output_section.is_none() {
                return Ok(());
            }
        }

        let projection = project_entity(entity, &self.source)?;
        let rendered = self
            .formatter
            .format(template, &projection, &mut EntitySections(entity))
            .context("heading template")?;

        let mut blocks = parse_markdown(&rendered);
        for block in &mut blocks {
            block.walk_mut(&mut |e| {
                if let Entity::Heading(h) = e {
                    h.level = h.level.saturating_add(depth).min(MAX_HEADING_LEVEL);
                }
            });
        }
        if let Some(children) = entity.children_mut() {
            children.splice(0..0, blocks);
        }
        Ok(())
    }
}

impl Pass for HeadingPass {
    type Snapshot = ();

    fn name(&self) -> &'static str {
        "headings"
    }

    fn snapshot(&self, _index: &EntityIndex) -> Self::Snapshot {}

    fn apply(&self, entity: &mut Entity, _snapshot: &()) -> anyhow::Result<()> {
        self.synthesize(entity, 0)
    }
}
