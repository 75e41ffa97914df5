//! Exclusion policy: pattern, access and uncommented filters.
//!
//! Excluded top-level entities stay in the index with their mode set to
//! `Exclude` so renderers skip them; excluded nested documentation is
//! removed from its section outright.

use std::sync::Arc;

use regex::Regex;

use crate::model::{Entity, EntityIndex, ExcludeMode};
use crate::source::{Access, DeclId, DeclKind, SourceTree};

use super::Pass;

#[derive(Debug, Clone)]
pub struct FilterOptions {
    /// Matched against qualified names of declarations and module names.
    pub exclude: Vec<Regex>,
    pub exclude_private: bool,
    pub exclude_uncommented: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            exclude: vec![],
            exclude_private: true,
            exclude_uncommented: false,
        }
    }
}

impl FilterOptions {
    pub fn with_patterns<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let exclude = patterns
            .into_iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            exclude,
            ..Self::default()
        })
    }

    fn matches(&self, name: &str) -> bool {
        self.exclude.iter().any(|r| r.is_match(name))
    }
}

pub struct FilterPass {
    source: Arc<SourceTree>,
    options: FilterOptions,
}

impl FilterPass {
    pub fn new(source: Arc<SourceTree>, options: FilterOptions) -> Self {
        Self { source, options }
    }

    /// A declaration is excluded when it or any enclosing scope is.
    fn excludes_declaration(&self, id: DeclId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if self.source.kind(c) == DeclKind::File {
                break;
            }
            if self.options.exclude_private && self.source.access(c) == Access::Private {
                return true;
            }
            if self.options.matches(&self.source.qualified_name(c)) {
                return true;
            }
            current = self.source.parent(c);
        }
        false
    }

    fn excludes(&self, entity: &Entity) -> bool {
        let Some(fields) = entity.documentation() else {
            return false;
        };
        match fields.exclude_mode {
            ExcludeMode::Exclude => return true,
            ExcludeMode::Uncommented if self.options.exclude_uncommented => return true,
            _ => {}
        }
        match entity {
            Entity::Declaration(d) => self.excludes_declaration(d.declaration),
            Entity::Module(m) => self.options.matches(&m.name),
            _ => false,
        }
    }

    fn prune(&self, entity: &mut Entity) {
        let Some(children) = entity.children_mut() else {
            return;
        };
        children.retain(|c| !self.excludes(c));
        for child in children.iter_mut() {
            self.prune(child);
        }
    }
}

impl Pass for FilterPass {
    type Snapshot = ();

    fn name(&self) -> &'static str {
        "filter"
    }

    fn snapshot(&self, _index: &EntityIndex) -> Self::Snapshot {}

    fn apply(&self, entity: &mut Entity, _snapshot: &()) -> anyhow::Result<()> {
        if let Entity::Group(g) = entity {
            g.children.retain(|member| !self.excludes(member));
            if g.children.is_empty() {
                g.fields.exclude_mode = ExcludeMode::Exclude;
                return Ok(());
            }
        } else if self.excludes(entity) {
            if let Some(fields) = entity.documentation_mut() {
                fields.exclude_mode = ExcludeMode::Exclude;
            }
            return Ok(());
        }
        self.prune(entity);
        Ok(())
    }
}
