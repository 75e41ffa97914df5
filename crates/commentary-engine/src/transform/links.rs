//! Internal link resolution against the documented declarations.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use url::Url;

use crate::model::{Entity, EntityIndex, LinkTarget, carrier};
use crate::source::{DeclId, DeclKind, SourceTree};

use super::Pass;
use super::project::entity_scope;

const SCOPE_SEPARATOR: &str = "::";

/// True for raw targets that are addresses already, not names.
pub fn is_complete_uri(raw: &str) -> bool {
    raw.starts_with("mailto:") || (raw.contains("://") && Url::parse(raw).is_ok())
}

/// Lookup tables built from the index before the pass runs.
#[derive(Debug, Default)]
pub struct LinkTable {
    /// Unique names and qualified names.
    names: HashMap<String, DeclId>,
    /// Header file paths and their base names.
    headers: HashMap<String, DeclId>,
    modules: HashSet<String>,
    /// Qualified names in index order, for fuzzy lookups.
    declarations: Vec<(String, DeclId)>,
    /// Size of the source tree; carriers naming ids past it are stale.
    source_len: usize,
}

impl LinkTable {
    pub fn build(index: &EntityIndex, source: &SourceTree) -> Self {
        let mut table = Self {
            source_len: source.len(),
            ..Self::default()
        };
        let mut qualified = Vec::new();
        for entity in index {
            entity.walk(&mut |e| match e {
                Entity::Declaration(d) => {
                    let id = d.declaration;
                    if let Some(unique) = &d.fields.unique_name {
                        table.names.entry(unique.clone()).or_insert(id);
                    }
                    if source.kind(id) == DeclKind::File {
                        let path = source.name(id);
                        table.headers.entry(path.to_string()).or_insert(id);
                        if let Some((_, base)) = path.rsplit_once('/') {
                            table.headers.entry(base.to_string()).or_insert(id);
                        }
                    } else {
                        qualified.push((source.qualified_name(id), id));
                    }
                }
                Entity::Module(m) => {
                    table.modules.insert(m.name.clone());
                }
                _ => {}
            });
        }
        for (name, id) in &qualified {
            table.names.entry(name.clone()).or_insert(*id);
        }
        table.declarations = qualified;
        table
    }

    /// Resolves a raw link target seen from inside `scope`.
    ///
    /// Tries, in order: carrier URI, header file, complete URI (left for
    /// the external pass), then exact or fuzzy name lookup.
    pub fn resolve(&self, raw: &str, scope: &str) -> Option<LinkTarget> {
        if raw.starts_with(carrier::SCHEME) {
            return match carrier::decode(raw) {
                Some(LinkTarget::DeclarationRef(id)) if id.0 as usize >= self.source_len => {
                    log::warn!("link carrier names unknown declaration #{}", id.0);
                    None
                }
                None => {
                    log::warn!("malformed link carrier '{raw}'");
                    None
                }
                decoded => decoded,
            };
        }
        if let Some(&id) = self.headers.get(raw) {
            return Some(LinkTarget::DeclarationRef(id));
        }
        if is_complete_uri(raw) {
            return None;
        }
        if let Some(name) = raw.strip_prefix('*') {
            return self.fuzzy(name, scope, false);
        }
        if let Some(name) = raw.strip_prefix('?') {
            return self.fuzzy(name, scope, true);
        }
        self.exact(raw)
    }

    fn exact(&self, name: &str) -> Option<LinkTarget> {
        if let Some(&id) = self.names.get(name) {
            return Some(LinkTarget::DeclarationRef(id));
        }
        self.modules
            .contains(name)
            .then(|| LinkTarget::Module(name.to_string()))
    }

    /// Matches `name` as a `::`-aligned suffix of a qualified name,
    /// preferring the candidate sharing the longest scope with `scope`.
    fn fuzzy(&self, name: &str, scope: &str, ignore_case: bool) -> Option<LinkTarget> {
        let fold = |s: &str| {
            if ignore_case {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        };
        let name = fold(name);
        if name.is_empty() {
            return None;
        }
        let suffix = format!("{SCOPE_SEPARATOR}{name}");
        let best = self
            .declarations
            .iter()
            .filter(|(qualified, _)| {
                let qualified = fold(qualified);
                qualified == name || qualified.ends_with(&suffix)
            })
            .min_by_key(|(qualified, _)| {
                (Reverse(shared_scope(qualified, scope)), qualified.len())
            });
        if let Some((_, id)) = best {
            return Some(LinkTarget::DeclarationRef(*id));
        }
        self.modules
            .iter()
            .find(|m| fold(m) == name)
            .map(|m| LinkTarget::Module(m.clone()))
    }
}

/// Number of leading scope components `a` and `b` have in common.
fn shared_scope(a: &str, b: &str) -> usize {
    a.split(SCOPE_SEPARATOR)
        .zip(b.split(SCOPE_SEPARATOR))
        .take_while(|(x, y)| x == y)
        .count()
}

pub struct InternalLinkPass {
    source: Arc<SourceTree>,
}

impl InternalLinkPass {
    pub fn new(source: Arc<SourceTree>) -> Self {
        Self { source }
    }
}

impl Pass for InternalLinkPass {
    type Snapshot = LinkTable;

    fn name(&self) -> &'static str {
        "internal links"
    }

    fn snapshot(&self, index: &EntityIndex) -> Self::Snapshot {
        LinkTable::build(index, &self.source)
    }

    fn apply(&self, entity: &mut Entity, table: &LinkTable) -> anyhow::Result<()> {
        let scope = entity_scope(entity, &self.source);
        entity.walk_mut(&mut |e| {
            if let Entity::Link(link) = e
                && let LinkTarget::Unresolved(raw) = &link.target
                && let Some(target) = table.resolve(raw, &scope)
            {
                link.target = target;
            }
        });
        Ok(())
    }
}
