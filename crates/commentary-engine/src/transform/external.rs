//! External link resolution: complete URIs and symbol inventories.

use std::collections::BTreeMap;
use std::sync::Arc;

use url::Url;

use crate::diagnostics::Diagnostics;
use crate::model::{Entity, EntityIndex, InventoryRef, LinkTarget};
use crate::parsing::markup::FUZZY_PREFIXES;
use crate::source::SourceTree;

use super::Pass;
use super::links::is_complete_uri;
use super::project::entity_label;

/// Symbols documented by another project, addressed relative to
/// `base_url`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    pub project: String,
    pub version: String,
    pub base_url: String,
    /// Entry name to location relative to `base_url`.
    pub entries: BTreeMap<String, String>,
}

impl Inventory {
    pub fn lookup(&self, entry: &str) -> Option<InventoryRef> {
        let location = self.entries.get(entry)?;
        Some(InventoryRef {
            project: self.project.clone(),
            version: self.version.clone(),
            entry: entry.to_string(),
            location: self.absolute(location),
        })
    }

    fn absolute(&self, location: &str) -> String {
        match Url::parse(&self.base_url).and_then(|base| base.join(location)) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{location}", self.base_url),
        }
    }
}

pub struct ExternalLinkPass {
    source: Arc<SourceTree>,
    inventories: Vec<Inventory>,
    diagnostics: Arc<Diagnostics>,
}

impl ExternalLinkPass {
    pub fn new(
        source: Arc<SourceTree>,
        inventories: Vec<Inventory>,
        diagnostics: Arc<Diagnostics>,
    ) -> Self {
        Self {
            source,
            inventories,
            diagnostics,
        }
    }

    fn resolve(&self, raw: &str) -> Option<LinkTarget> {
        if is_complete_uri(raw) {
            return Some(LinkTarget::Uri(raw.to_string()));
        }
        let name = raw.strip_prefix(FUZZY_PREFIXES).unwrap_or(raw);
        self.inventories
            .iter()
            .find_map(|inventory| inventory.lookup(name))
            .map(LinkTarget::ExternalInventoryRef)
    }
}

impl Pass for ExternalLinkPass {
    type Snapshot = ();

    fn name(&self) -> &'static str {
        "external links"
    }

    fn snapshot(&self, _index: &EntityIndex) -> Self::Snapshot {}

    fn apply(&self, entity: &mut Entity, _snapshot: &()) -> anyhow::Result<()> {
        let mut unresolved = Vec::new();
        entity.walk_mut(&mut |e| {
            if let Entity::Link(link) = e
                && let LinkTarget::Unresolved(raw) = &link.target
            {
                match self.resolve(raw) {
                    Some(target) => link.target = target,
                    None => unresolved.push(raw.clone()),
                }
            }
        });
        if !unresolved.is_empty() {
            let label = entity_label(entity, &self.source);
            for raw in unresolved {
                self.diagnostics
                    .warning(format!("{label}: unresolved link target '{raw}'"));
            }
        }
        Ok(())
    }
}
