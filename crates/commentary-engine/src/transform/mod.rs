//! # Transformation Pipeline
//!
//! Ordered passes over the entity index. Every pass is entity-local: it
//! mutates one top-level entity at a time and sees the rest of the index
//! only through a read-only snapshot built before any of its tasks start.
//!
//! ## Pass Order
//!
//! 1. **filter**: exclusion by pattern, access and comment presence
//! 2. **headings**: heading synthesis from per-kind templates
//! 3. **anchor**: slugs from the first heading
//! 4. **internal links**: carrier, header, exact and fuzzy name lookup
//! 5. **external links**: URIs and symbol inventories
//! 6. **link text**: display text for links without any
//!
//! A failing entity is reported to the diagnostics sink and left as the
//! pass found it (or as far as the pass got); its siblings are unaffected.

pub mod anchor;
pub mod external;
pub mod filter;
pub mod headings;
pub mod link_text;
pub mod links;
pub mod project;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use anyhow::Context;

use crate::diagnostics::Diagnostics;
use crate::format::{Formatter, JinjaFormatter};
use crate::model::{Entity, EntityIndex};
use crate::pool::{WorkerPool, for_each};
use crate::source::SourceTree;

pub use anchor::{AnchorPass, slugify};
pub use external::{ExternalLinkPass, Inventory};
pub use filter::{FilterOptions, FilterPass};
pub use headings::{HeadingPass, HeadingTemplates};
pub use link_text::{LinkTemplates, LinkTextPass};
pub use links::{InternalLinkPass, LinkTable, is_complete_uri};

/// One entity-local transformation.
pub trait Pass: Send + Sync + 'static {
    /// Read-only view of the whole index, fixed before the pass starts.
    type Snapshot: Send + Sync + 'static;

    fn name(&self) -> &'static str;

    fn snapshot(&self, index: &EntityIndex) -> Self::Snapshot;

    /// Transforms one top-level entity in place.
    fn apply(&self, entity: &mut Entity, snapshot: &Self::Snapshot) -> anyhow::Result<()>;
}

/// Runs `pass` over every top-level entity on `pool`, one task each.
///
/// Index order is preserved. Returns the number of entities that failed.
pub fn run_pass<P: Pass>(
    pass: &Arc<P>,
    index: &mut EntityIndex,
    pool: &dyn WorkerPool,
    diagnostics: &Diagnostics,
    source: &SourceTree,
) -> usize {
    let started = Instant::now();
    let snapshot = Arc::new(pass.snapshot(index));
    let slots: Vec<Arc<Mutex<Entity>>> = index
        .take_entities()
        .into_iter()
        .map(|entity| Arc::new(Mutex::new(entity)))
        .collect();
    let items = slots
        .iter()
        .map(|slot| {
            let entity = slot.lock().unwrap_or_else(PoisonError::into_inner);
            (project::entity_label(&entity, source), Arc::clone(slot))
        })
        .collect();

    let task_pass = Arc::clone(pass);
    let failed = for_each(pool, items, diagnostics, move |slot: Arc<Mutex<Entity>>| {
        let mut entity = slot.lock().unwrap_or_else(PoisonError::into_inner);
        task_pass
            .apply(&mut entity, &snapshot)
            .with_context(|| format!("{} pass", task_pass.name()))
    });

    let count = slots.len();
    let entities = slots
        .into_iter()
        .map(|slot| match Arc::try_unwrap(slot) {
            Ok(mutex) => mutex.into_inner().unwrap_or_else(PoisonError::into_inner),
            Err(shared) => shared
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        })
        .collect();
    index.restore(entities);

    log::debug!(
        "{} pass: {count} entities, {failed} failed, {:?}",
        pass.name(),
        started.elapsed()
    );
    failed
}

/// Templates of the synthesis passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Templates {
    pub heading: HeadingTemplates,
    pub link: LinkTemplates,
}

#[derive(Clone)]
pub struct PipelineOptions {
    pub filter: FilterOptions,
    pub templates: Templates,
    pub inventories: Vec<Inventory>,
    pub formatter: Arc<dyn Formatter>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            filter: FilterOptions::default(),
            templates: Templates::default(),
            inventories: vec![],
            formatter: Arc::new(JinjaFormatter),
        }
    }
}

/// The fixed sequence of passes over one source tree.
pub struct Pipeline {
    source: Arc<SourceTree>,
    diagnostics: Arc<Diagnostics>,
    filter: Arc<FilterPass>,
    headings: Arc<HeadingPass>,
    anchor: Arc<AnchorPass>,
    internal_links: Arc<InternalLinkPass>,
    external_links: Arc<ExternalLinkPass>,
    link_text: Arc<LinkTextPass>,
}

impl Pipeline {
    pub fn new(
        source: Arc<SourceTree>,
        options: PipelineOptions,
        diagnostics: Arc<Diagnostics>,
    ) -> Self {
        let PipelineOptions {
            filter,
            templates,
            inventories,
            formatter,
        } = options;
        Self {
            filter: Arc::new(FilterPass::new(Arc::clone(&source), filter)),
            headings: Arc::new(HeadingPass::new(
                Arc::clone(&source),
                templates.heading,
                Arc::clone(&formatter),
            )),
            anchor: Arc::new(AnchorPass),
            internal_links: Arc::new(InternalLinkPass::new(Arc::clone(&source))),
            external_links: Arc::new(ExternalLinkPass::new(
                Arc::clone(&source),
                inventories,
                Arc::clone(&diagnostics),
            )),
            link_text: Arc::new(LinkTextPass::new(
                Arc::clone(&source),
                templates.link,
                formatter,
            )),
            source,
            diagnostics,
        }
    }

    /// Runs every pass in order. Returns the number of failed entity
    /// transformations across all passes.
    pub fn transform(&self, index: &mut EntityIndex, pool: &dyn WorkerPool) -> usize {
        let started = Instant::now();
        let diagnostics = self.diagnostics.as_ref();
        let source = self.source.as_ref();
        let failed = run_pass(&self.filter, index, pool, diagnostics, source)
            + run_pass(&self.headings, index, pool, diagnostics, source)
            + run_pass(&self.anchor, index, pool, diagnostics, source)
            + run_pass(&self.internal_links, index, pool, diagnostics, source)
            + run_pass(&self.external_links, index, pool, diagnostics, source)
            + run_pass(&self.link_text, index, pool, diagnostics, source);
        log::debug!(
            "pipeline: {} entities on {} threads, {failed} failures, {:?}",
            index.len(),
            pool.threads(),
            started.elapsed()
        );
        failed
    }
}
