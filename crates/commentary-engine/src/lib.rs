//! # Commentary Engine
//!
//! Compiles documentation comments of a declaration tree into a document
//! model and runs the transformation pipeline over it.
//!
//! ## Flow
//!
//! ```text
//! comment text ─► parsing ─► comment ─► EntityIndex ─► transform ─► renderers
//!                (markup +   (binding,   (normalized)   (passes on
//!                 commands)   sections)                  the pool)
//! ```
//!
//! ## Modules
//!
//! - **`source`**: read-only view of the upstream declaration tree
//! - **`parsing`**: markdown parsing and emission, command recognition
//! - **`comment`**: the comment compiler and index normalization
//! - **`model`**: entities, link targets, the entity index
//! - **`transform`**: the ordered pass pipeline
//! - **`pool`**: worker pools and batch helpers
//! - **`collect`**: batch drivers building the index
//! - **`format`**: the template formatter contract
//! - **`diagnostics`**: the shared error/warning sink

pub mod collect;
pub mod comment;
pub mod diagnostics;
pub mod format;
pub mod model;
pub mod parsing;
pub mod pool;
pub mod source;
pub mod transform;

pub use collect::{DocumentSource, normalize, parse_documents, parse_source};
pub use comment::{Binding, CommentError, CommentParser, CommentSite};
pub use diagnostics::Diagnostics;
pub use format::{Formatter, JinjaFormatter};
pub use model::{Entity, EntityIndex, EntityKey, LinkTarget, SectionKind};
pub use parsing::commands::{CommandPatterns, PatternError};
pub use pool::{SyncPool, ThreadPool, WorkerPool};
pub use source::{Access, DeclId, DeclKind, EntityResolver, SourceTree};
pub use transform::{
    FilterOptions, HeadingTemplates, Inventory, LinkTemplates, Pipeline, PipelineOptions,
    Templates,
};
