//! # Document Model
//!
//! The polymorphic tree every stage produces and consumes.
//!
//! ## Modules
//!
//! - **`entity`**: the `Entity` tagged union and its capability accessors
//! - **`markup`**: payloads of markup kinds, `LinkTarget`
//! - **`documentation`**: `DocFields`, `Section`, documentation kinds
//! - **`index`**: `EntityIndex`, the identity-keyed spine of the pipeline
//! - **`carrier`**: in-process pseudo-URI encoding of link targets
//!
//! ## Invariants
//!
//! - Trees only: container variants exclusively own their children
//! - At most one top-level entry per `EntityKey`
//! - At most one `Section` of a given kind per documentation entity

pub mod carrier;
pub mod documentation;
pub mod entity;
pub mod index;
pub mod markup;

pub use documentation::{
    DeclarationDocumentation, DocFields, Document, ExcludeMode, GroupDocumentation,
    ModuleDocumentation, Section, SectionKind,
};
pub use entity::Entity;
pub use index::{EntityIndex, EntityKey, IndexError};
pub use markup::{CodeBlock, Heading, Image, InventoryRef, Link, LinkTarget, List};
