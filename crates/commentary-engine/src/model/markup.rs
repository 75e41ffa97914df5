//! Payloads of the markup node kinds.

use serde::{Deserialize, Serialize};

use super::entity::Entity;
use crate::source::DeclId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Info string of a fenced block; empty for indented blocks.
    pub language: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub src: String,
    pub title: String,
    /// Alt text.
    pub children: Vec<Entity>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub target: LinkTarget,
    pub title: String,
    /// Display content; empty links get text from the link-text pass.
    pub children: Vec<Entity>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub ordered: bool,
    /// `ListItem` entities.
    pub children: Vec<Entity>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    /// 1..=6
    pub level: u8,
    pub children: Vec<Entity>,
}

/// Where a link points.
///
/// Links start out as `Unresolved` (from `[name]()` syntax) or `Uri` and are
/// rewritten in place by the link passes. `Uri` is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LinkTarget {
    /// Raw lookup string. A leading `*` or `?` requests a fuzzy lookup.
    Unresolved(String),
    Module(String),
    DeclarationRef(DeclId),
    ExternalInventoryRef(InventoryRef),
    Uri(String),
}

impl LinkTarget {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, LinkTarget::Unresolved(_))
    }

    /// Short name of the variant, as used for per-kind templates.
    pub fn kind_name(&self) -> &'static str {
        match self {
            LinkTarget::Unresolved(_) => "unresolved",
            LinkTarget::Module(_) => "module",
            LinkTarget::DeclarationRef(_) => "declaration",
            LinkTarget::ExternalInventoryRef(_) => "inventory",
            LinkTarget::Uri(_) => "uri",
        }
    }
}

/// An entry of an external symbol inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRef {
    pub project: String,
    pub version: String,
    pub entry: String,
    /// Absolute address of the entry.
    pub location: String,
}
