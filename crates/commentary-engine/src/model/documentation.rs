//! Documentation node kinds and the fields they share.

use relative_path::RelativePathBuf;
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use crate::source::DeclId;

/// How an entity takes part in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcludeMode {
    #[default]
    Include,
    /// Synthesized placeholder for something without a comment.
    Uncommented,
    Exclude,
    /// Hide the return type in the synopsis.
    ExcludeReturnType,
    /// Hide the target (e.g. of an alias) in the synopsis.
    ExcludeTarget,
}

/// Metadata shared by every documentation entity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocFields {
    pub synopsis: Option<String>,
    pub unique_name: Option<String>,
    pub output_name: Option<String>,
    pub exclude_mode: ExcludeMode,
    pub group: Option<String>,
    pub output_section: Option<String>,
    pub module: Option<String>,
}

/// The closed set of section kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Brief,
    Details,
    Requires,
    Effects,
    Synchronization,
    Postconditions,
    Returns,
    Throws,
    Complexity,
    Remarks,
    ErrorConditions,
    Notes,
    Preconditions,
    Constraints,
    Diagnostics,
    See,
    Parameters,
    Bases,
}

impl SectionKind {
    pub const ALL: [SectionKind; 18] = [
        SectionKind::Brief,
        SectionKind::Details,
        SectionKind::Requires,
        SectionKind::Effects,
        SectionKind::Synchronization,
        SectionKind::Postconditions,
        SectionKind::Returns,
        SectionKind::Throws,
        SectionKind::Complexity,
        SectionKind::Remarks,
        SectionKind::ErrorConditions,
        SectionKind::Notes,
        SectionKind::Preconditions,
        SectionKind::Constraints,
        SectionKind::Diagnostics,
        SectionKind::See,
        SectionKind::Parameters,
        SectionKind::Bases,
    ];

    /// Command name opening this section (`\effects` -> `effects`).
    pub fn name(self) -> &'static str {
        match self {
            SectionKind::Brief => "brief",
            SectionKind::Details => "details",
            SectionKind::Requires => "requires",
            SectionKind::Effects => "effects",
            SectionKind::Synchronization => "synchronization",
            SectionKind::Postconditions => "postconditions",
            SectionKind::Returns => "returns",
            SectionKind::Throws => "throws",
            SectionKind::Complexity => "complexity",
            SectionKind::Remarks => "remarks",
            SectionKind::ErrorConditions => "error_conditions",
            SectionKind::Notes => "notes",
            SectionKind::Preconditions => "preconditions",
            SectionKind::Constraints => "constraints",
            SectionKind::Diagnostics => "diagnostics",
            SectionKind::See => "see",
            SectionKind::Parameters => "parameters",
            SectionKind::Bases => "bases",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    pub children: Vec<Entity>,
}

impl Section {
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            children: vec![],
        }
    }
}

/// A freestanding markdown file.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub name: String,
    pub path: RelativePathBuf,
    pub id: String,
    pub children: Vec<Entity>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDocumentation {
    pub name: String,
    pub id: String,
    pub fields: DocFields,
    pub children: Vec<Entity>,
}

/// Members of one `\group`, gathered under a single heading.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDocumentation {
    pub name: String,
    pub id: String,
    pub fields: DocFields,
    /// Member `Declaration` entities, in index order.
    pub children: Vec<Entity>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationDocumentation {
    pub declaration: DeclId,
    pub id: String,
    pub fields: DocFields,
    pub children: Vec<Entity>,
}

impl DeclarationDocumentation {
    pub fn new(declaration: DeclId) -> Self {
        Self {
            declaration,
            id: String::new(),
            fields: DocFields::default(),
            children: vec![],
        }
    }

    /// A placeholder for a declaration without a comment.
    pub fn uncommented(declaration: DeclId) -> Self {
        let mut doc = Self::new(declaration);
        doc.fields.exclude_mode = ExcludeMode::Uncommented;
        doc
    }
}
