//! # Comment Compiler
//!
//! Turns a comment into documentation entities:
//!
//! 1. segment the text into markup and command nodes (`parsing`)
//! 2. bind the comment to the entity it documents (`binding`)
//! 3. extract inline sub-part documentation and apply the remaining
//!    commands and content (`apply`)
//!
//! `normalize` holds the index-wide steps run once every comment is parsed.

pub mod apply;
pub mod binding;
pub mod normalize;

use std::sync::Arc;

use relative_path::RelativePathBuf;

use crate::model::{Document, Entity};
use crate::parsing::commands::CommandPatterns;
use crate::parsing::{parse_comment, parse_markdown};
use crate::source::{DeclId, EntityResolver, SourceTree};

pub use binding::Binding;
pub use normalize::{
    add_missing_sections, add_uncommented_entities, add_uncommented_modules, group_entities,
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommentError {
    #[error("'\\{command}' on line {line}: comment is already bound to {bound}")]
    AlreadyBound {
        command: &'static str,
        bound: String,
        line: usize,
    },
    #[error("'\\entity {name}' on line {line}: no such entity")]
    UnresolvedEntity { name: String, line: usize },
    #[error("'\\{command} {name}' on line {line}: {entity} has no such sub-entity")]
    UnresolvedSubEntity {
        entity: String,
        command: &'static str,
        name: String,
        line: usize,
    },
    #[error("'\\file' on line {line}: comment has no enclosing file")]
    NoEnclosingFile { line: usize },
    #[error("comment is not bound to any entity")]
    Unbound,
    #[error("{entity}: '\\{command}' sets '{new}' but it is already '{old}'")]
    DuplicateField {
        entity: String,
        command: &'static str,
        old: String,
        new: String,
    },
    #[error("{entity}: '\\{command} {name}' documents the same sub-entity twice")]
    DuplicateSubEntity {
        entity: String,
        command: &'static str,
        name: String,
    },
    #[error("{entity}: '\\{command}' conflicts with group/output section '{existing}'")]
    ConflictingGroup {
        entity: String,
        command: &'static str,
        existing: String,
    },
    #[error("module '{module}': '\\{command} {name}' needs a declaration")]
    InlineOnModule {
        module: String,
        command: &'static str,
        name: String,
    },
    #[error("{entity}: {message}")]
    Structure { entity: String, message: String },
}

/// Where a comment was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommentSite {
    /// The file the comment lives in.
    pub file: Option<DeclId>,
    /// The declaration the comment is attached to, if any.
    pub attached: Option<DeclId>,
}

impl CommentSite {
    /// A comment attached to `declaration`.
    pub fn attached(declaration: DeclId, source: &SourceTree) -> Self {
        Self {
            file: source.enclosing_file(declaration),
            attached: Some(declaration),
        }
    }

    /// A free comment in `file`.
    pub fn free(file: DeclId) -> Self {
        Self {
            file: Some(file),
            attached: None,
        }
    }
}

/// Compiles comments with one set of command patterns.
#[derive(Debug, Clone)]
pub struct CommentParser {
    patterns: Arc<CommandPatterns>,
    free_file_binding: bool,
}

impl Default for CommentParser {
    fn default() -> Self {
        Self::new(Arc::new(CommandPatterns::default()))
    }
}

impl CommentParser {
    pub fn new(patterns: Arc<CommandPatterns>) -> Self {
        Self {
            patterns,
            free_file_binding: false,
        }
    }

    /// Binds otherwise unbound free comments to their file.
    pub fn with_free_file_binding(mut self, enabled: bool) -> Self {
        self.free_file_binding = enabled;
        self
    }

    pub fn patterns(&self) -> &CommandPatterns {
        &self.patterns
    }

    /// Parses a freestanding markdown file. Commands are not interpreted.
    pub fn parse_document(&self, text: &str, name: &str, path: RelativePathBuf) -> Entity {
        Entity::Document(Document {
            name: name.to_string(),
            path,
            id: String::new(),
            children: parse_markdown(text),
        })
    }

    /// Compiles one comment into its documentation entities.
    ///
    /// Inline sub-part documentation is nested into the primary entity's
    /// sections, so the result holds the primary entity alone.
    pub fn parse(
        &self,
        text: &str,
        site: CommentSite,
        source: &SourceTree,
        resolver: &dyn EntityResolver,
    ) -> Result<Vec<Entity>, CommentError> {
        let nodes = parse_comment(text, &self.patterns);
        let (binding, nodes) =
            binding::bind(nodes, site, self.free_file_binding, source, resolver)?;
        let primary = apply::build_entity(&binding, nodes, source)?;
        Ok(vec![primary])
    }
}
