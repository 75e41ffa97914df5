//! # Source Declarations
//!
//! Read-only view of the declaration tree produced by the upstream language
//! parser. Declarations live in an arena owned by [`SourceTree`]; everything
//! downstream refers to them through copyable [`DeclId`] handles, so the tree
//! must outlive every documentation entity derived from it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Handle to a declaration inside a [`SourceTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    File,
    Namespace,
    Class,
    Struct,
    Union,
    Enum,
    Enumerator,
    Function,
    MemberFunction,
    Constructor,
    Destructor,
    Conversion,
    Variable,
    Member,
    TypeAlias,
    Concept,
    Macro,
    FunctionParameter,
    TemplateParameter,
    Base,
}

impl DeclKind {
    /// Human-readable label used by heading templates.
    pub fn label(self) -> &'static str {
        match self {
            DeclKind::File => "Header file",
            DeclKind::Namespace => "Namespace",
            DeclKind::Class => "Class",
            DeclKind::Struct => "Struct",
            DeclKind::Union => "Union",
            DeclKind::Enum => "Enumeration",
            DeclKind::Enumerator => "Enumeration constant",
            DeclKind::Function => "Function",
            DeclKind::MemberFunction => "Member function",
            DeclKind::Constructor => "Constructor",
            DeclKind::Destructor => "Destructor",
            DeclKind::Conversion => "Conversion operator",
            DeclKind::Variable => "Variable",
            DeclKind::Member => "Member variable",
            DeclKind::TypeAlias => "Type alias",
            DeclKind::Concept => "Concept",
            DeclKind::Macro => "Macro",
            DeclKind::FunctionParameter => "Parameter",
            DeclKind::TemplateParameter => "Template parameter",
            DeclKind::Base => "Base class",
        }
    }

    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            DeclKind::Function
                | DeclKind::MemberFunction
                | DeclKind::Constructor
                | DeclKind::Destructor
                | DeclKind::Conversion
                | DeclKind::Macro
        )
    }

    /// Sub-parts are documented through inline commands, never on their own.
    pub fn is_sub_part(self) -> bool {
        matches!(
            self,
            DeclKind::FunctionParameter | DeclKind::TemplateParameter | DeclKind::Base
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    #[default]
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone)]
struct DeclData {
    kind: DeclKind,
    name: String,
    parent: Option<DeclId>,
    children: Vec<DeclId>,
    access: Access,
    comment: Option<String>,
}

/// Arena of declarations plus the free (unattached) comments of each file.
#[derive(Debug, Clone, Default)]
pub struct SourceTree {
    decls: Vec<DeclData>,
    free_comments: Vec<(DeclId, String)>,
    by_qualified_name: HashMap<String, DeclId>,
}

impl SourceTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file (header) declaration. Its name is the file path.
    pub fn add_file(&mut self, path: impl Into<String>) -> DeclId {
        self.push(DeclKind::File, path.into(), None)
    }

    /// Adds a declaration nested in `parent`.
    pub fn add(&mut self, parent: DeclId, kind: DeclKind, name: impl Into<String>) -> DeclId {
        self.push(kind, name.into(), Some(parent))
    }

    pub fn set_comment(&mut self, id: DeclId, text: impl Into<String>) {
        self.decls[id.0 as usize].comment = Some(text.into());
    }

    pub fn set_access(&mut self, id: DeclId, access: Access) {
        self.decls[id.0 as usize].access = access;
    }

    /// Adds a comment that is not attached to any declaration of `file`.
    pub fn add_free_comment(&mut self, file: DeclId, text: impl Into<String>) {
        self.free_comments.push((file, text.into()));
    }

    fn push(&mut self, kind: DeclKind, name: String, parent: Option<DeclId>) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(DeclData {
            kind,
            name,
            parent,
            children: vec![],
            access: Access::default(),
            comment: None,
        });
        if let Some(parent) = parent {
            self.decls[parent.0 as usize].children.push(id);
        }
        if !kind.is_sub_part() && kind != DeclKind::File {
            let qualified = self.qualified_name(id);
            self.by_qualified_name.entry(qualified).or_insert(id);
        }
        id
    }

    fn data(&self, id: DeclId) -> &DeclData {
        &self.decls[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn contains(&self, id: DeclId) -> bool {
        (id.0 as usize) < self.decls.len()
    }

    /// All declarations in creation order.
    pub fn ids(&self) -> impl Iterator<Item = DeclId> + '_ {
        (0..self.decls.len() as u32).map(DeclId)
    }

    pub fn kind(&self, id: DeclId) -> DeclKind {
        self.data(id).kind
    }

    pub fn name(&self, id: DeclId) -> &str {
        &self.data(id).name
    }

    pub fn parent(&self, id: DeclId) -> Option<DeclId> {
        self.data(id).parent
    }

    pub fn children(&self, id: DeclId) -> &[DeclId] {
        &self.data(id).children
    }

    pub fn access(&self, id: DeclId) -> Access {
        self.data(id).access
    }

    pub fn comment(&self, id: DeclId) -> Option<&str> {
        self.data(id).comment.as_deref()
    }

    pub fn free_comments(&self) -> &[(DeclId, String)] {
        &self.free_comments
    }

    fn children_of_kind(&self, id: DeclId, kind: DeclKind) -> impl Iterator<Item = DeclId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |c| self.kind(*c) == kind)
    }

    pub fn parameters(&self, id: DeclId) -> Vec<DeclId> {
        self.children_of_kind(id, DeclKind::FunctionParameter).collect()
    }

    pub fn template_parameters(&self, id: DeclId) -> Vec<DeclId> {
        self.children_of_kind(id, DeclKind::TemplateParameter)
            .collect()
    }

    pub fn bases(&self, id: DeclId) -> Vec<DeclId> {
        self.children_of_kind(id, DeclKind::Base).collect()
    }

    pub fn is_function_like(&self, id: DeclId) -> bool {
        self.kind(id).is_function_like()
    }

    pub fn is_templated(&self, id: DeclId) -> bool {
        self.children_of_kind(id, DeclKind::TemplateParameter)
            .next()
            .is_some()
    }

    /// Walks up to the file the declaration lives in.
    pub fn enclosing_file(&self, id: DeclId) -> Option<DeclId> {
        let mut current = Some(id);
        while let Some(c) = current {
            if self.kind(c) == DeclKind::File {
                return Some(c);
            }
            current = self.parent(c);
        }
        None
    }

    /// `::`-joined scope path, excluding the enclosing file.
    pub fn qualified_name(&self, id: DeclId) -> String {
        if self.kind(id) == DeclKind::File {
            return self.name(id).to_string();
        }
        let mut parts = vec![self.name(id)];
        let mut current = self.parent(id);
        while let Some(p) = current {
            if self.kind(p) == DeclKind::File {
                break;
            }
            parts.push(self.name(p));
            current = self.parent(p);
        }
        parts.reverse();
        parts.join("::")
    }

    /// Exact lookup by qualified name, falling back to file paths.
    pub fn lookup(&self, qualified_name: &str) -> Option<DeclId> {
        self.by_qualified_name.get(qualified_name).copied().or_else(|| {
            self.ids()
                .find(|id| self.kind(*id) == DeclKind::File && self.name(*id) == qualified_name)
        })
    }

    /// Finds the direct child sub-part of `owner` named `name`.
    pub fn find_sub_part(&self, owner: DeclId, kind: DeclKind, name: &str) -> Option<DeclId> {
        self.children_of_kind(owner, kind)
            .find(|c| self.name(*c) == name)
    }
}

/// Resolves the argument of an `\entity` command to a declaration.
pub trait EntityResolver {
    fn resolve(&self, name: &str) -> Option<DeclId>;
}

impl EntityResolver for SourceTree {
    fn resolve(&self, name: &str) -> Option<DeclId> {
        self.lookup(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (SourceTree, DeclId, DeclId) {
        let mut tree = SourceTree::new();
        let file = tree.add_file("include/ns1/swap.hpp");
        let ns = tree.add(file, DeclKind::Namespace, "ns1");
        let swap = tree.add(ns, DeclKind::Function, "swap");
        tree.add(swap, DeclKind::TemplateParameter, "T");
        tree.add(swap, DeclKind::FunctionParameter, "a");
        tree.add(swap, DeclKind::FunctionParameter, "b");
        (tree, file, swap)
    }

    #[test]
    fn qualified_name_skips_file() {
        let (tree, _, swap) = sample();
        assert_eq!(tree.qualified_name(swap), "ns1::swap");
    }

    #[test]
    fn sub_parts_are_split_by_kind() {
        let (tree, _, swap) = sample();
        assert_eq!(tree.parameters(swap).len(), 2);
        assert_eq!(tree.template_parameters(swap).len(), 1);
        assert!(tree.bases(swap).is_empty());
        assert!(tree.is_templated(swap));
        assert!(tree.is_function_like(swap));
    }

    #[test]
    fn lookup_by_qualified_name_and_path() {
        let (tree, file, swap) = sample();
        assert_eq!(tree.lookup("ns1::swap"), Some(swap));
        assert_eq!(tree.lookup("include/ns1/swap.hpp"), Some(file));
        assert_eq!(tree.lookup("swap"), None);
    }

    #[test]
    fn parameters_are_not_indexed_by_name() {
        let (tree, _, _) = sample();
        assert_eq!(tree.resolve("ns1::swap::a"), None);
    }

    #[test]
    fn enclosing_file_walks_parents() {
        let (tree, file, swap) = sample();
        assert_eq!(tree.enclosing_file(swap), Some(file));
        assert_eq!(tree.enclosing_file(file), Some(file));
    }

    #[test]
    fn find_sub_part_is_exact() {
        let (tree, _, swap) = sample();
        assert!(tree.find_sub_part(swap, DeclKind::FunctionParameter, "a").is_some());
        assert!(tree.find_sub_part(swap, DeclKind::FunctionParameter, "T").is_none());
        assert!(tree.find_sub_part(swap, DeclKind::TemplateParameter, "T").is_some());
    }
}
