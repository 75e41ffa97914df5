//! The entity index: identity-keyed top-level entities in insertion order.

use std::collections::HashMap;

use relative_path::RelativePathBuf;

use super::entity::Entity;
use super::markup::LinkTarget;
use crate::source::DeclId;

/// Identity of a top-level entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Declaration(DeclId),
    Module(String),
    /// Freestanding documents are keyed by their path.
    Document(RelativePathBuf),
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKey::Declaration(id) => write!(f, "declaration #{}", id.0),
            EntityKey::Module(name) => write!(f, "module '{name}'"),
            EntityKey::Document(path) => write!(f, "document '{path}'"),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("{0} is already documented")]
    Duplicate(EntityKey),
    #[error("entity without identity cannot be indexed")]
    NoIdentity,
}

/// Identity-keyed collection of top-level entities.
///
/// Holds at most one entry per identity. Group members are reachable through
/// their own identities even though the group owns them.
#[derive(Debug, Default, Clone)]
pub struct EntityIndex {
    entities: Vec<Entity>,
    positions: HashMap<EntityKey, usize>,
}

impl EntityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn insert(&mut self, entity: Entity) -> Result<(), IndexError> {
        let keys = Self::keys_of(&entity);
        if keys.is_empty() {
            return Err(IndexError::NoIdentity);
        }
        if let Some(dup) = keys.iter().find(|k| self.positions.contains_key(*k)) {
            return Err(IndexError::Duplicate(dup.clone()));
        }
        let pos = self.entities.len();
        for key in keys {
            self.positions.insert(key, pos);
        }
        self.entities.push(entity);
        Ok(())
    }

    pub fn contains(&self, key: &EntityKey) -> bool {
        self.positions.contains_key(key)
    }

    /// Looks up an entity by identity. Group members are returned
    /// themselves, not their group.
    pub fn find(&self, key: &EntityKey) -> Option<&Entity> {
        match self.entities.get(*self.positions.get(key)?)? {
            Entity::Group(g) => g.children.iter().find(|m| m.key().as_ref() == Some(key)),
            top => Some(top),
        }
    }

    pub fn find_mut(&mut self, key: &EntityKey) -> Option<&mut Entity> {
        let pos = *self.positions.get(key)?;
        match self.entities.get_mut(pos)? {
            Entity::Group(g) => g
                .children
                .iter_mut()
                .find(|m| m.key().as_ref() == Some(key)),
            top => Some(top),
        }
    }

    /// Like [`EntityIndex::find`], falling back to documentation nested
    /// inside other entities (parameters, template parameters, bases).
    pub fn find_nested(&self, key: &EntityKey) -> Option<&Entity> {
        self.find(key).or_else(|| {
            self.entities
                .iter()
                .find_map(|entity| entity.find_documentation(key))
        })
    }

    pub fn find_by_declaration(&self, id: DeclId) -> Option<&Entity> {
        self.find(&EntityKey::Declaration(id))
    }

    pub fn find_by_declaration_mut(&mut self, id: DeclId) -> Option<&mut Entity> {
        self.find_mut(&EntityKey::Declaration(id))
    }

    pub fn find_by_module_name(&self, name: &str) -> Option<&Entity> {
        self.find(&EntityKey::Module(name.to_string()))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Entity> {
        self.entities.iter_mut()
    }

    /// Moves every entity out, leaving identities registered.
    ///
    /// Must be paired with [`EntityIndex::restore`] using the same order.
    pub(crate) fn take_entities(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.entities)
    }

    pub(crate) fn restore(&mut self, entities: Vec<Entity>) {
        self.entities = entities;
    }

    /// Replaces the whole content, re-deriving identities.
    pub(crate) fn rebuild(&mut self, entities: Vec<Entity>) -> Result<(), IndexError> {
        self.entities.clear();
        self.positions.clear();
        for entity in entities {
            self.insert(entity)?;
        }
        Ok(())
    }

    /// Address of a resolved link target, `None` while unresolved.
    pub fn href(&self, target: &LinkTarget) -> Option<String> {
        let internal = |key: EntityKey| {
            self.find_nested(&key)
                .and_then(Entity::anchor)
                .filter(|id| !id.is_empty())
                .map(|id| format!("#{id}"))
        };
        match target {
            LinkTarget::Unresolved(_) => None,
            LinkTarget::Module(name) => internal(EntityKey::Module(name.clone())),
            LinkTarget::DeclarationRef(id) => internal(EntityKey::Declaration(*id)),
            LinkTarget::ExternalInventoryRef(entry) => {
                Some(entry.location.clone()).filter(|l| !l.is_empty())
            }
            LinkTarget::Uri(uri) => Some(uri.clone()).filter(|u| !u.is_empty()),
        }
    }

    fn keys_of(entity: &Entity) -> Vec<EntityKey> {
        match entity {
            Entity::Group(g) => g.children.iter().filter_map(Entity::key).collect(),
            _ => entity.key().into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a EntityIndex {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
