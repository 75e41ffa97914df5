//! Index-wide normalization run after every comment has been parsed.
//!
//! Each step is idempotent: running it again on its own output changes
//! nothing.

use std::collections::{HashMap, HashSet};

use crate::model::{
    DeclarationDocumentation, DocFields, Entity, EntityIndex, EntityKey, ExcludeMode,
    GroupDocumentation, IndexError, ModuleDocumentation, SectionKind,
};
use crate::source::{DeclId, DeclKind, SourceTree};

/// Sections every documentation of `id` must carry.
pub fn required_sections(source: &SourceTree, id: DeclId) -> Vec<SectionKind> {
    let mut kinds = Vec::new();
    if source.is_templated(id) {
        kinds.push(SectionKind::Requires);
    }
    if source.is_function_like(id) {
        kinds.push(SectionKind::Parameters);
    }
    kinds
}

/// Adds the required sections to every declaration documentation in
/// `entity`, nested ones included.
pub fn ensure_required_sections(entity: &mut Entity, source: &SourceTree) {
    entity.walk_mut(&mut |e| {
        if let Entity::Declaration(d) = e {
            let id = d.declaration;
            for kind in required_sections(source, id) {
                e.ensure_section(kind);
            }
        }
    });
}

/// Inserts an uncommented placeholder for every declaration without an
/// entry, and placeholders for undocumented parameters and template
/// parameters inside existing entries.
///
/// Returns the number of placeholders added.
pub fn add_uncommented_entities(
    index: &mut EntityIndex,
    source: &SourceTree,
) -> Result<usize, IndexError> {
    let mut added = 0;
    for id in source.ids() {
        if source.kind(id).is_sub_part() {
            continue;
        }
        let key = EntityKey::Declaration(id);
        if !index.contains(&key) {
            index.insert(Entity::Declaration(DeclarationDocumentation::uncommented(id)))?;
            added += 1;
        }
        if let Some(entity) = index.find_mut(&key) {
            added += add_uncommented_sub_parts(entity, source, id);
        }
    }
    if added > 0 {
        log::debug!("added {added} uncommented placeholders");
    }
    Ok(added)
}

fn add_uncommented_sub_parts(entity: &mut Entity, source: &SourceTree, id: DeclId) -> usize {
    let mut added = 0;
    for (kind, subs) in [
        (SectionKind::Parameters, source.parameters(id)),
        (SectionKind::Requires, source.template_parameters(id)),
    ] {
        let documented: HashSet<DeclId> = entity
            .section(kind)
            .map(|s| {
                s.children
                    .iter()
                    .filter_map(|c| match c {
                        Entity::Declaration(d) => Some(d.declaration),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        let missing: Vec<DeclId> = subs
            .into_iter()
            .filter(|s| !documented.contains(s))
            .collect();
        if missing.is_empty() {
            continue;
        }
        if let Some(section) = entity.ensure_section(kind) {
            added += missing.len();
            section.children.extend(
                missing
                    .into_iter()
                    .map(|s| Entity::Declaration(DeclarationDocumentation::uncommented(s))),
            );
        }
    }
    added
}

/// Inserts a placeholder for every module referenced through `\module` but
/// never documented itself.
pub fn add_uncommented_modules(index: &mut EntityIndex) -> Result<usize, IndexError> {
    let mut referenced: Vec<String> = Vec::new();
    for entity in index.iter() {
        entity.walk(&mut |e| {
            if let Some(module) = e.documentation().and_then(|f| f.module.as_ref())
                && !referenced.contains(module)
            {
                referenced.push(module.clone());
            }
        });
    }

    let mut added = 0;
    for name in referenced {
        if index.find_by_module_name(&name).is_some() {
            continue;
        }
        index.insert(Entity::Module(ModuleDocumentation {
            name,
            id: String::new(),
            fields: DocFields {
                exclude_mode: ExcludeMode::Uncommented,
                ..DocFields::default()
            },
            children: vec![],
        }))?;
        added += 1;
    }
    Ok(added)
}

/// Guarantees the required sections on every indexed entity.
pub fn add_missing_sections(index: &mut EntityIndex, source: &SourceTree) {
    for entity in index.iter_mut() {
        ensure_required_sections(entity, source);
    }
}

/// Gathers top-level declarations sharing a group name and parent scope
/// into one group entity at the slot of the first member.
///
/// Returns the number of grouped members.
pub fn group_entities(index: &mut EntityIndex, source: &SourceTree) -> Result<usize, IndexError> {
    let entities = index.take_entities();
    let mut out: Vec<Entity> = Vec::with_capacity(entities.len());
    let mut slots: HashMap<(String, Option<DeclId>), usize> = HashMap::new();
    let mut grouped = 0;

    for entity in entities {
        let key = match &entity {
            Entity::Declaration(d) => d
                .fields
                .group
                .clone()
                .map(|group| (group, source.parent(d.declaration))),
            _ => None,
        };
        let Some(key) = key else {
            out.push(entity);
            continue;
        };
        let heading = entity
            .documentation()
            .and_then(|f| f.output_section.clone());

        match slots.get(&key) {
            Some(&pos) => {
                if let Some(Entity::Group(group)) = out.get_mut(pos) {
                    if group.fields.output_section.is_none() {
                        group.fields.output_section = heading;
                    }
                    group.children.push(entity);
                }
            }
            None => {
                slots.insert(key.clone(), out.len());
                out.push(Entity::Group(GroupDocumentation {
                    name: key.0.clone(),
                    id: String::new(),
                    fields: DocFields {
                        group: Some(key.0),
                        output_section: heading,
                        ..DocFields::default()
                    },
                    children: vec![entity],
                }));
            }
        }
        grouped += 1;
    }

    index.rebuild(out)?;
    Ok(grouped)
}
