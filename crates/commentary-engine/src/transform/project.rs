//! JSON projections of entities and link targets, the input of every
//! template.

use serde::Serialize;
use serde_json::{Value, json};

use crate::comment::Binding;
use crate::model::{DocFields, Entity, EntityKey, LinkTarget, carrier};
use crate::source::{DeclId, DeclKind, SourceTree};

#[derive(Debug, Default, Serialize)]
struct Projection<'a> {
    kind: &'static str,
    name: String,
    qualified_name: String,
    kind_label: &'static str,
    declaration_kind: Option<DeclKind>,
    unique_name: Option<&'a str>,
    group: Option<&'a str>,
    module: Option<&'a str>,
    output_section: Option<&'a str>,
    synopsis: Option<&'a str>,
    /// Carrier URI pointing back at the entity.
    link: String,
}

impl<'a> Projection<'a> {
    fn with_fields(mut self, fields: &'a DocFields) -> Self {
        self.unique_name = fields.unique_name.as_deref();
        self.group = fields.group.as_deref();
        self.module = fields.module.as_deref();
        self.output_section = fields.output_section.as_deref();
        self.synopsis = fields.synopsis.as_deref();
        self
    }
}

/// Projection of a declaration's documentation.
pub fn project_declaration(
    id: DeclId,
    fields: &DocFields,
    source: &SourceTree,
) -> Result<Value, serde_json::Error> {
    let kind = source.kind(id);
    let name = fields
        .output_name
        .clone()
        .unwrap_or_else(|| source.name(id).to_string());
    let projection = Projection {
        kind: "declaration",
        name,
        qualified_name: source.qualified_name(id),
        kind_label: kind.label(),
        declaration_kind: Some(kind),
        link: carrier::encode(&LinkTarget::DeclarationRef(id))?,
        ..Projection::default()
    }
    .with_fields(fields);
    serde_json::to_value(projection)
}

fn project_module(name: &str, fields: &DocFields) -> Result<Value, serde_json::Error> {
    let projection = Projection {
        kind: "module",
        name: name.to_string(),
        qualified_name: name.to_string(),
        kind_label: "Module",
        link: carrier::encode(&LinkTarget::Module(name.to_string()))?,
        ..Projection::default()
    }
    .with_fields(fields);
    serde_json::to_value(projection)
}

/// Projection of a documentation entity or document; `Null` for markup.
pub fn project_entity(entity: &Entity, source: &SourceTree) -> Result<Value, serde_json::Error> {
    match entity {
        Entity::Declaration(d) => project_declaration(d.declaration, &d.fields, source),
        Entity::Module(m) => project_module(&m.name, &m.fields),
        Entity::Group(g) => {
            let link = match entity.key() {
                Some(EntityKey::Declaration(id)) => {
                    carrier::encode(&LinkTarget::DeclarationRef(id))?
                }
                _ => String::new(),
            };
            let projection = Projection {
                kind: "group",
                name: g.name.clone(),
                qualified_name: g.name.clone(),
                kind_label: "Group",
                link,
                ..Projection::default()
            }
            .with_fields(&g.fields);
            serde_json::to_value(projection)
        }
        Entity::Document(d) => serde_json::to_value(Projection {
            kind: "document",
            name: d.name.clone(),
            qualified_name: d.path.to_string(),
            kind_label: "Document",
            ..Projection::default()
        }),
        _ => Ok(Value::Null),
    }
}

/// Projection of a link target that has no documentation entity of its
/// own (inventory entries, URIs, unresolved names, undocumented modules).
pub fn project_target(target: &LinkTarget) -> Result<Value, serde_json::Error> {
    Ok(match target {
        LinkTarget::Unresolved(raw) => json!({ "kind": "unresolved", "name": raw }),
        LinkTarget::Uri(uri) => json!({ "kind": "uri", "name": uri, "uri": uri }),
        LinkTarget::ExternalInventoryRef(entry) => json!({
            "kind": "inventory",
            "name": entry.entry,
            "project": entry.project,
            "version": entry.version,
            "entry": entry.entry,
            "location": entry.location,
        }),
        LinkTarget::Module(name) => project_module(name, &DocFields::default())?,
        LinkTarget::DeclarationRef(id) => json!({
            "kind": "declaration",
            "link": carrier::encode(&LinkTarget::DeclarationRef(*id))?,
        }),
    })
}

/// Name of an entity for diagnostics.
pub fn entity_label(entity: &Entity, source: &SourceTree) -> String {
    match entity {
        Entity::Declaration(d) => Binding::Declaration(d.declaration).describe(source),
        Entity::Module(m) => Binding::Module(m.name.clone()).describe(source),
        Entity::Group(g) => format!("group '{}'", g.name),
        Entity::Document(d) => format!("document '{}'", d.path),
        _ => "markup".to_string(),
    }
}

/// Scope that fuzzy lookups from inside `entity` start at.
pub fn entity_scope(entity: &Entity, source: &SourceTree) -> String {
    match entity.key() {
        Some(EntityKey::Declaration(id)) => source.qualified_name(id),
        Some(EntityKey::Module(name)) => name,
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeclarationDocumentation, GroupDocumentation};
    use pretty_assertions::assert_eq;

    fn source() -> (SourceTree, DeclId) {
        let mut source = SourceTree::new();
        let file = source.add_file("swap.hpp");
        let ns = source.add(file, DeclKind::Namespace, "ns1");
        let swap = source.add(ns, DeclKind::Function, "swap");
        (source, swap)
    }

    #[test]
    fn declaration_projection_exposes_names_and_link() {
        let (source, swap) = source();
        let mut doc = DeclarationDocumentation::new(swap);
        doc.fields.group = Some("swap".into());
        let value = project_entity(&Entity::Declaration(doc), &source).unwrap();

        assert_eq!(value["kind"], "declaration");
        assert_eq!(value["name"], "swap");
        assert_eq!(value["qualified_name"], "ns1::swap");
        assert_eq!(value["kind_label"], "Function");
        assert_eq!(value["declaration_kind"], "function");
        assert_eq!(value["group"], "swap");
        assert_eq!(value["synopsis"], Value::Null);
        let link = value["link"].as_str().unwrap();
        assert_eq!(carrier::decode(link), Some(LinkTarget::DeclarationRef(swap)));
    }

    #[test]
    fn output_name_overrides_declaration_name() {
        let (source, swap) = source();
        let mut fields = DocFields::default();
        fields.output_name = Some("swap(T&, T&)".into());
        let value = project_declaration(swap, &fields, &source).unwrap();
        assert_eq!(value["name"], "swap(T&, T&)");
        assert_eq!(value["qualified_name"], "ns1::swap");
    }

    #[test]
    fn group_links_to_first_member() {
        let (source, swap) = source();
        let group = Entity::Group(GroupDocumentation {
            name: "swap".into(),
            id: String::new(),
            fields: DocFields::default(),
            children: vec![Entity::Declaration(DeclarationDocumentation::new(swap))],
        });
        let value = project_entity(&group, &source).unwrap();
        assert_eq!(value["kind"], "group");
        let link = value["link"].as_str().unwrap();
        assert_eq!(carrier::decode(link), Some(LinkTarget::DeclarationRef(swap)));
    }

    #[test]
    fn labels_and_scopes() {
        let (source, swap) = source();
        let decl = Entity::Declaration(DeclarationDocumentation::new(swap));
        assert_eq!(entity_label(&decl, &source), "function 'ns1::swap'");
        assert_eq!(entity_scope(&decl, &source), "ns1::swap");
        assert_eq!(entity_scope(&Entity::text("x"), &source), "");
    }

    #[test]
    fn inventory_targets_project_their_entry() {
        let target = LinkTarget::ExternalInventoryRef(crate::model::InventoryRef {
            project: "std".into(),
            version: "c++20".into(),
            entry: "std::vector".into(),
            location: "https://en.cppreference.com/w/cpp/container/vector".into(),
        });
        let value = project_target(&target).unwrap();
        assert_eq!(value["entry"], "std::vector");
        assert_eq!(value["project"], "std");
    }
}
