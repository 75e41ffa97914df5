//! # Formatter Contract
//!
//! Heading and link-text synthesis render templates against a JSON
//! projection of an entity. The [`Formatter`] trait is the seam;
//! [`JinjaFormatter`] renders through `minijinja`:
//!
//! - `{{ field }}`: projection field, escaped as inert markdown text
//! - `{{ field|safe }}`: projection field, inserted raw
//! - `{{ section("KIND") }}`: markdown of the entity's section of that kind
//! - `{{ drop("KIND") }}`: removes that section from the entity, renders nothing
//!
//! Missing fields render empty.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::{Arc, Mutex, PoisonError};

use minijinja::value::Value as TemplateValue;
use minijinja::{Environment, ErrorKind, Output, State, UndefinedBehavior};
use serde_json::Value;

use crate::model::{Entity, SectionKind};
use crate::parsing::{emit, escape};

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Callbacks onto the sections of the entity being rendered.
pub trait SectionAccess {
    /// Markdown of the section of `kind`, if present.
    fn fetch(&mut self, kind: SectionKind) -> Option<String>;
    /// Removes the section of `kind`; `true` if there was one.
    fn drop_section(&mut self, kind: SectionKind) -> bool;
}

/// Section access for templates rendered without an entity.
pub struct NoSections;

impl SectionAccess for NoSections {
    fn fetch(&mut self, _kind: SectionKind) -> Option<String> {
        None
    }

    fn drop_section(&mut self, _kind: SectionKind) -> bool {
        false
    }
}

/// Section access onto an entity's own children.
pub struct EntitySections<'a>(pub &'a mut Entity);

impl SectionAccess for EntitySections<'_> {
    fn fetch(&mut self, kind: SectionKind) -> Option<String> {
        self.0.section(kind).map(|s| emit(&s.children))
    }

    fn drop_section(&mut self, kind: SectionKind) -> bool {
        self.0.remove_section(kind).is_some()
    }
}

pub trait Formatter: Send + Sync {
    /// Renders `template` to markdown.
    fn format(
        &self,
        template: &str,
        projection: &Value,
        sections: &mut dyn SectionAccess,
    ) -> Result<String, FormatError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JinjaFormatter;

fn section_kind(name: &str) -> Result<SectionKind, minijinja::Error> {
    SectionKind::from_name(name.trim()).ok_or_else(|| {
        minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("unknown section kind '{}'", name.trim()),
        )
    })
}

/// Writes every interpolated value as inert markdown text unless it was
/// marked safe.
fn markdown_formatter(
    out: &mut Output<'_>,
    _state: &State<'_, '_>,
    value: &TemplateValue,
) -> Result<(), minijinja::Error> {
    if value.is_undefined() || value.is_none() {
        return Ok(());
    }
    let text = value.to_string();
    let rendered = if value.is_safe() { text } else { escape(&text) };
    out.write_str(&rendered).map_err(|_| {
        minijinja::Error::new(ErrorKind::WriteFailure, "cannot write template output")
    })
}

impl Formatter for JinjaFormatter {
    fn format(
        &self,
        template: &str,
        projection: &Value,
        sections: &mut dyn SectionAccess,
    ) -> Result<String, FormatError> {
        let fetched: HashMap<SectionKind, String> = SectionKind::ALL
            .into_iter()
            .filter_map(|kind| sections.fetch(kind).map(|markdown| (kind, markdown)))
            .collect();
        let dropped = Arc::new(Mutex::new(Vec::new()));

        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Lenient);
        env.set_formatter(markdown_formatter);
        env.add_function("section", move |kind: String| {
            let kind = section_kind(&kind)?;
            let markdown = fetched.get(&kind).cloned().unwrap_or_default();
            Ok::<_, minijinja::Error>(TemplateValue::from_safe_string(markdown))
        });
        let recorded = Arc::clone(&dropped);
        env.add_function("drop", move |kind: String| {
            let kind = section_kind(&kind)?;
            recorded
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(kind);
            Ok::<_, minijinja::Error>(TemplateValue::from_safe_string(String::new()))
        });

        let rendered = env.render_str(template, projection)?;

        let dropped = std::mem::take(&mut *dropped.lock().unwrap_or_else(PoisonError::into_inner));
        for kind in dropped {
            sections.drop_section(kind);
        }
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeclarationDocumentation, Section};
    use crate::source::DeclId;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn render(template: &str, projection: &Value) -> Result<String, FormatError> {
        JinjaFormatter.format(template, projection, &mut NoSections)
    }

    #[test]
    fn fields_are_escaped_unless_safe() {
        let p = json!({ "name": "swap<T>", "kind_label": "Function" });
        assert_eq!(
            render("# {{ kind_label }} {{ name }}", &p).unwrap(),
            "# Function swap\\<T\\>"
        );
        assert_eq!(render("`{{ name|safe }}`", &p).unwrap(), "`swap<T>`");
    }

    #[test]
    fn missing_and_nested_fields() {
        let p = json!({ "target": { "entry": "std::vector" }, "count": 2 });
        assert_eq!(render("{{ target.entry|safe }}", &p).unwrap(), "std::vector");
        assert_eq!(render("[{{ missing }}]", &p).unwrap(), "[]");
        assert_eq!(render("{{ count }}", &p).unwrap(), "2");
    }

    #[test]
    fn malformed_templates_are_errors() {
        let p = json!({});
        assert!(matches!(render("a {{ name", &p), Err(FormatError::Template(_))));
        let err = render("{{ section('nope') }}", &p).unwrap_err();
        assert!(err.to_string().contains("unknown section kind 'nope'"));
    }

    #[test]
    fn section_callbacks_reach_the_entity() {
        let mut doc = DeclarationDocumentation::new(DeclId(1));
        doc.children.push(Entity::Section(Section {
            kind: SectionKind::Brief,
            children: vec![Entity::Paragraph(vec![Entity::text("Swaps values")])],
        }));
        let mut entity = Entity::Declaration(doc);

        let out = JinjaFormatter
            .format(
                "# swap\n\n{{ section('brief') }}{{ drop('brief') }}",
                &json!({}),
                &mut EntitySections(&mut entity),
            )
            .unwrap();
        assert_eq!(out, "# swap\n\nSwaps values");
        assert!(entity.section(SectionKind::Brief).is_none());
    }

    #[test]
    fn failed_render_drops_nothing() {
        let mut doc = DeclarationDocumentation::new(DeclId(1));
        doc.children.push(Entity::Section(Section {
            kind: SectionKind::Brief,
            children: vec![Entity::Paragraph(vec![Entity::text("kept")])],
        }));
        let mut entity = Entity::Declaration(doc);

        let result = JinjaFormatter.format(
            "{{ drop('brief') }}{{ section('nope') }}",
            &json!({}),
            &mut EntitySections(&mut entity),
        );
        assert!(result.is_err());
        assert!(entity.section(SectionKind::Brief).is_some());
    }
}
