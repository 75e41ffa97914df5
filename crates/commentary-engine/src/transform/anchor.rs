//! Anchor ids from heading text.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Entity, EntityIndex};

use super::Pass;

static NON_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("Invalid slug regex"));
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s-]+").expect("Invalid separator regex"));

/// Lowercases, strips everything but word characters, whitespace and
/// hyphens, then joins the remaining words with single hyphens.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = NON_SLUG.replace_all(&lower, "");
    SEPARATORS.replace_all(stripped.trim(), "-").into_owned()
}

fn heading_text(entity: &Entity) -> Option<String> {
    match entity.children().first()? {
        Entity::Heading(h) => Some(h.children.iter().map(Entity::plain_text).collect()),
        _ => None,
    }
}

pub struct AnchorPass;

impl Pass for AnchorPass {
    type Snapshot = ();

    fn name(&self) -> &'static str {
        "anchor"
    }

    fn snapshot(&self, _index: &EntityIndex) -> Self::Snapshot {}

    fn apply(&self, entity: &mut Entity, _snapshot: &()) -> anyhow::Result<()> {
        entity.walk_mut(&mut |e| {
            if !e.anchor().is_some_and(str::is_empty) {
                return;
            }
            if let Some(text) = heading_text(e)
                && let Some(id) = e.anchor_mut()
            {
                *id = slugify(&text);
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeclarationDocumentation, Heading};
    use crate::source::DeclId;
    use rstest::rstest;

    #[rstest]
    #[case::spec_example("Namespace ns1", "namespace-ns1")]
    #[case::punctuation("Function ns1::swap<T>", "function-ns1swapt")]
    #[case::runs_collapse("a  -  b", "a-b")]
    #[case::surrounding_space("  Module io ", "module-io")]
    #[case::unicode_words("Größe", "größe")]
    #[case::empty("", "")]
    fn slugs(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(slugify(text), expected);
    }

    fn headed(text: &str) -> Entity {
        let mut doc = DeclarationDocumentation::new(DeclId(1));
        doc.children.push(Entity::Heading(Heading {
            level: 1,
            children: vec![Entity::text("Namespace "), Entity::Code(text.into())],
        }));
        Entity::Declaration(doc)
    }

    #[test]
    fn anchors_follow_the_first_heading() {
        let mut entity = headed("ns1");
        AnchorPass.apply(&mut entity, &()).unwrap();
        assert_eq!(entity.anchor(), Some("namespace-ns1"));
    }

    #[test]
    fn existing_anchors_are_kept() {
        let mut entity = headed("ns1");
        *entity.anchor_mut().unwrap() = "custom".into();
        AnchorPass.apply(&mut entity, &()).unwrap();
        assert_eq!(entity.anchor(), Some("custom"));
    }

    #[test]
    fn no_heading_no_anchor() {
        let mut entity = Entity::Declaration(DeclarationDocumentation::new(DeclId(1)));
        AnchorPass.apply(&mut entity, &()).unwrap();
        assert_eq!(entity.anchor(), Some(""));
    }
}
