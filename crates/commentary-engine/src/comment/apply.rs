//! Building the documentation entity from the bound comment's nodes.

use std::collections::HashSet;

use crate::model::{
    DeclarationDocumentation, DocFields, Entity, ExcludeMode, ModuleDocumentation, Section,
    SectionKind,
};
use crate::parsing::blocks::CommentNode;
use crate::parsing::commands::{InlineCommand, SpecialCommand};
use crate::source::{DeclId, SourceTree};

use super::binding::Binding;
use super::normalize::ensure_required_sections;
use super::CommentError;

/// Characters ending the sentence that becomes the implicit brief.
const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

struct EntityBuilder<'s> {
    source: &'s SourceTree,
    binding: &'s Binding,
    name: String,
    entity: Entity,
    implicit_brief: bool,
    sub_parts: HashSet<DeclId>,
}

/// Applies every remaining node to a fresh entity for `binding`.
pub(crate) fn build_entity(
    binding: &Binding,
    nodes: Vec<CommentNode>,
    source: &SourceTree,
) -> Result<Entity, CommentError> {
    let entity = match binding {
        Binding::Declaration(id) => Entity::Declaration(DeclarationDocumentation::new(*id)),
        Binding::Module(name) => Entity::Module(ModuleDocumentation {
            name: name.clone(),
            id: String::new(),
            fields: DocFields::default(),
            children: vec![],
        }),
    };
    let explicit_brief = nodes.iter().any(|n| {
        matches!(
            n,
            CommentNode::Section {
                kind: SectionKind::Brief,
                ..
            }
        )
    });
    let mut builder = EntityBuilder {
        source,
        binding,
        name: binding.describe(source),
        entity,
        implicit_brief: !explicit_brief,
        sub_parts: HashSet::new(),
    };
    for node in nodes {
        builder.apply(node)?;
    }
    Ok(builder.finish())
}

impl EntityBuilder<'_> {
    fn apply(&mut self, node: CommentNode) -> Result<(), CommentError> {
        match node {
            CommentNode::Markup(blocks) => {
                for block in blocks {
                    add_unlabeled(&mut self.entity, block, &mut self.implicit_brief, &self.name)?;
                }
                Ok(())
            }
            CommentNode::Section { kind, content } => {
                section_of(&mut self.entity, kind, &self.name)?
                    .children
                    .extend(content);
                Ok(())
            }
            CommentNode::Special { command, args, .. } => self.special(command, &args),
            CommentNode::Inline {
                command,
                name,
                content,
                line,
            } => self.inline(command, name, content, line),
        }
    }

    fn special(&mut self, command: SpecialCommand, args: &[String]) -> Result<(), CommentError> {
        let entity = self.name.as_str();
        let Some(fields) = self.entity.documentation_mut() else {
            return Err(CommentError::Structure {
                entity: entity.to_string(),
                message: "entity cannot carry documentation fields".into(),
            });
        };
        let arg = args.first().map(String::as_str);
        match command {
            SpecialCommand::Exclude => {
                let mode = SpecialCommand::exclude_mode(arg);
                if fields.exclude_mode != ExcludeMode::Include {
                    return Err(CommentError::DuplicateField {
                        entity: entity.to_string(),
                        command: command.name(),
                        old: format!("{:?}", fields.exclude_mode),
                        new: format!("{mode:?}"),
                    });
                }
                fields.exclude_mode = mode;
            }
            SpecialCommand::UniqueName => set_once(&mut fields.unique_name, arg, command, entity)?,
            SpecialCommand::OutputName => set_once(&mut fields.output_name, arg, command, entity)?,
            SpecialCommand::Synopsis => set_once(&mut fields.synopsis, arg, command, entity)?,
            SpecialCommand::Module => set_once(&mut fields.module, arg, command, entity)?,
            SpecialCommand::Group | SpecialCommand::OutputSection => {
                if let Some(existing) = fields.group.as_ref().or(fields.output_section.as_ref()) {
                    return Err(CommentError::ConflictingGroup {
                        entity: entity.to_string(),
                        command: command.name(),
                        existing: existing.clone(),
                    });
                }
                let Some(name) = arg else {
                    return Err(missing_argument(entity, command));
                };
                if command == SpecialCommand::OutputSection {
                    fields.output_section = Some(name.to_string());
                } else if let Some(group) = name.strip_prefix('-') {
                    fields.group = Some(group.to_string());
                } else {
                    let heading = args.get(1).map(String::as_str).unwrap_or(name);
                    fields.group = Some(name.to_string());
                    fields.output_section = Some(heading.to_string());
                }
            }
            SpecialCommand::End | SpecialCommand::Entity | SpecialCommand::File => {
                return Err(CommentError::Structure {
                    entity: entity.to_string(),
                    message: format!("'\\{}' left over after binding", command.name()),
                });
            }
        }
        Ok(())
    }

    fn inline(
        &mut self,
        command: InlineCommand,
        name: String,
        content: Vec<Entity>,
        line: usize,
    ) -> Result<(), CommentError> {
        let owner = match self.binding {
            Binding::Declaration(id) => *id,
            Binding::Module(module) => {
                return Err(CommentError::InlineOnModule {
                    module: module.clone(),
                    command: command.name(),
                    name,
                });
            }
        };
        let Some(sub) = self
            .source
            .find_sub_part(owner, command.sub_part_kind(), &name)
        else {
            return Err(CommentError::UnresolvedSubEntity {
                entity: self.name.clone(),
                command: command.name(),
                name,
                line,
            });
        };
        if !self.sub_parts.insert(sub) {
            return Err(CommentError::DuplicateSubEntity {
                entity: self.name.clone(),
                command: command.name(),
                name,
            });
        }

        let mut nested = Entity::Declaration(DeclarationDocumentation::new(sub));
        let nested_name = format!("{} of {}", name, self.name);
        let mut implicit_brief = true;
        for block in content {
            add_unlabeled(&mut nested, block, &mut implicit_brief, &nested_name)?;
        }
        section_of(&mut self.entity, command.section(), &self.name)?
            .children
            .push(nested);
        Ok(())
    }

    fn finish(mut self) -> Entity {
        if let Some(children) = self.entity.children_mut() {
            children.sort_by_key(|c| !matches!(c, Entity::Section(s) if s.kind == SectionKind::Brief));
        }
        ensure_required_sections(&mut self.entity, self.source);
        self.entity
    }
}

fn set_once(
    slot: &mut Option<String>,
    value: Option<&str>,
    command: SpecialCommand,
    entity: &str,
) -> Result<(), CommentError> {
    let Some(value) = value else {
        return Err(missing_argument(entity, command));
    };
    if let Some(old) = slot {
        return Err(CommentError::DuplicateField {
            entity: entity.to_string(),
            command: command.name(),
            old: old.clone(),
            new: value.to_string(),
        });
    }
    *slot = Some(value.to_string());
    Ok(())
}

fn missing_argument(entity: &str, command: SpecialCommand) -> CommentError {
    CommentError::Structure {
        entity: entity.to_string(),
        message: format!("'\\{}' without its argument", command.name()),
    }
}

fn section_of<'e>(
    entity: &'e mut Entity,
    kind: SectionKind,
    name: &str,
) -> Result<&'e mut Section, CommentError> {
    entity
        .ensure_section(kind)
        .ok_or_else(|| CommentError::Structure {
            entity: name.to_string(),
            message: format!("cannot hold a '{}' section", kind.name()),
        })
}

/// Files content not under any section command.
///
/// Unless the comment has an explicit brief, the first unlabeled block, if
/// it is a paragraph, is split after its first sentence: the sentence is the
/// brief and the rest opens the details. Everything else is details.
fn add_unlabeled(
    entity: &mut Entity,
    block: Entity,
    implicit_brief: &mut bool,
    name: &str,
) -> Result<(), CommentError> {
    if std::mem::take(implicit_brief)
        && let Entity::Paragraph(children) = block
    {
        let (brief, details) = split_first_sentence(children);
        section_of(entity, SectionKind::Brief, name)?
            .children
            .push(Entity::Paragraph(brief));
        if !details.is_empty() {
            section_of(entity, SectionKind::Details, name)?
                .children
                .push(Entity::Paragraph(details));
        }
        return Ok(());
    }
    section_of(entity, SectionKind::Details, name)?
        .children
        .push(block);
    Ok(())
}

/// Byte offset just past the first sentence terminator followed by
/// whitespace or the end of `text`.
fn sentence_end(text: &str) -> Option<usize> {
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if SENTENCE_TERMINATORS.contains(&c) && chars.peek().is_none_or(|(_, n)| n.is_whitespace()) {
            return Some(i + c.len_utf8());
        }
    }
    None
}

/// Splits inline content after the first sentence found in a top-level text
/// node. Without a terminator the whole content is the first sentence.
fn split_first_sentence(children: Vec<Entity>) -> (Vec<Entity>, Vec<Entity>) {
    let mut first = Vec::new();
    let mut iter = children.into_iter();
    while let Some(child) = iter.next() {
        let Entity::Text(text) = &child else {
            first.push(child);
            continue;
        };
        let Some(end) = sentence_end(text) else {
            first.push(child);
            continue;
        };
        first.push(Entity::text(&text[..end]));
        let mut rest = Vec::new();
        let remainder = text[end..].trim_start();
        if !remainder.is_empty() {
            rest.push(Entity::text(remainder));
        }
        let mut tail = iter.peekable();
        if rest.is_empty() {
            while tail
                .next_if(|e| matches!(e, Entity::SoftBreak | Entity::HardBreak))
                .is_some()
            {}
        }
        rest.extend(tail);
        return (first, rest);
    }
    (first, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("Swaps two values.", Some(17))]
    #[case("Swaps. More", Some(6))]
    #[case("Version 1.2 is out", None)]
    #[case("Really? Yes", Some(7))]
    #[case("no terminator", None)]
    fn sentence_ends(#[case] text: &str, #[case] expected: Option<usize>) {
        assert_eq!(sentence_end(text), expected);
    }

    #[test]
    fn split_keeps_markup_before_terminator() {
        let (brief, details) = split_first_sentence(vec![
            Entity::text("Swaps "),
            Entity::Code("a".into()),
            Entity::text(" and b. Uses moves."),
        ]);
        assert_eq!(
            brief,
            vec![
                Entity::text("Swaps "),
                Entity::Code("a".into()),
                Entity::text(" and b."),
            ]
        );
        assert_eq!(details, vec![Entity::text("Uses moves.")]);
    }

    #[test]
    fn split_drops_break_between_sentences() {
        let (brief, details) = split_first_sentence(vec![
            Entity::text("Swaps."),
            Entity::SoftBreak,
            Entity::text("Uses moves."),
        ]);
        assert_eq!(brief, vec![Entity::text("Swaps.")]);
        assert_eq!(details, vec![Entity::text("Uses moves.")]);
    }

    #[test]
    fn paragraph_without_terminator_is_all_brief() {
        let (brief, details) = split_first_sentence(vec![Entity::text("Swaps values")]);
        assert_eq!(brief, vec![Entity::text("Swaps values")]);
        assert!(details.is_empty());
    }
}
