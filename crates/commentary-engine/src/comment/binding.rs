//! Deciding which entity a comment documents.
//!
//! Runs in two phases: a read-only scan collecting the binding commands,
//! then a rebuild of the node list without the consumed ones.

use crate::parsing::blocks::CommentNode;
use crate::parsing::commands::SpecialCommand;
use crate::source::{DeclId, EntityResolver, SourceTree};

use super::{CommentError, CommentSite};

/// What a comment ends up documenting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Declaration(DeclId),
    Module(String),
}

impl Binding {
    /// Human-readable name for messages.
    pub fn describe(&self, source: &SourceTree) -> String {
        match self {
            Binding::Declaration(id) => format!(
                "{} '{}'",
                source.kind(*id).label().to_lowercase(),
                source.qualified_name(*id)
            ),
            Binding::Module(name) => format!("module '{name}'"),
        }
    }
}

/// Binds the comment and returns the nodes left to apply.
pub(crate) fn bind(
    nodes: Vec<CommentNode>,
    site: CommentSite,
    free_file_binding: bool,
    source: &SourceTree,
    resolver: &dyn EntityResolver,
) -> Result<(Binding, Vec<CommentNode>), CommentError> {
    let mut bound = site.attached.map(Binding::Declaration);
    let mut consumed = vec![false; nodes.len()];

    for (i, node) in nodes.iter().enumerate() {
        let CommentNode::Special {
            command,
            args,
            line,
        } = node
        else {
            continue;
        };
        let target = match command {
            SpecialCommand::File => {
                let file = site
                    .file
                    .ok_or(CommentError::NoEnclosingFile { line: *line })?;
                Binding::Declaration(file)
            }
            SpecialCommand::Entity => {
                let name = args.first().map(String::as_str).unwrap_or_default();
                let id = resolver
                    .resolve(name)
                    .ok_or_else(|| CommentError::UnresolvedEntity {
                        name: name.to_string(),
                        line: *line,
                    })?;
                Binding::Declaration(id)
            }
            _ => continue,
        };
        if let Some(existing) = &bound {
            return Err(CommentError::AlreadyBound {
                command: command.name(),
                bound: existing.describe(source),
                line: *line,
            });
        }
        bound = Some(target);
        consumed[i] = true;
    }

    if bound.is_none()
        && let Some((i, name)) = nodes.iter().enumerate().find_map(|(i, node)| match node {
            CommentNode::Special {
                command: SpecialCommand::Module,
                args,
                ..
            } => args.first().map(|name| (i, name.clone())),
            _ => None,
        })
    {
        bound = Some(Binding::Module(name));
        consumed[i] = true;
    }

    let binding = match bound {
        Some(binding) => binding,
        None => match site.file {
            Some(file) if free_file_binding => Binding::Declaration(file),
            _ => return Err(CommentError::Unbound),
        },
    };

    let remaining = nodes
        .into_iter()
        .zip(consumed)
        .filter_map(|(node, consumed)| (!consumed).then_some(node))
        .collect();
    Ok((binding, remaining))
}
