//! The three command families and their argument grammar.

use crate::model::{ExcludeMode, SectionKind};
use crate::source::DeclKind;

/// Commands that bind the comment or set entity metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialCommand {
    End,
    Exclude,
    UniqueName,
    OutputName,
    Synopsis,
    Group,
    Module,
    OutputSection,
    Entity,
    File,
}

impl SpecialCommand {
    pub const ALL: [SpecialCommand; 10] = [
        SpecialCommand::End,
        SpecialCommand::Exclude,
        SpecialCommand::UniqueName,
        SpecialCommand::OutputName,
        SpecialCommand::Synopsis,
        SpecialCommand::Group,
        SpecialCommand::Module,
        SpecialCommand::OutputSection,
        SpecialCommand::Entity,
        SpecialCommand::File,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SpecialCommand::End => "end",
            SpecialCommand::Exclude => "exclude",
            SpecialCommand::UniqueName => "unique_name",
            SpecialCommand::OutputName => "output_name",
            SpecialCommand::Synopsis => "synopsis",
            SpecialCommand::Group => "group",
            SpecialCommand::Module => "module",
            SpecialCommand::OutputSection => "output_section",
            SpecialCommand::Entity => "entity",
            SpecialCommand::File => "file",
        }
    }

    /// Splits the rest of the command line into arguments.
    ///
    /// `None` means the invocation does not fit the command's grammar and
    /// the line stays literal text.
    pub fn parse_args(self, rest: &str) -> Option<Vec<String>> {
        let rest = rest.trim();
        match self {
            SpecialCommand::End | SpecialCommand::File => rest.is_empty().then(Vec::new),
            SpecialCommand::Exclude => match rest {
                "" => Some(vec![]),
                "return" | "target" => Some(vec![rest.to_string()]),
                _ => None,
            },
            SpecialCommand::Group => {
                let (name, heading) = match rest.split_once(char::is_whitespace) {
                    Some((name, heading)) => (name, heading.trim()),
                    None => (rest, ""),
                };
                if name.is_empty() || name == "-" {
                    return None;
                }
                let mut args = vec![name.to_string()];
                if !heading.is_empty() {
                    args.push(heading.to_string());
                }
                Some(args)
            }
            SpecialCommand::UniqueName
            | SpecialCommand::OutputName
            | SpecialCommand::Synopsis
            | SpecialCommand::Module
            | SpecialCommand::OutputSection
            | SpecialCommand::Entity => (!rest.is_empty()).then(|| vec![rest.to_string()]),
        }
    }

    /// Mode set by `\exclude [return|target]`.
    pub fn exclude_mode(arg: Option<&str>) -> ExcludeMode {
        match arg {
            Some("return") => ExcludeMode::ExcludeReturnType,
            Some("target") => ExcludeMode::ExcludeTarget,
            _ => ExcludeMode::Exclude,
        }
    }
}

/// Commands documenting a named sub-part of the bound declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineCommand {
    Param,
    TParam,
    Base,
}

impl InlineCommand {
    pub const ALL: [InlineCommand; 3] = [InlineCommand::Param, InlineCommand::TParam, InlineCommand::Base];

    pub fn name(self) -> &'static str {
        match self {
            InlineCommand::Param => "param",
            InlineCommand::TParam => "tparam",
            InlineCommand::Base => "base",
        }
    }

    pub fn sub_part_kind(self) -> DeclKind {
        match self {
            InlineCommand::Param => DeclKind::FunctionParameter,
            InlineCommand::TParam => DeclKind::TemplateParameter,
            InlineCommand::Base => DeclKind::Base,
        }
    }

    /// Section of the owner the extracted entity is filed under.
    pub fn section(self) -> SectionKind {
        match self {
            InlineCommand::Param => SectionKind::Parameters,
            InlineCommand::TParam => SectionKind::Requires,
            InlineCommand::Base => SectionKind::Bases,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Special(SpecialCommand),
    Section(SectionKind),
    Inline(InlineCommand),
}

impl Command {
    pub fn name(self) -> &'static str {
        match self {
            Command::Special(c) => c.name(),
            Command::Section(k) => k.name(),
            Command::Inline(c) => c.name(),
        }
    }

    /// Every recognised command, in a stable order.
    pub fn all() -> impl Iterator<Item = Command> {
        SpecialCommand::ALL
            .into_iter()
            .map(Command::Special)
            .chain(SectionKind::ALL.into_iter().map(Command::Section))
            .chain(InlineCommand::ALL.into_iter().map(Command::Inline))
    }

    pub fn from_name(name: &str) -> Option<Command> {
        Self::all().find(|c| c.name() == name)
    }
}
