//! Per-command recognition patterns.
//!
//! Every command is recognised by its own regex, matched at the start of a
//! line's content and required to end at whitespace or end of line. The
//! default for `name` is the literal `\name`. Overrides keyed by `name`
//! replace the default; keys of the form `|name` extend it as an
//! alternative.

use std::collections::HashMap;

use regex::Regex;

use super::kinds::Command;

/// Leading character of an override key requesting a merge.
pub const MERGE_PREFIX: char = '|';

#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("unknown command '{0}' in pattern overrides")]
    UnknownCommand(String),
    #[error("invalid pattern for command '{command}': {source}")]
    InvalidPattern {
        command: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone)]
struct CompiledPattern {
    command: Command,
    source: String,
    regex: Regex,
}

/// The compiled recognition patterns of every command.
#[derive(Debug, Clone)]
pub struct CommandPatterns {
    patterns: Vec<CompiledPattern>,
}

impl CommandPatterns {
    pub fn default_pattern(command: Command) -> String {
        regex::escape(&format!("\\{}", command.name()))
    }

    /// Applies `overrides` on top of the defaults.
    pub fn with_overrides<'a>(
        overrides: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, PatternError> {
        let mut sources: HashMap<Command, String> = Command::all()
            .map(|c| (c, Self::default_pattern(c)))
            .collect();

        for (key, pattern) in overrides {
            let (merge, name) = match key.strip_prefix(MERGE_PREFIX) {
                Some(name) => (true, name),
                None => (false, key),
            };
            let command =
                Command::from_name(name).ok_or_else(|| PatternError::UnknownCommand(name.into()))?;
            let current = sources.entry(command).or_default();
            *current = if merge {
                format!("{current}|{pattern}")
            } else {
                pattern.to_string()
            };
        }

        let patterns = Command::all()
            .map(|command| {
                let source = sources.remove(&command).unwrap_or_default();
                let regex = Regex::new(&format!(r"^(?P<cmd>(?:{source}))(?:\s|$)")).map_err(
                    |source| PatternError::InvalidPattern {
                        command: command.name().to_string(),
                        source,
                    },
                )?;
                Ok(CompiledPattern {
                    command,
                    source,
                    regex,
                })
            })
            .collect::<Result<_, PatternError>>()?;

        Ok(Self { patterns })
    }

    /// Pattern source currently used for `command`.
    pub fn pattern(&self, command: Command) -> Option<&str> {
        self.patterns
            .iter()
            .find(|p| p.command == command)
            .map(|p| p.source.as_str())
    }

    /// Recognises a command at the start of `content`.
    ///
    /// Returns the command and the byte length of the matched token. When
    /// several patterns match, the longest token wins.
    pub fn match_command(&self, content: &str) -> Option<(Command, usize)> {
        self.patterns
            .iter()
            .filter_map(|p| {
                let token = p.regex.captures(content)?.name("cmd")?;
                (!token.is_empty()).then(|| (p.command, token.end()))
            })
            .max_by_key(|(_, len)| *len)
    }
}

impl Default for CommandPatterns {
    fn default() -> Self {
        let patterns = Command::all()
            .filter_map(|command| {
                let source = Self::default_pattern(command);
                let regex = Regex::new(&format!(r"^(?P<cmd>{source})(?:\s|$)")).ok()?;
                Some(CompiledPattern {
                    command,
                    source,
                    regex,
                })
            })
            .collect();
        Self { patterns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SectionKind;
    use crate::parsing::commands::{InlineCommand, SpecialCommand};
    use rstest::rstest;

    #[rstest]
    #[case("\\effects Exchanges values.", Some(Command::Section(SectionKind::Effects)))]
    #[case("\\param a first", Some(Command::Inline(InlineCommand::Param)))]
    #[case("\\parameters", Some(Command::Section(SectionKind::Parameters)))]
    #[case("\\tparam T desc.", Some(Command::Inline(InlineCommand::TParam)))]
    #[case("\\end", Some(Command::Special(SpecialCommand::End)))]
    #[case("\\effectsX", None)]
    #[case("Calls \\effects", None)]
    #[case("\\unknown x", None)]
    fn default_recognition(#[case] line: &str, #[case] expected: Option<Command>) {
        let patterns = CommandPatterns::default();
        assert_eq!(patterns.match_command(line).map(|(c, _)| c), expected);
    }

    #[test]
    fn token_length_excludes_argument() {
        let patterns = CommandPatterns::default();
        assert_eq!(
            patterns.match_command("\\group swap"),
            Some((Command::Special(SpecialCommand::Group), 6))
        );
    }

    #[test]
    fn override_replaces_default() {
        let patterns = CommandPatterns::with_overrides([("returns", r"@return")]).unwrap();
        let returns = Command::Section(SectionKind::Returns);
        assert_eq!(patterns.match_command("@return x").map(|(c, _)| c), Some(returns));
        assert_eq!(patterns.match_command("\\returns x"), None);
    }

    #[test]
    fn merge_override_extends_default() {
        let patterns = CommandPatterns::with_overrides([("|returns", r"\\return")]).unwrap();
        let returns = Command::Section(SectionKind::Returns);
        assert_eq!(patterns.match_command("\\return x").map(|(c, _)| c), Some(returns));
        assert_eq!(patterns.match_command("\\returns x").map(|(c, _)| c), Some(returns));
        assert_eq!(patterns.pattern(returns), Some(r"\\returns|\\return"));
    }

    #[test]
    fn unknown_override_is_rejected() {
        let err = CommandPatterns::with_overrides([("effect", "x")]).unwrap_err();
        assert!(matches!(err, PatternError::UnknownCommand(name) if name == "effect"));
    }

    #[test]
    fn invalid_override_names_the_command() {
        let err = CommandPatterns::with_overrides([("brief", "(")]).unwrap_err();
        assert_eq!(
            err.to_string().split(':').next(),
            Some("invalid pattern for command 'brief'")
        );
    }
}
