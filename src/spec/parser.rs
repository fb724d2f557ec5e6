//! Line grammar for the spec file preamble.

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{char, space0, space1};
use nom::combinator::rest;
use nom::{IResult, Parser};

/// One meaningful line of a spec file preamble
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum PreambleLine<'a> {
    /// `Tag: value`
    Tag { name: &'a str, value: &'a str },
    /// `%define NAME BODY` or `%global NAME BODY`
    Definition { name: &'a str, body: &'a str },
    /// `%define NAME(opts) BODY`, not expanded by us
    ParametricDefinition { name: &'a str },
    /// Start of a section (`%prep`, `%files`, ...)
    Section(&'a str),
    /// Comments, blank lines, conditionals and anything else we don't interpret
    Other,
}

fn macro_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_').parse(input)
}

fn tag_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric()).parse(input)
}

pub(crate) fn tag_line(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, (name, _, _, _, value)) =
        (tag_name, space0, char(':'), space0, rest).parse(input)?;
    Ok((input, (name, value.trim_end())))
}

/// Parse a definition line, returning the macro name and whatever follows it
pub(crate) fn definition_line(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, (_, _, _, name, body)) = (
        char('%'),
        alt((tag("define"), tag("global"))),
        space1,
        macro_name,
        rest,
    )
        .parse(input)?;
    Ok((input, (name, body)))
}

pub(crate) fn section_line<'a>(input: &'a str, sections: &[&str]) -> Option<&'a str> {
    let word = input.split_whitespace().next()?;
    sections.contains(&word).then_some(word)
}

pub(crate) fn classify<'a>(line: &'a str, sections: &[&str]) -> PreambleLine<'a> {
    let line = line.trim_start();

    if line.starts_with('#') || line.is_empty() {
        return PreambleLine::Other;
    }
    if let Some(section) = section_line(line, sections) {
        return PreambleLine::Section(section);
    }
    if let Ok((_, (name, body))) = definition_line(line) {
        if body.starts_with('(') {
            return PreambleLine::ParametricDefinition { name };
        }
        return PreambleLine::Definition {
            name,
            body: body.trim(),
        };
    }
    if let Ok((_, (name, value))) = tag_line(line) {
        return PreambleLine::Tag { name, value };
    }
    PreambleLine::Other
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::SPEC_SECTIONS;

    #[test]
    fn test_tag_line() {
        assert_eq!(Ok(("", ("Name", "libfoo"))), tag_line("Name:   libfoo"));
        assert_eq!(
            Ok(("", ("Source0", "https://x/y.tar.gz"))),
            tag_line("Source0:\thttps://x/y.tar.gz  ")
        );
        assert_eq!(Ok(("", ("Release", ""))), tag_line("Release:"));
        assert_eq!(Ok(("", ("Version", "1.2"))), tag_line("Version :1.2"));
        assert!(tag_line("%define foo bar").is_err());
        assert!(tag_line("Requires(post): foo").is_err());
    }

    #[test]
    fn test_definition_line() {
        assert_eq!(
            Ok(("", ("majorver", " 3.1"))),
            definition_line("%define majorver 3.1")
        );
        assert_eq!(
            Ok(("", ("_name", "\t%{name}-x"))),
            definition_line("%global _name\t%{name}-x")
        );
        assert!(definition_line("%undefine foo").is_err());
        assert!(definition_line("%define").is_err());
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            PreambleLine::Tag {
                name: "URL",
                value: "https://example.org"
            },
            classify("URL: https://example.org", &SPEC_SECTIONS)
        );
        assert_eq!(
            PreambleLine::Definition {
                name: "with_docs",
                body: "1"
            },
            classify("  %global with_docs 1 ", &SPEC_SECTIONS)
        );
        assert_eq!(
            PreambleLine::ParametricDefinition { name: "py_build" },
            classify("%define py_build() %{__python} setup.py build", &SPEC_SECTIONS)
        );
        assert_eq!(
            PreambleLine::Section("%description"),
            classify("%description devel", &SPEC_SECTIONS)
        );
        assert_eq!(PreambleLine::Other, classify("# Version: 9", &SPEC_SECTIONS));
        assert_eq!(PreambleLine::Other, classify("%if 0%{?with_docs}", &SPEC_SECTIONS));
        assert_eq!(PreambleLine::Other, classify("", &SPEC_SECTIONS));
    }
}
