//! Reading the preamble of RPM spec files.
//!
//! Only what is needed to find out which upstream version a package is built from, where its
//! sources come from and which patches it carries. Conditionals (`%if`) are not evaluated, every
//! tag and definition line is taken at face value.

mod macros;
mod parser;

use std::collections::HashMap;
use std::path::Path;

pub use macros::MacroTable;

use crate::constants::SPEC_SECTIONS;
use crate::errors::*;
use crate::version::ObservedVersion;
use parser::PreambleLine;

/// Where a source archive is fetched from, after macro expansion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    pub base_url: String,
    pub filename: String,
}

impl SourceLocation {
    /// Split a source reference at its last `/`
    pub fn parse(source: &str) -> Self {
        match source.rsplit_once('/') {
            Some((base_url, filename)) => Self {
                base_url: base_url.to_string(),
                filename: filename.to_string(),
            },
            None => Self {
                base_url: String::new(),
                filename: source.to_string(),
            },
        }
    }

    /// The archive name without its last two extensions, i.e. the directory a
    /// `foo-1.2.tar.gz` normally unpacks into.
    pub fn archive_stem(&self) -> &str {
        self.filename
            .rsplitn(3, '.')
            .last()
            .unwrap_or(&self.filename)
    }

    /// The full url (or bare filename if there is no base)
    pub fn url(&self) -> String {
        if self.base_url.is_empty() {
            self.filename.clone()
        } else {
            format!("{}/{}", self.base_url, self.filename)
        }
    }
}

/// Which spec tree of the distribution a spec file lives in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecRepository {
    /// `SPECS`
    Core,
    /// `SPECS-EXTENDED`
    Extended,
}

impl SpecRepository {
    /// Classify a spec file by the directories on its path, `None` if it is in neither tree.
    pub fn of_path(path: &Path) -> Option<Self> {
        let mut repository = None;
        for component in path.components() {
            match component.as_os_str().to_str() {
                Some("SPECS-EXTENDED") => return Some(SpecRepository::Extended),
                Some("SPECS") => repository = Some(SpecRepository::Core),
                _ => {}
            }
        }
        repository
    }
}

/// Tags that are also visible as macros of the same (lowercase) name
const TAG_MACROS: [&str; 7] = [
    "name", "version", "release", "epoch", "summary", "license", "url",
];

/// The preamble of a spec file with its macros.
#[derive(Clone, Debug)]
pub struct SpecFile {
    tags: HashMap<String, String>,
    sources: Vec<(u32, String)>,
    patches: Vec<(u32, String)>,
    macros: MacroTable,
    name: String,
    version: Option<String>,
    release: Option<String>,
}

impl SpecFile {
    /// Read and parse a spec file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path.as_ref())?;
        log::debug!("parsing spec file {}", path.as_ref().display());
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, Error> {
        Self::parse_with_macros(content, &MacroTable::new())
    }

    /// Parse with a set of predefined macros, such as `dist` for the target distribution.
    pub fn parse_with_macros(content: &str, predefined: &MacroTable) -> Result<Self, Error> {
        let mut tags = HashMap::new();
        let mut sources = Vec::new();
        let mut patches = Vec::new();
        let mut macros = predefined.clone();

        for (line_number, line) in logical_lines(content) {
            match parser::classify(&line, &SPEC_SECTIONS) {
                PreambleLine::Section(section) => {
                    log::debug!("preamble ends at line {} ({})", line_number, section);
                    break;
                }
                PreambleLine::Definition { name, body } => {
                    if body.is_empty() {
                        return Err(Error::SpecParse {
                            line: line_number,
                            reason: format!("macro {} has no body", name),
                        });
                    }
                    macros.define(name, body);
                }
                PreambleLine::ParametricDefinition { name } => {
                    log::debug!("skipping parametric macro {} on line {}", name, line_number);
                }
                PreambleLine::Tag { name, value } => {
                    let key = name.to_ascii_lowercase();
                    if let Some(index) = numbered(&key, "source") {
                        sources.push((index, value.to_string()));
                    } else if let Some(index) = numbered(&key, "patch") {
                        patches.push((index, value.to_string()));
                    } else {
                        tags.entry(key).or_insert_with(|| value.to_string());
                    }
                }
                PreambleLine::Other => {}
            }
        }

        let raw_name = tags.get("name").ok_or(Error::MissingTag("Name"))?.clone();
        for tag in TAG_MACROS {
            if let Some(value) = tags.get(tag) {
                macros.define(tag, value.as_str());
            }
        }

        let name = macros.expand(&raw_name);
        let version = resolve(&macros, &name, "Version", tags.get("version"));
        let release = resolve(&macros, &name, "Release", tags.get("release"));

        Ok(Self {
            tags,
            sources,
            patches,
            macros,
            name,
            version,
            release,
        })
    }

    /// The package name with macros expanded
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resolved_version(&self) -> ObservedVersion<'_> {
        ObservedVersion::from_cell(self.version.as_deref())
    }

    pub fn resolved_release(&self) -> ObservedVersion<'_> {
        ObservedVersion::from_cell(self.release.as_deref())
    }

    /// The value of a tag as written in the file. Tag names are case insensitive.
    pub fn raw_tag(&self, tag: &str) -> Option<&str> {
        self.tags.get(&tag.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }

    pub fn expand(&self, text: &str) -> String {
        self.macros.expand(text)
    }

    /// The primary source (`Source` or `Source0`), expanded and split into url and filename
    pub fn source0_location(&self) -> Option<SourceLocation> {
        self.sources
            .iter()
            .find(|(index, _)| *index == 0)
            .map(|(_, source)| SourceLocation::parse(&self.expand(source)))
    }

    /// All sources in file order, expanded
    pub fn sources(&self) -> Vec<String> {
        self.sources
            .iter()
            .map(|(_, source)| self.expand(source))
            .collect()
    }

    /// All patch files in file order, expanded
    pub fn patches(&self) -> Vec<String> {
        self.patches
            .iter()
            .map(|(_, patch)| self.expand(patch))
            .collect()
    }
}

/// Expand a version-like tag, giving up if any macro is left unresolved
fn resolve(
    macros: &MacroTable,
    package: &str,
    tag: &str,
    raw: Option<&String>,
) -> Option<String> {
    let expanded = macros.expand(raw?);
    if expanded.contains('%') {
        log::error!(
            "could not resolve {} macro for {}: {:?}",
            tag,
            package,
            expanded
        );
        return None;
    }
    Some(expanded)
}

/// `source` -> 0, `source12` -> 12, anything else -> None
fn numbered(key: &str, prefix: &str) -> Option<u32> {
    let suffix = key.strip_prefix(prefix)?;
    if suffix.is_empty() {
        return Some(0);
    }
    suffix.parse().ok()
}

/// Lines with trailing-backslash continuations joined, numbered from 1 by their first line
fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, line) in content.lines().enumerate() {
        let (number, mut joined) = pending.take().unwrap_or((idx + 1, String::new()));
        match line.strip_suffix('\\') {
            Some(continued) => {
                joined.push_str(continued);
                pending = Some((number, joined));
            }
            None => {
                joined.push_str(line);
                lines.push((number, joined));
            }
        }
    }
    lines.extend(pending);

    lines
}
