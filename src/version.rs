use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use itertools::Itertools;

use crate::constants::{NOT_FOUND, UNKNOWN_SENTINELS, UNUSUAL_VERSION_CHARS};

/// A single run of characters taken from a version string.
///
/// Digit runs are numeric and compare by magnitude against other numeric runs. Everything else
/// (letters, but also separators such as `.`, `-` or `~`) is kept as text and compares by code
/// point. When a numeric run meets a text run at the same position, both are compared as text.
/// That fallback is what the inventories have always been sorted with, so "1.0a" sorts above
/// "1.0.1" ('a' > '.') even though a human might disagree.
#[derive(Clone, Debug, Eq)]
pub enum VersionComponent {
    /// A run of ASCII digits, kept as written so that the text fallback sees leading zeroes
    Integer(String),
    /// A run of ASCII letters, or a run of anything that is neither digit nor letter
    Text(String),
}

impl VersionComponent {
    /// The characters this component was built from
    pub fn as_str(&self) -> &str {
        match self {
            VersionComponent::Integer(digits) => digits,
            VersionComponent::Text(text) => text,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, VersionComponent::Integer(_))
    }
}

impl PartialEq for VersionComponent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for VersionComponent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionComponent {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (VersionComponent::Integer(digits1), VersionComponent::Integer(digits2)) => {
                // magnitude without parsing, so arbitrarily long date stamps can't overflow
                let digits1 = digits1.trim_start_matches('0');
                let digits2 = digits2.trim_start_matches('0');

                digits1
                    .len()
                    .cmp(&digits2.len())
                    .then_with(|| digits1.cmp(digits2))
            }
            _ => self.as_str().cmp(other.as_str()),
        }
    }
}

impl fmt::Display for VersionComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The tokenized, comparable form of a version string.
///
/// Two parsed versions are compared position by position, the first differing component decides.
/// If one version runs out of components first while all shared positions are equal, it is the
/// lesser one, e.g. 1.2 < 1.2.1 and 1.2.0 > 1.2.
///
/// There is no notion of pre-release or snapshot markers here. A `~` is just another text run,
/// so 2.0~b1 sorts *above* 2.0 because it has more components.
#[derive(Clone, Debug, Default, Eq)]
pub struct ParsedVersion {
    components: Vec<VersionComponent>,
}

impl ParsedVersion {
    /// Normalize and tokenize a raw version string
    pub fn parse(raw: &str) -> Self {
        tokenize(&normalize(raw))
    }

    pub fn components(&self) -> &[VersionComponent] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl PartialEq for ParsedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for ParsedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ParsedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        for (component1, component2) in self.components.iter().zip(&other.components) {
            let ordering = component1.cmp(component2);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }

        self.components.len().cmp(&other.components.len())
    }
}

impl fmt::Display for ParsedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for component in &self.components {
            write!(f, "{}", component)?;
        }
        Ok(())
    }
}

/// An owned version string that orders by [`compare`] and prints as it was written.
#[derive(Clone, Debug)]
pub struct Version {
    raw: String,
    parsed: ParsedVersion,
}

impl Version {
    pub fn parse<T: Into<String>>(raw: T) -> Self {
        let raw = raw.into();
        let parsed = ParsedVersion::parse(&raw);
        Self { raw, parsed }
    }

    /// The version exactly as it was given
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn parsed(&self) -> &ParsedVersion {
        &self.parsed
    }
}

impl From<&str> for Version {
    fn from(raw: &str) -> Self {
        Version::parse(raw)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parsed.cmp(&other.parsed)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A version as read from an inventory cell or a metadata lookup, which may not be known at all.
///
/// [`compare`] treats the "Not_Found" placeholder as version `0` for compatibility with existing
/// inventories, which makes "we couldn't find it" indistinguishable from a real zero version.
/// Callers that care about the difference should go through this type instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObservedVersion<'a> {
    Known(&'a str),
    Unknown,
}

impl<'a> ObservedVersion<'a> {
    /// Interpret a cell value. Missing cells, blank cells and the placeholder itself are unknown.
    pub fn from_cell(cell: Option<&'a str>) -> Self {
        match cell.map(str::trim) {
            None => ObservedVersion::Unknown,
            Some(value) if value.is_empty() || is_unknown_sentinel(value) => {
                ObservedVersion::Unknown
            }
            Some(value) => ObservedVersion::Known(value),
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, ObservedVersion::Known(_))
    }

    pub fn as_known(&self) -> Option<&'a str> {
        match *self {
            ObservedVersion::Known(version) => Some(version),
            ObservedVersion::Unknown => None,
        }
    }
}

impl fmt::Display for ObservedVersion<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservedVersion::Known(version) => f.write_str(version),
            ObservedVersion::Unknown => f.write_str(NOT_FOUND),
        }
    }
}

/// Whether `value` is one of the "value could not be determined" placeholders
pub fn is_unknown_sentinel(value: &str) -> bool {
    UNKNOWN_SENTINELS.contains(&value)
}

/// Replace the unknown placeholders with `0` and treat `_` as an alias for `.`
pub fn normalize(raw: &str) -> Cow<'_, str> {
    if !raw.contains('_') {
        return Cow::Borrowed(raw);
    }

    let mut normalized = raw.to_string();
    for sentinel in UNKNOWN_SENTINELS {
        normalized = normalized.replace(sentinel, "0");
    }
    Cow::Owned(normalized.replace('_', "."))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CharClass {
    Digit,
    Alpha,
    Other,
}

impl CharClass {
    fn of(c: char) -> Self {
        if c.is_ascii_digit() {
            CharClass::Digit
        } else if c.is_ascii_alphabetic() {
            CharClass::Alpha
        } else {
            CharClass::Other
        }
    }
}

/// Split an already normalized version string into maximal digit / letter / other runs
pub fn tokenize(normalized: &str) -> ParsedVersion {
    let mut components = Vec::new();
    let mut rest = normalized;

    while let Some(first) = rest.chars().next() {
        let class = CharClass::of(first);
        let end = rest
            .find(|c: char| CharClass::of(c) != class)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);

        components.push(match class {
            CharClass::Digit => VersionComponent::Integer(run.to_string()),
            CharClass::Alpha | CharClass::Other => VersionComponent::Text(run.to_string()),
        });
        rest = tail;
    }

    ParsedVersion { components }
}

/// Compare two version strings
pub fn compare(version1: &str, version2: &str) -> Ordering {
    if version1 == version2 {
        return Ordering::Equal;
    }

    ParsedVersion::parse(version1).cmp(&ParsedVersion::parse(version2))
}

/// Whether `candidate` sorts strictly above `reference`
pub fn is_greater(candidate: &str, reference: &str) -> bool {
    compare(candidate, reference) == Ordering::Greater
}

/// Compare two observed versions, or `None` if either of them is unknown
pub fn compare_observed(
    version1: ObservedVersion<'_>,
    version2: ObservedVersion<'_>,
) -> Option<Ordering> {
    Some(compare(version1.as_known()?, version2.as_known()?))
}

/// Sort version strings newest first. Versions that compare equal keep their relative order.
pub fn sort_versions_desc<S: AsRef<str>>(versions: &[S]) -> Vec<String> {
    versions
        .iter()
        .map(|version| (ParsedVersion::parse(version.as_ref()), version.as_ref()))
        .sorted_by(|(parsed1, _), (parsed2, _)| parsed2.cmp(parsed1))
        .map(|(_, version)| version.to_string())
        .collect()
}

/// The greatest version in the list; the earliest one wins among equals
pub fn latest_version<S: AsRef<str>>(versions: &[S]) -> Option<&str> {
    let mut latest: Option<(ParsedVersion, &str)> = None;

    for version in versions {
        let parsed = ParsedVersion::parse(version.as_ref());
        if latest.as_ref().is_none_or(|(best, _)| parsed > *best) {
            latest = Some((parsed, version.as_ref()));
        }
    }

    latest.map(|(_, version)| version)
}

/// The part of `version` before the first unusual character (`~`, `^`, ...). Versions like
/// `2.0~rc1` or `1.0^20240101git` are snapshots or pre-releases that need a closer look.
pub fn truncate_at_unusual_char(version: &str) -> &str {
    version
        .find(|c: char| UNUSUAL_VERSION_CHARS.contains(c))
        .map_or(version, |idx| &version[..idx])
}
