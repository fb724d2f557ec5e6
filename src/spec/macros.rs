use std::collections::HashMap;

use crate::constants::{MACRO_EXPANSION_DEPTH, MAX_EXPANDED_LEN};

/// Macro definitions in scope while reading a spec file.
///
/// Predefined macros (e.g. `dist`) can be handed to [`super::SpecFile::parse_with_macros`];
/// definitions from the spec file itself override them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MacroTable {
    definitions: HashMap<String, String>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or redefine) a macro. The body is stored unexpanded.
    pub fn define<N: Into<String>, B: Into<String>>(&mut self, name: N, body: B) -> &mut Self {
        self.definitions.insert(name.into(), body.into());
        self
    }

    pub fn with<N: Into<String>, B: Into<String>>(mut self, name: N, body: B) -> Self {
        self.define(name, body);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.definitions.get(name).map(String::as_str)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Expand every macro reference in `text` that can be resolved.
    ///
    /// References to undefined macros and shell expansions `%(...)` are left in place, so a
    /// remaining `%` in the output means the text could not be fully resolved. Text whose
    /// expansion grows past [`MAX_EXPANDED_LEN`] is returned unexpanded.
    pub fn expand(&self, text: &str) -> String {
        let mut budget = Budget::new(MAX_EXPANDED_LEN);
        let expanded = self.expand_at_depth(text, 0, &mut budget);
        if budget.exhausted {
            log::warn!(
                "expansion of {:?} exceeds {} bytes, leaving it unexpanded",
                text,
                MAX_EXPANDED_LEN
            );
            return text.to_string();
        }
        expanded
    }

    fn expand_at_depth(&self, text: &str, depth: usize, budget: &mut Budget) -> String {
        if budget.exhausted {
            return text.to_string();
        }
        if depth >= MACRO_EXPANSION_DEPTH {
            log::debug!("macro expansion depth exceeded on {:?}", text);
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(pos) = rest.find('%') {
            if budget.exhausted {
                break;
            }
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            if let Some(tail) = after.strip_prefix('%') {
                out.push('%');
                rest = tail;
            } else if after.starts_with('{') {
                match closing_delimiter(after, '{', '}') {
                    Some(end) => {
                        let reference = &after[1..end];
                        match self.expand_braced(reference, depth, budget) {
                            Some(expanded) => out.push_str(&expanded),
                            None => out.push_str(&rest[pos..pos + end + 2]),
                        }
                        rest = &after[end + 1..];
                    }
                    None => {
                        // unbalanced, nothing after this can be a reference
                        out.push_str(&rest[pos..]);
                        rest = "";
                    }
                }
            } else if after.starts_with('(') {
                let end = closing_delimiter(after, '(', ')').unwrap_or(after.len() - 1);
                out.push_str(&rest[pos..pos + end + 2]);
                rest = &after[end + 1..];
            } else {
                let name_len = macro_name_len(after);
                let name = &after[..name_len];
                match self.expand_name(name, depth, budget) {
                    Some(expanded) if name_len > 0 => out.push_str(&expanded),
                    _ => {
                        out.push('%');
                        out.push_str(name);
                    }
                }
                rest = &after[name_len..];
            }
        }

        out.push_str(rest);
        budget.spend(out.len() + 1);
        out
    }

    /// Expand the inside of a `%{...}` reference, or `None` to keep it verbatim
    fn expand_braced(&self, reference: &str, depth: usize, budget: &mut Budget) -> Option<String> {
        let (negated, conditional) = match reference.strip_prefix("!?") {
            Some(cond) => (true, Some(cond)),
            None => (false, reference.strip_prefix('?')),
        };

        let Some(conditional) = conditional else {
            return self.expand_name(reference, depth, budget);
        };

        let (name, alternative) = match conditional.split_once(':') {
            Some((name, alternative)) => (name, Some(alternative)),
            None => (conditional, None),
        };
        let defined = self.is_defined(name);

        let expanded = match (negated, alternative) {
            (false, None) if defined => self.expand_name(name, depth, budget).unwrap_or_default(),
            (true, Some(text)) if !defined => self.expand_at_depth(text, depth + 1, budget),
            (false, Some(text)) if defined => self.expand_at_depth(text, depth + 1, budget),
            _ => String::new(),
        };
        Some(expanded)
    }

    fn expand_name(&self, name: &str, depth: usize, budget: &mut Budget) -> Option<String> {
        if name == "nil" {
            return Some(String::new());
        }

        self.get(name)
            .map(|body| self.expand_at_depth(body, depth + 1, budget))
    }
}

/// Bytes left to produce during one expansion. Every nested expansion is charged, so
/// references that fan out are cut off long before their output would be built.
struct Budget {
    remaining: usize,
    exhausted: bool,
}

impl Budget {
    fn new(limit: usize) -> Self {
        Self {
            remaining: limit,
            exhausted: false,
        }
    }

    fn spend(&mut self, amount: usize) {
        match self.remaining.checked_sub(amount) {
            Some(remaining) => self.remaining = remaining,
            None => {
                self.remaining = 0;
                self.exhausted = true;
            }
        }
    }
}

/// Index of the delimiter closing the one `text` starts with, honoring nesting
fn closing_delimiter(text: &str, open: char, close: char) -> Option<usize> {
    let mut nesting = 0usize;
    for (idx, c) in text.char_indices() {
        if c == open {
            nesting += 1;
        } else if c == close {
            nesting -= 1;
            if nesting == 0 {
                return Some(idx);
            }
        }
    }
    None
}

fn macro_name_len(text: &str) -> usize {
    if !text.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        return 0;
    }
    text.find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .unwrap_or(text.len())
}
