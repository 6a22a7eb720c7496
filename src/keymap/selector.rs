//! Selector subset used to scope key bindings
//!
//! Supported: type (`div`), universal (`*`), id (`#main`), class (`.panel`),
//! attribute presence and equality (`[data-kind]`, `[data-kind="grid"]`),
//! descendant (whitespace) and child (`>`) combinators.

use std::fmt;

use super::error::KeymapError;
use super::scope::ScopeNode;

/// CSS specificity as `(ids, classes + attributes, types)`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Specificity(pub u32, pub u32, pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    value: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Compound {
    /// `None` for `*` or when no type was written
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.ids.is_empty() && self.classes.is_empty() && self.attrs.is_empty()
    }

    fn matches(&self, node: &ScopeNode) -> bool {
        if let Some(ref tag) = self.tag {
            if !tag.eq_ignore_ascii_case(&node.tag) {
                return false;
            }
        }
        if !self.ids.iter().all(|id| node.id.as_deref() == Some(id.as_str())) {
            return false;
        }
        if !self.classes.iter().all(|c| node.classes.iter().any(|nc| nc == c)) {
            return false;
        }
        self.attrs.iter().all(|attr| match node.attr(&attr.name) {
            None => false,
            Some(actual) => attr.value.as_deref().map_or(true, |v| v == actual),
        })
    }
}

/// A parsed, validated selector
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    source: String,
    compounds: Vec<Compound>,
    /// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
    specificity: Specificity,
}

impl Selector {
    /// Parse and validate a selector string
    pub fn parse(source: &str) -> Result<Self, KeymapError> {
        let invalid = |reason: &str| KeymapError::InvalidSelector {
            selector: source.to_string(),
            reason: reason.to_string(),
        };

        if source.contains(',') {
            return Err(invalid("selector lists are not allowed"));
        }

        let chars: Vec<char> = source.chars().collect();
        let mut pos = 0;
        let mut compounds = Vec::new();
        let mut combinators = Vec::new();

        skip_whitespace(&chars, &mut pos);
        if pos == chars.len() {
            return Err(invalid("selector is empty"));
        }

        loop {
            let compound = parse_compound(&chars, &mut pos).map_err(|r| invalid(&r))?;
            compounds.push(compound);

            let had_space = skip_whitespace(&chars, &mut pos);
            if pos == chars.len() {
                break;
            }
            if chars[pos] == '>' {
                pos += 1;
                skip_whitespace(&chars, &mut pos);
                if pos == chars.len() {
                    return Err(invalid("dangling '>' combinator"));
                }
                combinators.push(Combinator::Child);
            } else if had_space {
                combinators.push(Combinator::Descendant);
            } else {
                return Err(invalid(&format!("unexpected character '{}'", chars[pos])));
            }
        }

        let specificity = compounds.iter().fold(Specificity::default(), |acc, c| {
            Specificity(
                acc.0 + c.ids.len() as u32,
                acc.1 + (c.classes.len() + c.attrs.len()) as u32,
                acc.2 + u32::from(c.tag.is_some()),
            )
        });

        Ok(Self {
            source: source.trim().to_string(),
            compounds,
            combinators,
            specificity,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn specificity(&self) -> Specificity {
        self.specificity
    }

    /// Whether this selector matches `nodes[0]`, with `nodes[1..]` as its
    /// ancestors from nearest to root
    pub fn matches_nodes(&self, nodes: &[ScopeNode]) -> bool {
        if nodes.is_empty() {
            return false;
        }
        let mut failed = vec![false; self.compounds.len() * nodes.len()];
        self.match_from(self.compounds.len() - 1, nodes, 0, &mut failed)
    }

    /// `failed` remembers `(compound, pos)` pairs already known not to match,
    /// which keeps descendant backtracking polynomial
    fn match_from(
        &self,
        compound: usize,
        nodes: &[ScopeNode],
        pos: usize,
        failed: &mut [bool],
    ) -> bool {
        let slot = compound * nodes.len() + pos;
        if failed[slot] {
            return false;
        }
        let matched = self.compounds[compound].matches(&nodes[pos])
            && (compound == 0
                || match self.combinators[compound - 1] {
                    Combinator::Child => {
                        pos + 1 < nodes.len() && self.match_from(compound - 1, nodes, pos + 1, failed)
                    }
                    Combinator::Descendant => (pos + 1..nodes.len())
                        .any(|p| self.match_from(compound - 1, nodes, p, failed)),
                });
        if !matched {
            failed[slot] = true;
        }
        matched
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for Selector {
    type Err = KeymapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

/// Parse a single compound such as `div#main.panel[data-kind=grid]` into a
/// concrete scope node
pub(super) fn parse_scope_node(source: &str) -> Result<ScopeNode, KeymapError> {
    let selector = Selector::parse(source)?;
    let invalid = |reason: &str| KeymapError::InvalidSelector {
        selector: source.to_string(),
        reason: reason.to_string(),
    };
    if selector.compounds.len() != 1 {
        return Err(invalid("a scope node is a single compound"));
    }
    let Some(compound) = selector.compounds.into_iter().next() else {
        return Err(invalid("a scope node is a single compound"));
    };
    if compound.ids.len() > 1 {
        return Err(invalid("a scope node has at most one id"));
    }
    Ok(ScopeNode {
        tag: compound.tag.unwrap_or_default(),
        id: compound.ids.into_iter().next(),
        classes: compound.classes,
        attrs: compound
            .attrs
            .into_iter()
            .map(|a| (a.name, a.value.unwrap_or_default()))
            .collect(),
    })
}

fn skip_whitespace(chars: &[char], pos: &mut usize) -> bool {
    let start = *pos;
    while *pos < chars.len() && chars[*pos].is_whitespace() {
        *pos += 1;
    }
    *pos > start
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn parse_ident(chars: &[char], pos: &mut usize) -> Option<String> {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos]) {
        *pos += 1;
    }
    (*pos > start).then(|| chars[start..*pos].iter().collect())
}

fn parse_compound(chars: &[char], pos: &mut usize) -> Result<Compound, String> {
    let mut compound = Compound::default();
    let mut universal = false;

    if chars[*pos] == '*' {
        universal = true;
        *pos += 1;
    } else if let Some(tag) = parse_ident(chars, pos) {
        compound.tag = Some(tag);
    }

    while *pos < chars.len() {
        match chars[*pos] {
            '#' => {
                *pos += 1;
                let id = parse_ident(chars, pos).ok_or("empty id")?;
                compound.ids.push(id);
            }
            '.' => {
                *pos += 1;
                let class = parse_ident(chars, pos).ok_or("empty class name")?;
                compound.classes.push(class);
            }
            '[' => {
                *pos += 1;
                compound.attrs.push(parse_attr(chars, pos)?);
            }
            ':' => return Err("pseudo-classes are not supported".to_string()),
            c if c.is_whitespace() || c == '>' => break,
            c => return Err(format!("unexpected character '{c}'")),
        }
    }

    if compound.is_empty() && !universal {
        return Err("expected a simple selector".to_string());
    }
    Ok(compound)
}

fn parse_attr(chars: &[char], pos: &mut usize) -> Result<AttrMatch, String> {
    skip_whitespace(chars, pos);
    let name = parse_ident(chars, pos).ok_or("empty attribute name")?;
    skip_whitespace(chars, pos);

    let value = if *pos < chars.len() && chars[*pos] == '=' {
        *pos += 1;
        skip_whitespace(chars, pos);
        let value = match chars.get(*pos) {
            Some(&quote) if quote == '"' || quote == '\'' => {
                *pos += 1;
                let start = *pos;
                while *pos < chars.len() && chars[*pos] != quote {
                    *pos += 1;
                }
                if *pos == chars.len() {
                    return Err("unterminated attribute value".to_string());
                }
                let value: String = chars[start..*pos].iter().collect();
                *pos += 1;
                value
            }
            _ => parse_ident(chars, pos).ok_or("missing attribute value")?,
        };
        skip_whitespace(chars, pos);
        Some(value)
    } else {
        None
    };

    if chars.get(*pos) != Some(&']') {
        return Err("unbalanced '['".to_string());
    }
    *pos += 1;
    Ok(AttrMatch { name, value })
}
