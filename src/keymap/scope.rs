//! Scope chains: where a keydown event happened, from the target up to the root

use std::fmt;

use super::error::KeymapError;
use super::selector::{parse_scope_node, Selector};

/// The ancestor chain of an event target
///
/// Level 0 is the target itself, `depth() - 1` is the root. Hosts with a real
/// widget tree implement this over their own nodes; tests and simple hosts
/// use [`ScopePath`].
pub trait ScopeChain {
    /// Number of scopes in the chain
    fn depth(&self) -> usize;

    /// Whether `selector` matches the scope at `level`
    fn matches(&self, level: usize, selector: &Selector) -> bool;

    /// Short description for logs
    fn describe(&self) -> String {
        format!("<{} scopes>", self.depth())
    }
}

/// A concrete scope: a tag with an optional id, classes and attributes
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeNode {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
}

impl ScopeNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Parse selector-like notation, e.g. `div#grid.panel[data-kind=table]`
    pub fn parse(source: &str) -> Result<Self, KeymapError> {
        parse_scope_node(source)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for ScopeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag)?;
        if let Some(ref id) = self.id {
            write!(f, "#{}", id)?;
        }
        for class in &self.classes {
            write!(f, ".{}", class)?;
        }
        for (name, value) in &self.attrs {
            write!(f, "[{}=\"{}\"]", name, value)?;
        }
        Ok(())
    }
}

/// A synthetic scope chain, innermost node first
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopePath {
    nodes: Vec<ScopeNode>,
}

impl ScopePath {
    pub fn new(nodes: Vec<ScopeNode>) -> Self {
        Self { nodes }
    }

    /// Build a path from selector-like node descriptions, innermost first
    ///
    /// ```
    /// use chordmap::keymap::{ScopeChain, ScopePath};
    ///
    /// let path = ScopePath::from_innermost(&["input#search", "div.toolbar", "body"]).unwrap();
    /// assert_eq!(path.depth(), 3);
    /// ```
    pub fn from_innermost<S: AsRef<str>>(nodes: &[S]) -> Result<Self, KeymapError> {
        nodes
            .iter()
            .map(|s| ScopeNode::parse(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    pub fn nodes(&self) -> &[ScopeNode] {
        &self.nodes
    }
}

impl ScopeChain for ScopePath {
    fn depth(&self) -> usize {
        self.nodes.len()
    }

    fn matches(&self, level: usize, selector: &Selector) -> bool {
        level < self.nodes.len() && selector.matches_nodes(&self.nodes[level..])
    }

    fn describe(&self) -> String {
        self.nodes
            .iter()
            .rev()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" > ")
    }
}
