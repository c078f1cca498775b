//! CSS selectors for the in-memory document.
//!
//! Supported: type (`img`, `*`), `#id`, `.class`, `[attr]`, `[attr="v"]`,
//! `[attr^="v"]`, descendant chains of those (`pre code`), and
//! comma-separated groups. Other combinators and pseudo-classes fail to
//! parse and therefore match nothing.

use std::{iter::Peekable, str::Chars};

/// Element tree a selector is matched against.
pub(crate) trait Tree {
    type Node: Copy;

    fn tag(&self, node: Self::Node) -> Option<&str>;
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SelectorList(Vec<Selector>);

/// Compounds joined by descendant combinators, subject last.
#[derive(Debug, Clone, PartialEq)]
struct Selector(Vec<Compound>);

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeMatch>,
}

#[derive(Debug, Clone, PartialEq)]
struct AttributeMatch {
    name: String,
    op: AttributeOp,
}

#[derive(Debug, Clone, PartialEq)]
enum AttributeOp {
    Exists,
    Equals(String),
    Prefix(String),
}

impl SelectorList {
    pub(crate) fn parse(selector: &str) -> Option<Self> {
        let selectors = selector
            .split(',')
            .map(parse_selector)
            .collect::<Option<Vec<_>>>()?;
        if selectors.is_empty() {
            None
        } else {
            Some(Self(selectors))
        }
    }

    pub(crate) fn matches<T: Tree>(&self, tree: &T, node: T::Node) -> bool {
        self.0.iter().any(|selector| selector.matches(tree, node))
    }
}

impl Selector {
    fn matches<T: Tree>(&self, tree: &T, node: T::Node) -> bool {
        let Some((subject, ancestors)) = self.0.split_last() else {
            return false;
        };
        if !subject.matches(tree, node) {
            return false;
        }

        // nearest matching ancestor first; greedy is exact for descendant-only chains
        let mut current = tree.parent(node);
        for compound in ancestors.iter().rev() {
            loop {
                let Some(candidate) = current else {
                    return false;
                };
                current = tree.parent(candidate);
                if compound.matches(tree, candidate) {
                    break;
                }
            }
        }
        true
    }
}

impl Compound {
    fn matches<T: Tree>(&self, tree: &T, node: T::Node) -> bool {
        let Some(tag) = tree.tag(node) else {
            return false;
        };
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if tree.attribute(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class_attr = tree.attribute(node, "class").unwrap_or_default();
            if !self
                .classes
                .iter()
                .all(|class| class_attr.split_whitespace().any(|c| c == class))
            {
                return false;
            }
        }
        self.attributes
            .iter()
            .all(|m| match (&m.op, tree.attribute(node, &m.name)) {
                (_, None) => false,
                (AttributeOp::Exists, Some(_)) => true,
                (AttributeOp::Equals(v), Some(actual)) => actual == v,
                (AttributeOp::Prefix(v), Some(actual)) => !v.is_empty() && actual.starts_with(v.as_str()),
            })
    }
}

fn parse_selector(input: &str) -> Option<Selector> {
    let mut chars = input.trim().chars().peekable();
    let mut compounds = Vec::new();
    while chars.peek().is_some() {
        compounds.push(parse_compound(&mut chars)?);
        skip_whitespace(&mut chars);
    }
    if compounds.is_empty() {
        None
    } else {
        Some(Selector(compounds))
    }
}

fn parse_compound(chars: &mut Peekable<Chars<'_>>) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut empty = true;

    if chars.peek() == Some(&'*') {
        chars.next();
        empty = false;
    } else {
        let tag = take_ident(chars);
        if !tag.is_empty() {
            compound.tag = Some(tag.to_ascii_lowercase());
            empty = false;
        }
    }

    while let Some(&c) = chars.peek() {
        match c {
            '#' => {
                chars.next();
                let id = take_ident(chars);
                if id.is_empty() {
                    return None;
                }
                compound.id = Some(id);
            },
            '.' => {
                chars.next();
                let class = take_ident(chars);
                if class.is_empty() {
                    return None;
                }
                compound.classes.push(class);
            },
            '[' => {
                chars.next();
                compound.attributes.push(parse_attribute(chars)?);
            },
            c if c.is_whitespace() => break,
            _ => return None,
        }
        empty = false;
    }

    if empty {
        None
    } else {
        Some(compound)
    }
}

fn parse_attribute(chars: &mut Peekable<Chars<'_>>) -> Option<AttributeMatch> {
    skip_whitespace(chars);
    let name = take_ident(chars);
    if name.is_empty() {
        return None;
    }
    skip_whitespace(chars);

    let op = match chars.next()? {
        ']' => {
            return Some(AttributeMatch {
                name,
                op: AttributeOp::Exists,
            })
        },
        '=' => AttributeOp::Equals(take_value(chars)?),
        '^' => {
            if chars.next()? != '=' {
                return None;
            }
            AttributeOp::Prefix(take_value(chars)?)
        },
        _ => return None,
    };

    skip_whitespace(chars);
    if chars.next()? != ']' {
        return None;
    }
    Some(AttributeMatch {
        name,
        op,
    })
}

fn take_ident(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            ident.push(c);
            chars.next();
        } else {
            break;
        }
    }
    ident
}

fn take_value(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    skip_whitespace(chars);
    match chars.peek().copied() {
        Some(quote @ ('"' | '\'')) => {
            chars.next();
            let mut value = String::new();
            loop {
                let c = chars.next()?;
                if c == quote {
                    return Some(value);
                }
                value.push(c);
            }
        },
        Some(_) => Some(take_ident(chars)),
        None => None,
    }
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
}
