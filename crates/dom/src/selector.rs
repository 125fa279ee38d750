//! Minimal CSS selector engine for document-level queries
//!
//! Grammar:
//!
//! ```text
//! list      := complex ("," complex)*
//! complex   := compound (combinator compound)*
//! combinator:= whitespace | ">"
//! compound  := (type | "*")? (("#" ident) | ("." ident) | attr)*
//! attr      := "[" ident ("=" (ident | quoted))? "]"
//! ```

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::{DomNode, Namespace};

#[derive(Debug, Clone, PartialEq, Eq)]
enum SimpleSelector {
    Type(String),
    Universal,
    Id(String),
    Class(String),
    Attribute { name: String, value: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Compound(Vec<SimpleSelector>);

/// Compounds stored right-to-left; `combinators[i]` joins `compounds[i]` to `compounds[i + 1]`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(Vec<Complex>);

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

struct Parser<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn invalid(&self) -> DomError {
        DomError::InvalidSelector(self.source.to_string())
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
            skipped = true;
        }
        skipped
    }

    fn ident(&mut self) -> Result<String> {
        let mut out = String::new();
        while let Some(&c) = self.chars.peek() {
            if !is_ident_char(c) {
                break;
            }
            out.push(c);
            self.chars.next();
        }
        if out.is_empty() {
            return Err(self.invalid());
        }
        Ok(out)
    }

    fn attribute(&mut self) -> Result<SimpleSelector> {
        self.skip_whitespace();
        let name = self.ident()?;
        self.skip_whitespace();
        let value = match self.chars.next() {
            Some(']') => return Ok(SimpleSelector::Attribute { name, value: None }),
            Some('=') => {
                self.skip_whitespace();
                match self.chars.peek().copied() {
                    Some(quote @ ('"' | '\'')) => {
                        self.chars.next();
                        let mut value = String::new();
                        loop {
                            match self.chars.next() {
                                Some(c) if c == quote => break,
                                Some(c) => value.push(c),
                                None => return Err(self.invalid()),
                            }
                        }
                        value
                    }
                    _ => self.ident()?,
                }
            }
            _ => return Err(self.invalid()),
        };
        self.skip_whitespace();
        match self.chars.next() {
            Some(']') => Ok(SimpleSelector::Attribute {
                name,
                value: Some(value),
            }),
            _ => Err(self.invalid()),
        }
    }

    fn compound(&mut self) -> Result<Compound> {
        let mut parts = Vec::new();
        match self.chars.peek() {
            Some('*') => {
                self.chars.next();
                parts.push(SimpleSelector::Universal);
            }
            Some(&c) if is_ident_char(c) => parts.push(SimpleSelector::Type(self.ident()?)),
            _ => {}
        }
        loop {
            match self.chars.peek() {
                Some('#') => {
                    self.chars.next();
                    parts.push(SimpleSelector::Id(self.ident()?));
                }
                Some('.') => {
                    self.chars.next();
                    parts.push(SimpleSelector::Class(self.ident()?));
                }
                Some('[') => {
                    self.chars.next();
                    parts.push(self.attribute()?);
                }
                _ => break,
            }
        }
        if parts.is_empty() {
            return Err(self.invalid());
        }
        Ok(Compound(parts))
    }

    fn complex(&mut self) -> Result<Complex> {
        self.skip_whitespace();
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_space = self.skip_whitespace();
            match self.chars.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.chars.next();
                    self.skip_whitespace();
                    combinators.push(Combinator::Child);
                }
                Some(_) if had_space => combinators.push(Combinator::Descendant),
                Some(_) => return Err(self.invalid()),
            }
            compounds.push(self.compound()?);
        }
        compounds.reverse();
        combinators.reverse();
        Ok(Complex {
            compounds,
            combinators,
        })
    }
}

impl SelectorList {
    pub fn parse(source: &str) -> Result<Self> {
        let mut parser = Parser {
            source,
            chars: source.chars().peekable(),
        };
        let mut list = vec![parser.complex()?];
        while parser.chars.next() == Some(',') {
            list.push(parser.complex()?);
        }
        if parser.chars.peek().is_some() {
            return Err(parser.invalid());
        }
        Ok(SelectorList(list))
    }

    /// Whether the element `node` matches any selector in the list
    pub fn matches(&self, arena: &DomArena, node: &DomNode) -> Result<bool> {
        if !node.is_element() {
            return Ok(false);
        }
        for complex in &self.0 {
            if complex.matches_from(arena, node, 0)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Compound {
    fn matches(&self, node: &DomNode) -> bool {
        self.0.iter().all(|simple| match simple {
            SimpleSelector::Universal => true,
            SimpleSelector::Type(name) => {
                if node.namespace == Namespace::Html {
                    node.node_name.eq_ignore_ascii_case(name)
                } else {
                    node.node_name == *name
                }
            }
            SimpleSelector::Id(id) => node.attr("id") == Some(id.as_str()),
            SimpleSelector::Class(class) => node.has_class(class),
            SimpleSelector::Attribute { name, value } => match (node.attr(name), value) {
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
                (None, _) => false,
            },
        })
    }
}

impl Complex {
    fn matches_from(&self, arena: &DomArena, node: &DomNode, index: usize) -> Result<bool> {
        if !self.compounds[index].matches(node) {
            return Ok(false);
        }
        let Some(combinator) = self.combinators.get(index) else {
            return Ok(true);
        };

        let mut ancestor = node.parent_id;
        while let Some(id) = ancestor {
            let candidate = arena.get(id)?;
            if !candidate.is_element() {
                return Ok(false);
            }
            if self.matches_from(arena, candidate, index + 1)? {
                return Ok(true);
            }
            if *combinator == Combinator::Child {
                return Ok(false);
            }
            ancestor = candidate.parent_id;
        }
        Ok(false)
    }
}
