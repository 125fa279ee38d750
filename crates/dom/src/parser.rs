//! Markup fragment parser
//!
//! A practical tokenizer and tree builder for trusted, compiler-produced
//! markup. It is not the full HTML5 state machine: there are no implied end
//! tags, no adoption agency and no foster parenting. What it does honour:
//!
//! - void HTML elements and raw text (`script`, `style`) / escapable raw
//!   text (`textarea`) content
//! - `svg` and `math` switching into foreign content, SVG HTML integration
//!   points (`foreignObject`, `desc`, `title`) and MathML text integration
//!   points switching back to HTML
//! - self-closing syntax in foreign content, case folding only for HTML names
//! - end tags close the nearest matching open element, stray ones are dropped
//! - `<template>` children land in the template's content fragment

use crate::arena::DomArena;
use crate::entities::decode_entities;
use crate::error::Result;
use crate::types::{is_void_element, Attribute, DomNode, Namespace, NodeId, NodeType};
use memchr::memchr;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";
const CDATA_START: &str = "<![CDATA[";
const CDATA_END: &str = "]]>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Doctype(String),
    StartTag {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    EndTag(String),
    Comment(String),
    Text(String),
}

/// Content model of an element's body as far as the tokenizer is concerned
enum TextMode {
    RawText,
    EscapableRawText,
}

fn text_mode(name: &str) -> Option<TextMode> {
    if name.eq_ignore_ascii_case("script") || name.eq_ignore_ascii_case("style") {
        Some(TextMode::RawText)
    } else if name.eq_ignore_ascii_case("textarea") {
        Some(TextMode::EscapableRawText)
    } else {
        None
    }
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b':' || c == b'.'
}

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack.len() >= start + needle.len()
        && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

/// Find `</name` followed by whitespace, `/` or `>`; returns (start, end after `>`)
fn find_close_tag(input: &str, from: usize, name: &str) -> Option<(usize, usize)> {
    let bytes = input.as_bytes();
    let mut i = from;
    while let Some(rel) = memchr(b'<', &bytes[i..]) {
        let lt = i + rel;
        let name_start = lt + 2;
        if bytes.get(lt + 1) == Some(&b'/')
            && starts_with_ignore_ascii_case_at(bytes, name_start, name.as_bytes())
        {
            let mut k = name_start + name.len();
            if k >= bytes.len() || matches!(bytes[k], b'>' | b'/') || bytes[k].is_ascii_whitespace()
            {
                while k < bytes.len() && bytes[k] != b'>' {
                    k += 1;
                }
                return Some((lt, (k + 1).min(bytes.len())));
            }
        }
        i = lt + 1;
    }
    None
}

/// Tokenize a markup string
pub fn tokenize(input: &str) -> Vec<Token> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut out = Vec::new();
    let mut i = 0;

    // Slices are only cut at ASCII structural bytes, so every endpoint is a
    // UTF-8 char boundary.
    while i < len {
        if bytes[i] != b'<' {
            let end = memchr(b'<', &bytes[i..]).map_or(len, |rel| i + rel);
            out.push(Token::Text(decode_entities(&input[i..end])));
            i = end;
            continue;
        }

        let rest = &input[i..];
        if rest.starts_with(COMMENT_START) {
            let body_start = i + COMMENT_START.len();
            match input[body_start..].find(COMMENT_END) {
                Some(end) => {
                    out.push(Token::Comment(input[body_start..body_start + end].to_string()));
                    i = body_start + end + COMMENT_END.len();
                }
                None => {
                    out.push(Token::Comment(input[body_start..].to_string()));
                    i = len;
                }
            }
            continue;
        }
        if rest.starts_with(CDATA_START) {
            let body_start = i + CDATA_START.len();
            let end = input[body_start..]
                .find(CDATA_END)
                .map_or(len, |e| body_start + e);
            out.push(Token::Text(input[body_start..end].to_string()));
            i = (end + CDATA_END.len()).min(len);
            continue;
        }
        if starts_with_ignore_ascii_case_at(bytes, i, b"<!doctype") {
            let end = memchr(b'>', &bytes[i..]).map_or(len, |rel| i + rel);
            out.push(Token::Doctype(input[i + 2..end].trim().to_string()));
            i = (end + 1).min(len);
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            // Bogus comment up to the next `>`
            let end = memchr(b'>', &bytes[i..]).map_or(len, |rel| i + rel);
            out.push(Token::Comment(input[i + 2..end].to_string()));
            i = (end + 1).min(len);
            continue;
        }

        if bytes.get(i + 1) == Some(&b'/') {
            let name_start = i + 2;
            let mut j = name_start;
            while j < len && is_name_char(bytes[j]) {
                j += 1;
            }
            let name = &input[name_start..j];
            let close = memchr(b'>', &bytes[j..]).map_or(len, |rel| j + rel);
            if name.is_empty() {
                // `</>` is dropped, `</ ...>` becomes a bogus comment
                if close > name_start {
                    out.push(Token::Comment(input[name_start..close].to_string()));
                }
            } else {
                out.push(Token::EndTag(name.to_string()));
            }
            i = (close + 1).min(len);
            continue;
        }

        if !bytes.get(i + 1).is_some_and(|b| b.is_ascii_alphabetic()) {
            // A lone `<` is text
            out.push(Token::Text("<".to_string()));
            i += 1;
            continue;
        }

        let name_start = i + 1;
        let mut k = name_start;
        while k < len && is_name_char(bytes[k]) {
            k += 1;
        }
        let name = input[name_start..k].to_string();
        let mut attributes: Vec<(String, String)> = Vec::new();
        let mut self_closing = false;

        loop {
            while k < len && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k >= len {
                break;
            }
            if bytes[k] == b'>' {
                k += 1;
                break;
            }
            if bytes[k] == b'/' {
                if bytes.get(k + 1) == Some(&b'>') {
                    self_closing = true;
                    k += 2;
                    break;
                }
                k += 1;
                continue;
            }

            let attr_start = k;
            while k < len
                && !bytes[k].is_ascii_whitespace()
                && !matches!(bytes[k], b'=' | b'>' | b'/')
            {
                k += 1;
            }
            if attr_start == k {
                k += 1;
                continue;
            }
            let attr_name = input[attr_start..k].to_string();

            while k < len && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            let mut value = String::new();
            if k < len && bytes[k] == b'=' {
                k += 1;
                while k < len && bytes[k].is_ascii_whitespace() {
                    k += 1;
                }
                if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
                    let quote = bytes[k];
                    let value_start = k + 1;
                    let value_end = memchr(quote, &bytes[value_start..])
                        .map_or(len, |rel| value_start + rel);
                    value = decode_entities(&input[value_start..value_end]);
                    k = (value_end + 1).min(len);
                } else {
                    let value_start = k;
                    while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                        k += 1;
                    }
                    value = decode_entities(&input[value_start..k]);
                }
            }
            attributes.push((attr_name, value));
        }

        let mode = if self_closing { None } else { text_mode(&name) };
        out.push(Token::StartTag {
            name: name.clone(),
            attributes,
            self_closing,
        });
        i = k;

        if let Some(mode) = mode {
            let (body_end, next) = find_close_tag(input, i, &name).unwrap_or((len, len));
            let body = &input[i..body_end];
            if !body.is_empty() {
                out.push(Token::Text(match mode {
                    TextMode::RawText => body.to_string(),
                    TextMode::EscapableRawText => decode_entities(body),
                }));
            }
            out.push(Token::EndTag(name));
            i = next;
        }
    }

    out
}

/// Namespace a start tag named `name` gets when opened under `parent`
fn child_namespace(parent: &DomNode, name: &str) -> Namespace {
    let html_rules = || {
        if name.eq_ignore_ascii_case("svg") {
            Namespace::Svg
        } else if name.eq_ignore_ascii_case("math") {
            Namespace::MathMl
        } else {
            Namespace::Html
        }
    };

    if !parent.is_element() {
        return html_rules();
    }
    match parent.namespace {
        Namespace::Html => html_rules(),
        // HTML integration points
        Namespace::Svg => match parent.node_name.as_str() {
            "foreignObject" | "desc" | "title" => html_rules(),
            _ => Namespace::Svg,
        },
        Namespace::MathMl => match parent.node_name.as_str() {
            "annotation-xml" if name.eq_ignore_ascii_case("svg") => Namespace::Svg,
            "mi" | "mo" | "mn" | "ms" | "mtext" if !matches!(name, "mglyph" | "malignmark") => {
                html_rules()
            }
            _ => Namespace::MathMl,
        },
    }
}

struct OpenElement {
    element: NodeId,
    /// Where children go (the content fragment for templates)
    target: NodeId,
}

fn link(arena: &mut DomArena, parent: NodeId, child: NodeId) -> Result<()> {
    arena.get_mut(child)?.parent_id = Some(parent);
    arena.get_mut(parent)?.children_ids.push(child);
    Ok(())
}

fn append_text(arena: &mut DomArena, parent: NodeId, text: &str) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    let last = arena.get(parent)?.children_ids.last().copied();
    if let Some(last) = last {
        let last = arena.get_mut(last)?;
        if last.is_text() {
            last.node_value.push_str(text);
            return Ok(());
        }
    }
    let mut node = DomNode::new(0, NodeType::Text, "#text");
    node.node_value = text.to_string();
    let id = arena.add_node(node);
    link(arena, parent, id)
}

/// Parse `markup` and append the resulting nodes to `container`
///
/// Existing children of `container` are left alone; callers clear it first
/// when replacing content.
pub fn parse_into(arena: &mut DomArena, container: NodeId, markup: &str) -> Result<()> {
    let mut stack = vec![OpenElement {
        element: container,
        target: container,
    }];

    for token in tokenize(markup) {
        let current = match stack.last() {
            Some(open) => open.target,
            None => container,
        };

        match token {
            Token::Text(text) => append_text(arena, current, &text)?,
            Token::Comment(text) => {
                let mut node = DomNode::new(0, NodeType::Comment, "#comment");
                node.node_value = text;
                let id = arena.add_node(node);
                link(arena, current, id)?;
            }
            // Not allowed in fragments
            Token::Doctype(_) => {}
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let namespace = {
                    // Template contents use the template element for context
                    let context = match stack.last() {
                        Some(open) => open.element,
                        None => container,
                    };
                    child_namespace(arena.get(context)?, &name)
                };
                let html = namespace == Namespace::Html;
                let name = if html { name.to_ascii_lowercase() } else { name };

                let mut node = DomNode::new(0, NodeType::Element, name.clone());
                node.namespace = namespace;
                for (attr_name, value) in attributes {
                    let attr_name = if html {
                        attr_name.to_ascii_lowercase()
                    } else {
                        attr_name
                    };
                    // First occurrence wins
                    if node.attr(&attr_name).is_none() {
                        node.attributes.push(Attribute {
                            name: attr_name,
                            value,
                        });
                    }
                }
                let id = arena.add_node(node);
                link(arena, current, id)?;

                let mut target = id;
                if html && name == "template" {
                    let content = arena.add_node(DomNode::fragment());
                    arena.get_mut(id)?.template_content = Some(content);
                    target = content;
                }

                let closes = (html && is_void_element(&name)) || (self_closing && !html);
                if !closes {
                    stack.push(OpenElement {
                        element: id,
                        target,
                    });
                }
            }
            Token::EndTag(name) => {
                let mut matched = None;
                for (pos, open) in stack.iter().enumerate().skip(1).rev() {
                    let node = arena.get(open.element)?;
                    let matches = if node.namespace == Namespace::Html {
                        node.node_name.eq_ignore_ascii_case(&name)
                    } else {
                        node.node_name == name
                    };
                    if matches {
                        matched = Some(pos);
                        break;
                    }
                }
                if let Some(pos) = matched {
                    stack.truncate(pos);
                }
            }
        }
    }

    Ok(())
}
