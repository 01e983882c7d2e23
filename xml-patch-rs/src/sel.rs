//! Path selector resolution.
//!
//! Implements the XPath 1.0 subset needed to address diff operations:
//! absolute child paths (`/a/b`), wildcards (`/a/*`), descendant steps
//! (`//b`), positional predicates (`/a/b[2]`), attribute-equality predicates
//! (`/a/b[@id='x']`) and a final attribute step (`/a/@x`).
//!
//! Evaluation starts at the synthetic document node and returns matches in
//! document order; callers act on the first match only.

use crate::error::{Error, Result};
use crate::node::NodeRef;

/// What a selector resolved to: a tree node or an attribute of an element.
#[derive(Debug, Clone)]
pub enum Target {
    /// A matched tree node.
    Node(NodeRef),
    /// A matched attribute, identified by its owning element and name.
    Attribute {
        /// The element holding the attribute.
        owner: NodeRef,
        /// The attribute's qualified name.
        name: String,
    },
}

/// One location step of a parsed selector.
#[derive(Debug, Clone)]
struct Step {
    /// True for `//name`: search all descendants instead of direct children.
    descendant: bool,
    test: NodeTest,
    predicates: Vec<Predicate>,
}

#[derive(Debug, Clone)]
enum NodeTest {
    Name(String),
    Wildcard,
    Attribute(String),
}

#[derive(Debug, Clone)]
enum Predicate {
    /// 1-based position among the matched children of one context node.
    Position(usize),
    /// `[@name='value']`
    AttrEquals(String, String),
}

/// Resolves a selector against a document, returning the first match in
/// document order, or `None` if nothing matches.
pub fn select_first(doc: &NodeRef, selector: &str) -> Result<Option<Target>> {
    let steps = parse(selector)?;

    let mut current: Vec<NodeRef> = vec![doc.clone()];
    for (i, step) in steps.iter().enumerate() {
        if let NodeTest::Attribute(name) = &step.test {
            if i + 1 != steps.len() {
                return Err(Error::Selector(format!(
                    "attribute step must be last: {}",
                    selector
                )));
            }
            for node in &current {
                let has_attr = node
                    .borrow()
                    .element()
                    .is_some_and(|e| e.attr(name).is_some());
                if has_attr {
                    return Ok(Some(Target::Attribute {
                        owner: node.clone(),
                        name: name.clone(),
                    }));
                }
            }
            return Ok(None);
        }

        let mut next = Vec::new();
        for ctx in &current {
            let candidates = if step.descendant {
                collect_descendants(ctx)
            } else {
                ctx.borrow().children().to_vec()
            };

            let mut matched: Vec<NodeRef> = candidates
                .into_iter()
                .filter(|n| test_matches(&step.test, n))
                .collect();

            for predicate in &step.predicates {
                matched = apply_predicate(predicate, matched);
            }

            next.extend(matched);
        }
        current = next;
        if current.is_empty() {
            return Ok(None);
        }
    }

    Ok(current.into_iter().next().map(Target::Node))
}

fn test_matches(test: &NodeTest, node: &NodeRef) -> bool {
    let borrowed = node.borrow();
    match (test, borrowed.element()) {
        (NodeTest::Wildcard, Some(_)) => true,
        (NodeTest::Name(name), Some(elem)) => elem.qname() == name,
        _ => false,
    }
}

fn apply_predicate(predicate: &Predicate, matched: Vec<NodeRef>) -> Vec<NodeRef> {
    match predicate {
        Predicate::Position(n) => matched.into_iter().skip(n - 1).take(1).collect(),
        Predicate::AttrEquals(name, value) => matched
            .into_iter()
            .filter(|node| {
                node.borrow()
                    .element()
                    .is_some_and(|e| e.attr(name) == Some(value.as_str()))
            })
            .collect(),
    }
}

/// Collects all descendants of a node in document (pre-order) order.
fn collect_descendants(node: &NodeRef) -> Vec<NodeRef> {
    let mut out = Vec::new();
    fn walk(node: &NodeRef, out: &mut Vec<NodeRef>) {
        for child in node.borrow().children() {
            out.push(child.clone());
            walk(child, out);
        }
    }
    walk(node, &mut out);
    out
}

/// Parses a selector expression into location steps.
fn parse(selector: &str) -> Result<Vec<Step>> {
    let s = selector.trim();
    if s.is_empty() {
        return Err(Error::Selector("empty selector".to_string()));
    }

    let mut steps = Vec::new();
    for raw in split_steps(s)? {
        if raw.text.is_empty() {
            return Err(Error::Selector(format!("empty step in: {}", selector)));
        }
        steps.push(parse_step(&raw, selector)?);
    }
    Ok(steps)
}

/// A step's raw text plus whether it was preceded by `//`.
struct RawStep {
    text: String,
    descendant: bool,
}

/// Splits a selector on `/` at bracket depth zero, honoring quoted strings.
fn split_steps(s: &str) -> Result<Vec<RawStep>> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut descendant = false;
    // A leading `/` (absolute path) just anchors at the document node, which
    // is where evaluation starts anyway.
    let mut chars = s.strip_prefix('/').unwrap_or(s).chars().peekable();

    if s.starts_with("//") {
        descendant = true;
        chars.next();
    }

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' if quote == Some(c) => {
                quote = None;
                buf.push(c);
            }
            '\'' | '"' if quote.is_none() && depth > 0 => {
                quote = Some(c);
                buf.push(c);
            }
            '[' if quote.is_none() => {
                depth += 1;
                buf.push(c);
            }
            ']' if quote.is_none() => {
                if depth == 0 {
                    return Err(Error::Selector(format!("unbalanced ']' in: {}", s)));
                }
                depth -= 1;
                buf.push(c);
            }
            '/' if quote.is_none() && depth == 0 => {
                out.push(RawStep {
                    text: std::mem::take(&mut buf),
                    descendant,
                });
                descendant = false;
                if chars.peek() == Some(&'/') {
                    chars.next();
                    descendant = true;
                }
            }
            _ => buf.push(c),
        }
    }

    if depth != 0 || quote.is_some() {
        return Err(Error::Selector(format!("unterminated predicate in: {}", s)));
    }
    out.push(RawStep {
        text: buf,
        descendant,
    });
    Ok(out)
}

fn parse_step(raw: &RawStep, selector: &str) -> Result<Step> {
    let text = raw.text.as_str();

    if let Some(attr_name) = text.strip_prefix('@') {
        if attr_name.is_empty() || attr_name.contains('[') {
            return Err(Error::Selector(format!("bad attribute step in: {}", selector)));
        }
        return Ok(Step {
            descendant: raw.descendant,
            test: NodeTest::Attribute(attr_name.to_string()),
            predicates: Vec::new(),
        });
    }

    let (name_part, pred_part) = match text.find('[') {
        Some(pos) => (&text[..pos], &text[pos..]),
        None => (text, ""),
    };
    if name_part.is_empty() {
        return Err(Error::Selector(format!("missing node test in: {}", selector)));
    }

    let test = if name_part == "*" {
        NodeTest::Wildcard
    } else {
        NodeTest::Name(name_part.to_string())
    };

    Ok(Step {
        descendant: raw.descendant,
        test,
        predicates: parse_predicates(pred_part, selector)?,
    })
}

fn parse_predicates(mut s: &str, selector: &str) -> Result<Vec<Predicate>> {
    let mut predicates = Vec::new();
    while !s.is_empty() {
        if !s.starts_with('[') {
            return Err(Error::Selector(format!("bad predicate in: {}", selector)));
        }
        let end = find_predicate_end(s)
            .ok_or_else(|| Error::Selector(format!("unterminated predicate in: {}", selector)))?;
        let inner = s[1..end].trim();
        predicates.push(parse_predicate(inner, selector)?);
        s = &s[end + 1..];
    }
    Ok(predicates)
}

/// Finds the index of the `]` closing the predicate starting at index 0.
fn find_predicate_end(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices().skip(1) {
        match c {
            '\'' | '"' if quote == Some(c) => quote = None,
            '\'' | '"' if quote.is_none() => quote = Some(c),
            ']' if quote.is_none() => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_predicate(inner: &str, selector: &str) -> Result<Predicate> {
    if inner.chars().all(|c| c.is_ascii_digit()) && !inner.is_empty() {
        let n: usize = inner
            .parse()
            .map_err(|_| Error::Selector(format!("bad position in: {}", selector)))?;
        if n == 0 {
            return Err(Error::Selector(format!("position is 1-based: {}", selector)));
        }
        return Ok(Predicate::Position(n));
    }

    if let Some(rest) = inner.strip_prefix('@') {
        if let Some(eq) = rest.find('=') {
            let name = rest[..eq].trim();
            let value = rest[eq + 1..].trim();
            let unquoted = value
                .strip_prefix('\'')
                .and_then(|v| v.strip_suffix('\''))
                .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')));
            if let (false, Some(unquoted)) = (name.is_empty(), unquoted) {
                return Ok(Predicate::AttrEquals(name.to_string(), unquoted.to_string()));
            }
        }
    }

    Err(Error::Selector(format!(
        "unsupported predicate [{}] in: {}",
        inner, selector
    )))
}
