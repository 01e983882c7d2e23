//! In-memory representation of a parsed diff document.
//!
//! `DiffDocument::from_tree` walks the element children of the `<diff>` root
//! and produces typed operations. Attribute values are normalized here (`pos`
//! and `ws` fall back to their defaults, `type` is resolved to an
//! `AddTarget`); selectors stay as strings because they must be resolved
//! lazily, against the base tree as it stands when each operation executes.

use crate::error::{Error, Result};
use crate::node::{NodeRef, XmlElement};

use super::{
    DIFF_ADD_TAG, DIFF_POS_ATTR, DIFF_REMOVE_TAG, DIFF_REPLACE_TAG, DIFF_ROOT_TAG, DIFF_SEL_ATTR,
    DIFF_TYPE_ATTR, DIFF_WS_ATTR, POS_AFTER, POS_APPEND, POS_BEFORE, TYPE_ATTRIBUTE_PREFIX,
    TYPE_NAMESPACE_PREFIX, WS_AFTER, WS_BEFORE,
};

/// Where an `add` operation inserts content relative to its target.
///
/// `Prepend` is the nominal default but collapses to the same behavior as
/// `Append`: content becomes the target's last children. Only `Before` and
/// `After` place content as siblings of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Default bucket; appends as the target's last children.
    Prepend,
    /// Explicit `append`; same behavior as the default bucket.
    Append,
    /// Insert immediately before the target, as its sibling.
    Before,
    /// Insert immediately after the target, as its sibling.
    After,
}

impl InsertPosition {
    fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some(POS_BEFORE) => InsertPosition::Before,
            Some(POS_AFTER) => InsertPosition::After,
            Some(POS_APPEND) => InsertPosition::Append,
            _ => InsertPosition::Prepend,
        }
    }
}

/// What an `add` operation creates, derived from its `type` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddTarget {
    /// No `type`: insert the operation's child nodes as elements.
    Child,
    /// `type="@name"`: create attribute `name` on the target.
    Attribute(String),
    /// `type="namespace::prefix"`: create attribute `xmlns:prefix`.
    Namespace(String),
}

impl AddTarget {
    fn from_attr(value: Option<&str>) -> Result<Self> {
        match value {
            None => Ok(AddTarget::Child),
            Some(v) => {
                if let Some(name) = v.strip_prefix(TYPE_ATTRIBUTE_PREFIX) {
                    Ok(AddTarget::Attribute(name.to_string()))
                } else if let Some(prefix) = v.strip_prefix(TYPE_NAMESPACE_PREFIX) {
                    Ok(AddTarget::Namespace(prefix.to_string()))
                } else {
                    Err(Error::UnsupportedAddType(v.to_string()))
                }
            }
        }
    }
}

/// Whitespace policy of a `remove` operation.
///
/// Only `Both` has an observable effect: it collapses a parent left childless
/// back to its self-closing form. `Before` and `After` exist to name which
/// adjacent whitespace run would also be dropped, but whitespace-only text
/// nodes are not modeled, so they change nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhitespacePolicy {
    /// `ws="before"`.
    Before,
    /// `ws="after"`.
    After,
    /// Default; any unrecognized value normalizes here.
    Both,
}

impl WhitespacePolicy {
    fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some(WS_BEFORE) => WhitespacePolicy::Before,
            Some(WS_AFTER) => WhitespacePolicy::After,
            _ => WhitespacePolicy::Both,
        }
    }
}

/// Policy for top-level diff elements that are not `add`/`remove`/`replace`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownOpPolicy {
    /// Skip silently (observed reference behavior).
    #[default]
    Ignore,
    /// Abort with `Error::UnknownOperation`.
    Fail,
}

/// One patch operation, in the order it appears in the diff document.
///
/// `content` nodes are handles into the diff tree; they are deep-copied into
/// the base tree at execution time, never spliced by reference.
#[derive(Debug, Clone)]
pub enum DiffOperation {
    /// Insert elements or create an attribute at the selected target.
    Add {
        /// Path selector for the target node.
        sel: String,
        /// Insertion position for element content.
        position: InsertPosition,
        /// Element insertion vs. attribute/namespace creation.
        target: AddTarget,
        /// The operation element's children.
        content: Vec<NodeRef>,
    },
    /// Remove the selected element or attribute.
    Remove {
        /// Path selector for the target.
        sel: String,
        /// Whitespace handling for the emptied parent.
        ws: WhitespacePolicy,
    },
    /// Replace the selected element with new content, or rewrite an
    /// attribute's value.
    Replace {
        /// Path selector for the target.
        sel: String,
        /// The operation element's children.
        content: Vec<NodeRef>,
    },
}

impl DiffOperation {
    /// Returns the operation's path selector.
    pub fn sel(&self) -> &str {
        match self {
            DiffOperation::Add { sel, .. }
            | DiffOperation::Remove { sel, .. }
            | DiffOperation::Replace { sel, .. } => sel,
        }
    }
}

/// An ordered sequence of diff operations parsed from a diff tree.
#[derive(Debug, Clone)]
pub struct DiffDocument {
    operations: Vec<DiffOperation>,
}

impl DiffDocument {
    /// Builds the diff model from a parsed diff tree.
    ///
    /// The tree's document node must contain a `<diff>` element; its element
    /// children become operations in document order. Non-element children are
    /// skipped; unrecognized element names follow `unknown_ops`.
    pub fn from_tree(diff: &NodeRef, unknown_ops: UnknownOpPolicy) -> Result<Self> {
        let diff_root = {
            let borrowed = diff.borrow();
            borrowed
                .children()
                .iter()
                .find(|c| c.borrow().element().is_some_and(|e| e.qname() == DIFF_ROOT_TAG))
                .cloned()
                .ok_or_else(|| {
                    Error::MalformedDiff(format!("missing <{}> root element", DIFF_ROOT_TAG))
                })?
        };

        let mut operations = Vec::new();
        let children: Vec<NodeRef> = diff_root.borrow().children().to_vec();
        for child in children {
            let borrowed = child.borrow();
            let Some(element) = borrowed.element() else {
                continue;
            };

            match element.qname() {
                DIFF_ADD_TAG => operations.push(DiffOperation::Add {
                    sel: required_sel(element)?,
                    position: InsertPosition::from_attr(element.attr(DIFF_POS_ATTR)),
                    target: AddTarget::from_attr(element.attr(DIFF_TYPE_ATTR))?,
                    content: borrowed.children().to_vec(),
                }),
                DIFF_REMOVE_TAG => operations.push(DiffOperation::Remove {
                    sel: required_sel(element)?,
                    ws: WhitespacePolicy::from_attr(element.attr(DIFF_WS_ATTR)),
                }),
                DIFF_REPLACE_TAG => operations.push(DiffOperation::Replace {
                    sel: required_sel(element)?,
                    content: borrowed.children().to_vec(),
                }),
                other => match unknown_ops {
                    UnknownOpPolicy::Ignore => {}
                    UnknownOpPolicy::Fail => {
                        return Err(Error::UnknownOperation(other.to_string()));
                    }
                },
            }
        }

        Ok(DiffDocument { operations })
    }

    /// Returns the operations in execution order.
    pub fn operations(&self) -> &[DiffOperation] {
        &self.operations
    }
}

fn required_sel(element: &XmlElement) -> Result<String> {
    element
        .attr(DIFF_SEL_ATTR)
        .map(str::to_string)
        .ok_or_else(|| {
            Error::MalformedDiff(format!(
                "missing {} attribute on <{}>",
                DIFF_SEL_ATTR,
                element.qname()
            ))
        })
}
