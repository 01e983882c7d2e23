//! Patch application.
//!
//! `Patcher` walks the diff model in document order. Each operation's
//! selector is resolved against the base tree as already mutated by the
//! operations before it, so a later selector may address a node an earlier
//! operation created. The base tree is edited in place; a failure aborts the
//! run and leaves the tree in whatever state it reached.

use std::path::Path;

use crate::error::{Error, Result};
use crate::node::{NodeInner, NodeRef, XmlContent};
use crate::sel::{select_first, Target};
use crate::xml::{parse_file, parse_str, print_to_string};

use super::diff_model::{
    AddTarget, DiffDocument, DiffOperation, InsertPosition, UnknownOpPolicy, WhitespacePolicy,
};

/// Options controlling patch application.
#[derive(Debug, Clone, Default)]
pub struct PatchOptions {
    /// How to treat unrecognized top-level diff elements.
    pub unknown_ops: UnknownOpPolicy,
}

/// Applies diff documents to base trees.
pub struct Patcher {
    options: PatchOptions,
}

impl Default for Patcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Patcher {
    /// Creates a patcher with default options.
    pub fn new() -> Self {
        Patcher {
            options: PatchOptions::default(),
        }
    }

    /// Creates a patcher with the given options.
    pub fn with_options(options: PatchOptions) -> Self {
        Patcher { options }
    }

    /// Applies a diff tree to a base tree, mutating the base in place.
    pub fn patch(&self, base: &NodeRef, diff: &NodeRef) -> Result<()> {
        let model = DiffDocument::from_tree(diff, self.options.unknown_ops)?;
        for op in model.operations() {
            self.apply(base, op)?;
        }
        Ok(())
    }

    /// Parses base and diff from strings, patches, and serializes the result.
    pub fn patch_str(&self, base: &str, diff: &str) -> Result<String> {
        let base_tree = parse_str(base)?;
        let diff_tree = parse_str(diff)?;
        self.patch(&base_tree, &diff_tree)?;
        print_to_string(&base_tree)
    }

    /// Loads base and diff from files and returns the patched base tree.
    pub fn patch_files<P: AsRef<Path>>(&self, base: P, diff: P) -> Result<NodeRef> {
        let base_tree = load_document(base)?;
        let diff_tree = load_document(diff)?;
        self.patch(&base_tree, &diff_tree)?;
        Ok(base_tree)
    }

    /// Resolves one operation's selector and dispatches to its handler.
    fn apply(&self, base: &NodeRef, op: &DiffOperation) -> Result<()> {
        let target = select_first(base, op.sel())?
            .ok_or_else(|| Error::SelectorNotFound(op.sel().to_string()))?;

        match op {
            DiffOperation::Add {
                sel,
                position,
                target: add_target,
                content,
            } => self.apply_add(sel, target, *position, add_target, content),
            DiffOperation::Remove { sel, ws } => self.apply_remove(sel, target, *ws),
            DiffOperation::Replace { sel, content } => self.apply_replace(sel, target, content),
        }
    }

    /// Inserts element content or creates an attribute at the target.
    fn apply_add(
        &self,
        sel: &str,
        target: Target,
        position: InsertPosition,
        add_target: &AddTarget,
        content: &[NodeRef],
    ) -> Result<()> {
        let node = match target {
            Target::Node(node) => node,
            Target::Attribute { .. } => {
                return Err(Error::InvalidTarget(format!(
                    "add cannot target an attribute: {}",
                    sel
                )));
            }
        };

        match add_target {
            AddTarget::Child => match position {
                InsertPosition::Before | InsertPosition::After => {
                    let parent = node.borrow().parent().upgrade().ok_or_else(|| {
                        Error::InvalidTarget(format!("target has no parent: {}", sel))
                    })?;
                    for (i, diff_child) in content.iter().enumerate() {
                        let import = NodeInner::deep_copy(diff_child);
                        let target_pos = node.borrow().child_pos() as usize;
                        let index = match position {
                            // Earlier insertions shift the target right, so
                            // re-reading its position keeps content in order.
                            InsertPosition::Before => target_pos,
                            _ => target_pos + 1 + i,
                        };
                        NodeInner::add_child_at_to_ref(&parent, index, import);
                    }
                }
                InsertPosition::Prepend | InsertPosition::Append => {
                    for diff_child in content {
                        let import = NodeInner::deep_copy(diff_child);
                        NodeInner::add_child_to_ref(&node, import);
                    }
                }
            },
            AddTarget::Attribute(name) => {
                set_attribute(&node, sel, name, &inner_text(content))?;
            }
            AddTarget::Namespace(prefix) => {
                let name = format!("xmlns:{}", prefix);
                set_attribute(&node, sel, &name, &inner_text(content))?;
            }
        }

        Ok(())
    }

    /// Detaches the target element or removes the target attribute.
    fn apply_remove(&self, sel: &str, target: Target, ws: WhitespacePolicy) -> Result<()> {
        match target {
            Target::Node(node) => {
                let parent = node.borrow().parent().upgrade();
                let removable = node.borrow().is_element()
                    && parent.as_ref().is_some_and(|p| p.borrow().is_element());
                let Some(parent) = parent.filter(|_| removable) else {
                    return Err(Error::UnsupportedRemoveTarget(sel.to_string()));
                };

                NodeInner::detach_from_parent(&node);

                // Only the default policy collapses an emptied parent back to
                // its self-closing form.
                let emptied = parent.borrow().child_count() == 0;
                if let Some(elem) = parent.borrow_mut().element_mut() {
                    elem.set_self_closing(ws == WhitespacePolicy::Both && emptied);
                }
                Ok(())
            }
            Target::Attribute { owner, name } => {
                if let Some(elem) = owner.borrow_mut().element_mut() {
                    elem.remove_attr(&name);
                }
                Ok(())
            }
        }
    }

    /// Replaces the target element with new content, or rewrites an
    /// attribute's value.
    fn apply_replace(&self, sel: &str, target: Target, content: &[NodeRef]) -> Result<()> {
        match target {
            Target::Attribute { owner, name } => set_attribute(&owner, sel, &name, &inner_text(content)),
            Target::Node(node) => {
                let parent = node.borrow().parent().upgrade().ok_or_else(|| {
                    Error::InvalidTarget(format!("target has no parent: {}", sel))
                })?;

                let target_pos = node.borrow().child_pos() as usize;
                for (i, diff_child) in content.iter().enumerate() {
                    let import = NodeInner::deep_copy(diff_child);
                    NodeInner::add_child_at_to_ref(&parent, target_pos + 1 + i, import);
                }
                NodeInner::detach_from_parent(&node);
                Ok(())
            }
        }
    }
}

/// Loads an XML document, mapping failures to `DocumentLoadFailed`.
fn load_document<P: AsRef<Path>>(path: P) -> Result<NodeRef> {
    let path = path.as_ref();
    parse_file(path).map_err(|e| Error::DocumentLoadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Sets an attribute on an element node.
fn set_attribute(node: &NodeRef, sel: &str, name: &str, value: &str) -> Result<()> {
    let mut borrowed = node.borrow_mut();
    match borrowed.element_mut() {
        Some(elem) => {
            elem.set_attr(name, value);
            Ok(())
        }
        None => Err(Error::InvalidTarget(format!(
            "attribute target is not an element: {}",
            sel
        ))),
    }
}

/// Concatenates the text children of a diff operation.
///
/// Attribute values come from the operation's raw inner text; they are never
/// re-parsed as markup.
fn inner_text(content: &[NodeRef]) -> String {
    let mut out = String::new();
    for node in content {
        if let Some(XmlContent::Text(text)) = node.borrow().content() {
            out.push_str(text);
        }
    }
    out
}
