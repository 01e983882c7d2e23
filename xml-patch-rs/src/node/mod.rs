//! Node structures for XML tree representation.
//!
//! This module provides the core node type used to represent XML documents as
//! mutable trees. Nodes are handled through reference-counted `NodeRef`
//! pointers; structural edits (insert, detach, deep copy) take and return
//! handles rather than borrowed references, so a resolved target node stays
//! valid while the tree around it is mutated.

mod xml_content;

pub use xml_content::{XmlContent, XmlElement, XmlProcessingInstruction};

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating unique node IDs.
static NODE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generates a unique node ID.
fn next_node_id() -> u64 {
    NODE_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A reference-counted pointer to a node.
pub type NodeRef = Rc<RefCell<NodeInner>>;

/// Creates a new node with the given content.
///
/// `None` content marks the synthetic document node that parents the root
/// element (and any top-level comments or processing instructions).
pub fn new_node(content: Option<XmlContent>) -> NodeRef {
    Rc::new(RefCell::new(NodeInner {
        id: next_node_id(),
        children: Vec::new(),
        content,
        parent: Weak::new(),
        child_pos: -1,
    }))
}

/// The inner data of a node in the tree.
///
/// Each node has:
/// - 0 or more children
/// - XML content (element, text, comment, PI), or none for the document node
/// - A parent (except for the document node and detached nodes)
/// - A position among siblings
#[derive(Debug)]
pub struct NodeInner {
    /// Unique identifier for this node.
    id: u64,
    /// Child nodes.
    children: Vec<NodeRef>,
    /// XML content of this node.
    content: Option<XmlContent>,
    /// Weak reference to parent node.
    parent: Weak<RefCell<NodeInner>>,
    /// Zero-based position among siblings (-1 when detached).
    child_pos: i32,
}

impl NodeInner {
    /// Returns the unique ID of this node.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the content of this node.
    pub fn content(&self) -> Option<&XmlContent> {
        self.content.as_ref()
    }

    /// Returns a mutable reference to the content.
    pub fn content_mut(&mut self) -> Option<&mut XmlContent> {
        self.content.as_mut()
    }

    /// Returns true if this node is the synthetic document node.
    pub fn is_document(&self) -> bool {
        self.content.is_none()
    }

    /// Returns true if this node is an element.
    pub fn is_element(&self) -> bool {
        matches!(self.content, Some(XmlContent::Element(_)))
    }

    /// Returns the element content, if this node is an element.
    pub fn element(&self) -> Option<&XmlElement> {
        self.content.as_ref().and_then(XmlContent::as_element)
    }

    /// Returns the mutable element content, if this node is an element.
    pub fn element_mut(&mut self) -> Option<&mut XmlElement> {
        self.content.as_mut().and_then(XmlContent::as_element_mut)
    }

    /// Returns the number of children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Returns the children as a slice.
    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    /// Returns a weak reference to the parent.
    pub fn parent(&self) -> &Weak<RefCell<NodeInner>> {
        &self.parent
    }

    /// Returns the child position (0-based index among siblings, -1 when detached).
    pub fn child_pos(&self) -> i32 {
        self.child_pos
    }
}

/// Helper functions that work with NodeRef.
impl NodeInner {
    /// Appends a child node. Must be called on the NodeRef wrapper.
    pub fn add_child_to_ref(parent_ref: &NodeRef, child_ref: NodeRef) {
        {
            let mut child = child_ref.borrow_mut();
            child.parent = Rc::downgrade(parent_ref);
            child.child_pos = parent_ref.borrow().children.len() as i32;
        }
        let mut parent = parent_ref.borrow_mut();
        parent.children.push(child_ref);
        // An element that gains a child no longer serializes self-closed.
        if let Some(elem) = parent.element_mut() {
            elem.set_self_closing(false);
        }
    }

    /// Inserts a child at the given index.
    pub fn add_child_at_to_ref(parent_ref: &NodeRef, index: usize, child_ref: NodeRef) {
        {
            let mut child = child_ref.borrow_mut();
            child.parent = Rc::downgrade(parent_ref);
            child.child_pos = index as i32;
        }
        let mut parent = parent_ref.borrow_mut();
        parent.children.insert(index, child_ref);
        for i in (index + 1)..parent.children.len() {
            parent.children[i].borrow_mut().child_pos = i as i32;
        }
        if let Some(elem) = parent.element_mut() {
            elem.set_self_closing(false);
        }
    }

    /// Removes the child at the given index.
    pub fn remove_child_to_ref(parent_ref: &NodeRef, index: usize) {
        let removed = {
            let mut parent = parent_ref.borrow_mut();
            if index >= parent.children.len() {
                return;
            }
            let removed = parent.children.remove(index);
            for i in index..parent.children.len() {
                parent.children[i].borrow_mut().child_pos = i as i32;
            }
            removed
        };
        let mut child = removed.borrow_mut();
        child.parent = Weak::new();
        child.child_pos = -1;
    }

    /// Detaches a node from its parent, returning the parent handle.
    ///
    /// Returns `None` if the node has no live parent.
    pub fn detach_from_parent(node_ref: &NodeRef) -> Option<NodeRef> {
        let (parent, index) = {
            let node = node_ref.borrow();
            let parent = node.parent.upgrade()?;
            (parent, node.child_pos)
        };
        if index < 0 {
            return None;
        }
        Self::remove_child_to_ref(&parent, index as usize);
        Some(parent)
    }

    /// Deep-copies a node and its descendants into fresh nodes.
    ///
    /// This is the import operation: content taken from one document must be
    /// cloned into new handles before insertion into another, so the source
    /// tree is never spliced by reference.
    pub fn deep_copy(node_ref: &NodeRef) -> NodeRef {
        let (content, children) = {
            let node = node_ref.borrow();
            (node.content.clone(), node.children.to_vec())
        };
        let copy = new_node(content);
        for child in children {
            let child_copy = Self::deep_copy(&child);
            Self::add_child_to_ref(&copy, child_copy);
        }
        copy
    }
}
