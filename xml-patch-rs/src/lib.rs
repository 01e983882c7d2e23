//! XML Patch - RFC 5261 style XML patching
//!
//! This library applies a declarative diff document to a base XML document.
//! A diff is a `<diff>` element containing `add`, `remove` and `replace`
//! operations, each addressed by a path selector (`sel`) evaluated against
//! the base document's current state:
//!
//! ```xml
//! <diff>
//!   <add sel="/inventory/items" pos="before"><item id="new"/></add>
//!   <replace sel="/inventory/@version">2</replace>
//!   <remove sel="/inventory/items/item[@id='old']"/>
//! </diff>
//! ```
//!
//! Operations run strictly in document order and mutate the base tree in
//! place; a later selector may address a node an earlier operation created.
//! There is no rollback: a failed run leaves the tree partially patched, so
//! callers needing atomicity should patch a private copy.
//!
//! # Example
//!
//! ```
//! use xml_patch::Patcher;
//!
//! let patched = Patcher::new()
//!     .patch_str(
//!         "<a><b/></a>",
//!         r#"<diff><add sel="/a"><c/></add></diff>"#,
//!     )
//!     .unwrap();
//! assert_eq!(patched, "<a><b/><c/></a>");
//! ```

pub mod error;
pub mod node;
pub mod patch;
pub mod sel;
pub mod xml;

pub use error::{Error, Result};
pub use node::{new_node, NodeInner, NodeRef, XmlContent, XmlElement, XmlProcessingInstruction};
pub use patch::{
    AddTarget, DiffDocument, DiffOperation, InsertPosition, PatchOptions, Patcher, UnknownOpPolicy,
    WhitespacePolicy,
};
pub use sel::{select_first, Target};
pub use xml::{parse_file, parse_str, print_to_string, XmlPrinter, XmlPrinterOptions};
