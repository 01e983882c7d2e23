//! Error types for XML patching.

use thiserror::Error;

/// Result type alias for patch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading documents or applying a patch.
#[derive(Error, Debug)]
pub enum Error {
    /// XML parsing error.
    #[error("XML parse error: {0}")]
    Parse(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML error from quick-xml.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A document could not be loaded from a file.
    #[error("failed to load document {path}: {reason}")]
    DocumentLoadFailed {
        /// Path of the offending document.
        path: String,
        /// Why loading failed.
        reason: String,
    },

    /// The diff document is structurally unusable (no `diff` root, missing `sel`).
    #[error("malformed diff document: {0}")]
    MalformedDiff(String),

    /// A selector expression could not be parsed.
    #[error("invalid selector: {0}")]
    Selector(String),

    /// A `sel` expression matched no node at the time it was evaluated.
    #[error("selector matched no node: {0}")]
    SelectorNotFound(String),

    /// An `add` operation carried a `type` attribute that is neither absent,
    /// `@name`, nor `namespace::prefix`.
    #[error("unsupported add type: {0}")]
    UnsupportedAddType(String),

    /// A `remove` targeted something other than an attribute or an element
    /// with an element parent.
    #[error("unsupported remove target: {0}")]
    UnsupportedRemoveTarget(String),

    /// The resolved target cannot be used with this operation.
    #[error("invalid target for operation: {0}")]
    InvalidTarget(String),

    /// An unrecognized top-level diff element, under the fail policy.
    #[error("unknown diff operation: {0}")]
    UnknownOperation(String),
}
