//! XML parsing and output.
//!
//! The parser configuration is fixed: DOCTYPE and external entities are never
//! processed, and whitespace-only text nodes are dropped. The printer emits
//! compact output so patched documents serialize deterministically.

mod parser;
mod printer;

pub use parser::{parse_file, parse_str};
pub use printer::{print_to_string, XmlPrinter, XmlPrinterOptions};
