mod format;
mod input;
mod output;

pub use format::DocumentFormat;
pub use input::{load_document, parse_document_any, parse_document_str};
pub use output::{OutputDestination, OutputOptions, encode_document, write_document};
