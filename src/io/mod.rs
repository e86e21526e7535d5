//! Graph file I/O: the binary input format and the text converter.

pub mod ascii;
pub mod binary;

pub use binary::{EdgeReader, GraphHeader, read_graph, write_graph};
