//! # Voroscope I/O
//!
//! Reader and writer for the line-oriented tessellation dump format:
//! tab-and-parenthesis delimited records grouped under the literal section
//! markers `# Vertices #`, `# Triangles #`, `# Cells #` and `# Centroids #`.

pub mod dump;

pub use dump::{DumpError, DumpReader, DumpWriter};
