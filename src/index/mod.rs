pub mod layout;
pub mod lcp;
pub mod offsets;
pub mod reader;
pub mod sparse;
pub mod types;
pub mod writer;

pub use layout::ReferenceLayout;
pub use lcp::CompactLcp;
pub use offsets::KmerOffsets;
pub use reader::IndexReader;
pub use sparse::{IndexParts, SparseSuffixArray};
pub use types::*;
pub use writer::IndexWriter;
