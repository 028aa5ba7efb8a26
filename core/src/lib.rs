pub mod accessor;
pub mod buffer;
pub mod config;
pub mod error;
pub mod index;
pub mod mapped;
pub mod persist;
pub mod reader;
pub mod search;
pub mod text;
pub mod tokenizer;
pub mod trie;
pub mod writer;

pub use accessor::{BinaryIndexAccessor, IndexAccessor};
pub use config::Config;
pub use error::{FtsError, Result};
pub use index::{DocId, Handle, Index, IndexBuilder, Position, Postings};
pub use mapped::MappedIndex;
pub use search::{render_results, search, SearchResult};
pub use text::{TextIndexAccessor, TextIndexWriter};
pub use writer::{BinaryIndexWriter, IndexWriter};
