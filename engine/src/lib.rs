//! Word-location index built concurrently from files or crawled pages, and
//! ranked search over it.

pub mod builder;
pub mod index;
pub mod json;
pub mod lock;
pub mod pool;
pub mod query;
pub mod search;
pub mod shared;
pub mod tokenizer;

pub use builder::IndexBuilder;
pub use index::{InvertedIndex, Positions, Postings};
pub use lock::MultiReaderLock;
pub use pool::{WorkQueue, WorkQueueError};
pub use query::QueryEngine;
pub use search::SearchResult;
pub use shared::ThreadSafeIndex;
