pub mod index;
pub mod lock;
pub mod persist;
pub mod queue;
pub mod results;
pub mod threaded;
pub mod tokenizer;

pub use index::{InvertedIndex, SearchResult};
pub use lock::MultiReaderLock;
pub use queue::WorkQueue;
pub use results::{Results, ThreadedResults};
pub use threaded::ThreadedIndex;
