pub mod file_storage;
pub mod mock_summarizer;

pub use file_storage::FileStorage;
pub use mock_summarizer::MockSummarizer;
