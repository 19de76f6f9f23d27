//! QA adapters for tests and offline use.

mod mock_qa_client;

pub use mock_qa_client::{MockAnswer, MockQaClient};
