//! HTTP adapters - clients for the question-answering backend.

mod qa_client;

pub use qa_client::HttpQaClient;
