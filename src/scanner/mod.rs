mod gemini;
mod ingest;
mod verdict;

pub use gemini::GeminiAgent;
pub use ingest::ScanRequest;
pub use verdict::{extract_verdict, mock_verdict, ScanVerdict};
