pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod report;
pub mod transform;
