pub mod config;
pub mod corpus;
pub mod embed;
pub mod engine;
pub mod extract;
pub mod ingest;
pub mod report;
