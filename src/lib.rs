pub mod awscli;
pub mod chunker;
pub mod cli;
pub mod config;
pub mod error;
pub mod ocr;
pub mod orchestrator;
pub mod pipeline;
pub mod report;
pub mod store;
pub mod util;
