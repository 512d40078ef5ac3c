pub mod config;
pub mod error;
pub mod llm;
pub mod portrait;
pub mod session;
pub mod utils;
