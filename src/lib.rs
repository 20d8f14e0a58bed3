// Personal Tutor - study content server with an LLM homework helper
// Library exports

pub mod chat;
pub mod cli;
pub mod client;
pub mod config;
pub mod content;
pub mod logging;
pub mod providers;
pub mod server;
