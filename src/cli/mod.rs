// CLI module
// Interactive chat client for a running server

mod commands;
mod repl;

pub use commands::{handle_command, Command};
pub use repl::Repl;
