//! Command-line surface: argument parsing, the generate flow, and the
//! terminal decision provider for interactive merging.

mod commands;
mod prompts;

pub use commands::{run_cli, Cli, Commands, GenerateArgs, VERSION};
pub use prompts::ConsoleDecisionProvider;
