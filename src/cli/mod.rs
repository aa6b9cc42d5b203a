pub mod commands;
pub mod serve;
pub mod validate;
pub mod moderate;
pub mod providers;

pub use commands::{Cli, Commands};
