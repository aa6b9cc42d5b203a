pub mod parser;
pub mod schema;
pub mod types;
pub mod credentials;

pub use types::*;
pub use parser::{apply_env_overrides, load_config, parse_config, validate_config};
