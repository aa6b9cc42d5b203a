use std::path::Path;
use crate::cli::commands::ValidateArgs;
use crate::config::{parse_config, validate_config};
use crate::errors::GatewayError;
use crate::moderation::Guardrails;

pub async fn handle_validate(args: ValidateArgs) -> Result<(), GatewayError> {
    let config = parse_config(Path::new(&args.config)).await?;
    validate_config(&config)?;
    // Compiles the extra patterns too.
    Guardrails::from_config(&config.guardrails)?;
    println!("Configuration is valid: {}", args.config);
    Ok(())
}
