use std::path::Path;
use crate::cli::commands::ModerateArgs;
use crate::config::load_config;
use crate::errors::GatewayError;
use crate::moderation::{Direction, Guardrails};

pub async fn handle_moderate(args: ModerateArgs) -> Result<(), GatewayError> {
    let mut config = load_config(args.config.as_deref().map(Path::new)).await?;
    // Always classify here, whatever the deployment toggle says.
    config.guardrails.enabled = true;
    let guardrails = Guardrails::from_config(&config.guardrails)?;

    let direction: Direction = args.direction.into();
    let verdict = guardrails.check(direction, &args.text);
    println!("{}", serde_json::to_string_pretty(&verdict)?);
    if !verdict.is_safe {
        println!();
        println!("{}", guardrails.safe_message(&verdict, direction));
    }
    Ok(())
}
