use std::path::Path;
use serde_json::json;
use crate::cli::commands::ProvidersArgs;
use crate::config::load_config;
use crate::errors::GatewayError;
use crate::llm::catalog::PROVIDERS;

pub async fn handle_providers(args: ProvidersArgs) -> Result<(), GatewayError> {
    let config = load_config(args.config.as_deref().map(Path::new)).await?;

    let rows: Vec<_> = PROVIDERS
        .iter()
        .map(|info| {
            let resolved = config.provider_config(info.id);
            json!({
                "id": info.id,
                "name": info.name,
                "available": resolved.available,
                "model": resolved.model,
                "baseUrl": resolved.base_url,
                "timeoutSecs": resolved.timeout.as_secs(),
            })
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{:<10} {:<10} {:<32} {}", "PROVIDER", "STATUS", "MODEL", "BASE URL");
    for info in PROVIDERS {
        let resolved = config.provider_config(info.id);
        let status = if resolved.available { "ready" } else { "no key" };
        println!("{:<10} {:<10} {:<32} {}", info.id.as_str(), status, resolved.model, resolved.base_url);
    }
    Ok(())
}
