use clap::Args;
use serde_json::json;

use crate::auth::{Role, TokenService};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Args)]
pub struct TokenArgs {
    #[arg(long, help = "User id placed in the token")]
    pub id: i64,
    #[arg(long, help = "Email placed in the token")]
    pub email: String,
    #[arg(long, default_value = "usuario", help = "Role: usuario or admin")]
    pub role: String,
}

pub fn handle(config: &AppConfig, args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let role: Role = serde_json::from_value(json!(args.role))
        .map_err(|_| anyhow::anyhow!("unknown role '{}', expected usuario or admin", args.role))?;

    let tokens = TokenService::new(&config.security);
    let issued = tokens.issue(args.id, &args.email, role)?;

    output_success(
        output_format,
        &format!("Token issued for {} ({})", args.email, role),
        Some(json!({ "token": issued.token, "expires_in": issued.expires_in })),
    )
}
