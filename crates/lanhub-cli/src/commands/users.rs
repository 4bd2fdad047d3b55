//! `users` commands.

use clap::{Args, Subcommand};

use lanhub_core::config::AppConfig;
use lanhub_core::error::AppError;
use lanhub_service::RequestContext;

use crate::output::{self, OutputFormat};

/// Arguments for the users command
#[derive(Debug, Args)]
pub struct UsersArgs {
    /// Users subcommand
    #[command(subcommand)]
    pub command: UsersCommand,
}

/// Users subcommands
#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// Grant the administrator role to an account
    Promote {
        /// Email of the account
        email: String,
    },
}

/// Execute a users subcommand
pub async fn execute(
    args: &UsersArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::connect_services(config).await?;

    match &args.command {
        UsersCommand::Promote { email } => {
            let user = services
                .accounts
                .promote(&RequestContext::system(), email)
                .await?;
            output::print_report(
                &format!("{} is now an administrator", user.username),
                &serde_json::json!({ "id": user.id, "email": user.email, "role": user.role }),
                format,
            );
        }
    }
    Ok(())
}
