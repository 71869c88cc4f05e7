//! HTTP server command
//!
//! Migrates the database and runs the API until Ctrl+C or SIGTERM.

use anyhow::{ensure, Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use storefront_server::db::{create_pool, migrations};
use storefront_server::{run_server, AppState, JwtConfig, PasswordHasher, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://data.db")]
    pub database_url: String,

    /// Secret used to sign and verify tokens
    #[arg(long, env = "JWT_SECRET_KEY", hide_env_values = true)]
    pub jwt_secret: String,

    /// Access token lifetime in minutes
    #[arg(long, default_value_t = 15)]
    pub access_token_minutes: i64,

    /// Refresh token lifetime in days
    #[arg(long, default_value_t = 30)]
    pub refresh_token_days: i64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

impl ServeArgs {
    fn jwt_config(&self) -> Result<JwtConfig> {
        ensure!(!self.jwt_secret.is_empty(), "JWT secret must not be empty");
        ensure!(
            self.access_token_minutes > 0 && self.refresh_token_days > 0,
            "token lifetimes must be positive"
        );

        let mut config = JwtConfig::new(self.jwt_secret.clone());
        config.access_ttl = lifetime(
            chrono::Duration::try_minutes(self.access_token_minutes),
            "--access-token-minutes",
        )?;
        config.refresh_ttl = lifetime(
            chrono::Duration::try_days(self.refresh_token_days),
            "--refresh-token-days",
        )?;
        Ok(config)
    }
}

/// Token expiry is computed as now + ttl, which must stay representable.
fn lifetime(ttl: Option<chrono::Duration>, flag: &str) -> Result<chrono::Duration> {
    ttl.filter(|ttl| chrono::Utc::now().checked_add_signed(*ttl).is_some())
        .with_context(|| format!("{} is out of range", flag))
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let jwt = args.jwt_config()?;

    tracing::info!("Starting storefront server on {}", args.bind);

    let pool = create_pool(&args.database_url)
        .await
        .context("Failed to create database pool")?;
    migrations::run(&pool)
        .await
        .context("Failed to run migrations")?;

    let state = AppState::new(pool, jwt, PasswordHasher::default());
    let config = ServerConfig {
        bind_addr: args.bind,
        cors_permissive: args.cors_permissive,
        request_timeout: Duration::from_secs(args.timeout),
    };

    // Blocks until shutdown
    run_server(state, config).await.context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> ServeArgs {
        let mut argv = vec!["serve", "--jwt-secret", "s"];
        argv.extend_from_slice(extra);
        ServeArgs::parse_from(argv)
    }

    #[test]
    fn lifetimes_become_jwt_config() {
        let config = args(&["--access-token-minutes", "5", "--refresh-token-days", "2"])
            .jwt_config()
            .unwrap();
        assert_eq!(config.access_ttl, chrono::Duration::minutes(5));
        assert_eq!(config.refresh_ttl, chrono::Duration::days(2));
    }

    #[test]
    fn huge_lifetimes_are_errors() {
        let err = args(&["--access-token-minutes", "9223372036854775807"])
            .jwt_config()
            .unwrap_err();
        assert!(err.to_string().contains("--access-token-minutes"));

        let err = args(&["--refresh-token-days", "9223372036854775807"])
            .jwt_config()
            .unwrap_err();
        assert!(err.to_string().contains("--refresh-token-days"));
    }

    #[test]
    fn non_positive_lifetime_is_error() {
        assert!(args(&["--access-token-minutes", "0"]).jwt_config().is_err());
    }
}
