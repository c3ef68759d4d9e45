//! Apply pending Record Store schema migrations.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use user_directory::outbound::persistence::run_migrations;

/// `migrate` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "migrate",
    about = "Apply pending user directory schema migrations",
    version
)]
struct CliArgs {
    /// Database connection URL.
    #[arg(long = "database-url", value_name = "url", env = "DATABASE_URL")]
    database_url: String,
}

fn validate_database_url(value: &str) -> io::Result<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "database URL must not be empty",
        ));
    }
    Ok(trimmed)
}

fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let database_url = validate_database_url(&args.database_url)?;

    let applied = run_migrations(database_url).map_err(io::Error::other)?;
    info!(count = applied.len(), "migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_database_url_is_rejected(#[case] value: &str) {
        let err = validate_database_url(value).expect_err("blank URL");

        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[rstest]
    fn explicit_flag_is_parsed() {
        let args = CliArgs::try_parse_from(["migrate", "--database-url", "postgres://db/users"])
            .expect("valid arguments");

        assert_eq!(args.database_url, "postgres://db/users");
    }
}
