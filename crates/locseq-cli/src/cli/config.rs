use core::time::Duration;

use anyhow::bail;
use clap::{Parser, Subcommand, ValueEnum};
use locseq::{RetryPolicy, Year};

/// Configuration for the `locseq` binary.
///
/// Every setting can come from a flag, an environment variable or a `.env`
/// file, in that order of precedence.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "locseq",
    version,
    about = "Allocate and inspect per-location, per-year sequential identifiers"
)]
pub struct CliArgs {
    /// PostgreSQL connection string for the shared counter store.
    ///
    /// Required unless `--memory` is set.
    ///
    /// Environment variable: `DATABASE_URL`
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    pub database_url: Option<String>,

    /// Use a throwaway in-process store instead of PostgreSQL. Counters start
    /// from zero on every run.
    #[arg(long, global = true, default_value_t = false)]
    pub memory: bool,

    /// Size of the PostgreSQL connection pool.
    ///
    /// Environment variable: `MAX_CONNECTIONS`
    #[arg(long, env = "MAX_CONNECTIONS", global = true, default_value_t = 8)]
    pub max_connections: u32,

    /// Attempts per allocation before giving up with a transient failure.
    ///
    /// Environment variable: `ALLOC_MAX_ATTEMPTS`
    #[arg(long, env = "ALLOC_MAX_ATTEMPTS", global = true, default_value_t = 5)]
    pub max_attempts: u32,

    /// Backoff before the first retry, in milliseconds. Doubles per attempt.
    ///
    /// Environment variable: `ALLOC_BASE_DELAY_MS`
    #[arg(long, env = "ALLOC_BASE_DELAY_MS", global = true, default_value_t = 5)]
    pub base_delay_ms: u64,

    /// Upper bound on any single backoff, in milliseconds.
    ///
    /// Environment variable: `ALLOC_MAX_DELAY_MS`
    #[arg(long, env = "ALLOC_MAX_DELAY_MS", global = true, default_value_t = 100)]
    pub max_delay_ms: u64,

    /// How long one increment may wait on the counter row lock before it
    /// counts as contended, in milliseconds.
    ///
    /// Environment variable: `LOCK_TIMEOUT_MS`
    #[arg(long, env = "LOCK_TIMEOUT_MS", global = true, default_value_t = 250)]
    pub lock_timeout_ms: u64,

    /// Log output format (logs go to stderr).
    ///
    /// Environment variable: `LOG_FORMAT`
    #[arg(long, env = "LOG_FORMAT", global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create the counter and registry tables if they do not exist.
    Migrate,
    /// Allocate the next identifier for a location.
    Assign {
        /// Free-text location, e.g. "Chennai" or "Anna Nagar, Chennai".
        location: String,
        /// Allocate in this year instead of the current one.
        #[arg(long)]
        year: Option<u16>,
    },
    /// Allocate the next identifier and insert it into the registry.
    Register {
        location: String,
        #[arg(long)]
        year: Option<u16>,
    },
    /// Show the registry row for an identifier.
    Lookup { identifier: String },
    /// Split a canonical identifier into its parts.
    Parse { identifier: String },
    /// Show the partition key a location resolves to, without allocating.
    Resolve {
        location: String,
        #[arg(long)]
        year: Option<u16>,
    },
    /// Show the last sequence number issued for a location.
    Status {
        location: String,
        #[arg(long)]
        year: Option<u16>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Postgres {
        url: String,
        max_connections: u32,
        lock_timeout: Duration,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: Backend,
    pub retry: RetryPolicy,
    pub log_format: LogFormat,
    pub command: Command,
}

impl TryFrom<CliArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.max_attempts == 0 {
            bail!("ALLOC_MAX_ATTEMPTS must be greater than 0");
        }

        if args.base_delay_ms > args.max_delay_ms {
            bail!(
                "ALLOC_BASE_DELAY_MS ({}) exceeds ALLOC_MAX_DELAY_MS ({})",
                args.base_delay_ms,
                args.max_delay_ms
            );
        }

        if let Command::Assign { year: Some(year), .. }
        | Command::Register { year: Some(year), .. }
        | Command::Resolve { year: Some(year), .. }
        | Command::Status { year: Some(year), .. } = args.command
        {
            if let Err(err) = Year::new(year) {
                bail!("--year {year}: {err}");
            }
        }

        let backend = if args.memory {
            Backend::Memory
        } else {
            let Some(url) = args.database_url else {
                bail!("DATABASE_URL is required unless --memory is set");
            };
            if args.max_connections == 0 {
                bail!("MAX_CONNECTIONS must be greater than 0");
            }
            // PostgreSQL treats a zero lock_timeout as no timeout at all.
            if args.lock_timeout_ms == 0 {
                bail!("LOCK_TIMEOUT_MS must be greater than 0");
            }
            Backend::Postgres {
                url,
                max_connections: args.max_connections,
                lock_timeout: Duration::from_millis(args.lock_timeout_ms),
            }
        };

        let retry = RetryPolicy::new(args.max_attempts)
            .with_base_delay(Duration::from_millis(args.base_delay_ms))
            .with_max_delay(Duration::from_millis(args.max_delay_ms));

        Ok(Self {
            backend,
            retry,
            log_format: args.log_format,
            command: args.command,
        })
    }
}
