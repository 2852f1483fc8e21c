use clap::{Parser, Subcommand, ValueEnum};
use linkmint_telemetry::LogFormat;
use std::fmt::{Display, Formatter};

pub const STORAGE_BACKEND_ENV: &str = "LINKMINT_STORAGE_BACKEND";
pub const POSTGRES_DSN_ENV: &str = "LINKMINT_POSTGRES_DSN";
pub const INIT_SCHEMA_ENV: &str = "LINKMINT_INIT_SCHEMA";
pub const REDIS_URL_ENV: &str = "LINKMINT_REDIS_URL";
pub const REDIS_KEY_PREFIX_ENV: &str = "LINKMINT_REDIS_KEY_PREFIX";
pub const CACHE_TTL_SECS_ENV: &str = "LINKMINT_CACHE_TTL_SECS";
pub const MAX_ATTEMPTS_ENV: &str = "LINKMINT_MAX_ATTEMPTS";
pub const BATCH_MAX_ATTEMPTS_ENV: &str = "LINKMINT_BATCH_MAX_ATTEMPTS";
pub const BATCH_QUEUE_CAPACITY_ENV: &str = "LINKMINT_BATCH_QUEUE_CAPACITY";
pub const LOG_FORMAT_ENV: &str = "LINKMINT_LOG_FORMAT";

pub const DEFAULT_REDIS_KEY_PREFIX: &str = "lm:";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "postgres")]
    Postgres,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Postgres => write!(f, "postgres"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "linkmint", about = "Mint and resolve short codes")]
pub struct Cli {
    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = POSTGRES_DSN_ENV, required_if_eq("storage", "postgres"))]
    pub postgres_dsn: Option<String>,

    /// Create the `urls` table before running the command.
    #[arg(long, env = INIT_SCHEMA_ENV)]
    pub init_schema: bool,

    /// Shared cache. Without it, or if it cannot be reached, only the
    /// in-process cache is used.
    #[arg(long, env = REDIS_URL_ENV)]
    pub redis_url: Option<String>,

    #[arg(long, env = REDIS_KEY_PREFIX_ENV, default_value = DEFAULT_REDIS_KEY_PREFIX)]
    pub redis_key_prefix: String,

    #[arg(long, env = CACHE_TTL_SECS_ENV, default_value_t = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl_secs: u64,

    #[arg(long, env = MAX_ATTEMPTS_ENV, default_value_t = 10)]
    pub max_attempts: u32,

    #[arg(long, env = BATCH_MAX_ATTEMPTS_ENV, default_value_t = 5)]
    pub batch_max_attempts: u32,

    #[arg(long, env = BATCH_QUEUE_CAPACITY_ENV, default_value_t = 1000)]
    pub batch_queue_capacity: usize,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a short code for each url.
    Shorten {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Print the url behind each short code.
    Resolve {
        #[arg(required = true)]
        codes: Vec<String>,
    },
    /// Read urls from stdin, one per line, and print one JSON result per line.
    Batch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_in_memory_storage() {
        let cli = Cli::try_parse_from(["linkmint", "shorten", "https://example.com"]).unwrap();

        assert_eq!(cli.storage, StorageBackendArg::InMemory);
        assert_eq!(cli.cache_ttl_secs, DEFAULT_CACHE_TTL_SECS);
        assert_eq!(cli.max_attempts, 10);
        assert_eq!(cli.batch_max_attempts, 5);
        assert!(matches!(cli.command, Command::Shorten { ref urls } if urls.len() == 1));
    }

    #[test]
    fn postgres_requires_a_dsn() {
        let err =
            Cli::try_parse_from(["linkmint", "--storage", "postgres", "resolve", "abc123"])
                .unwrap_err();

        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn shorten_needs_at_least_one_url() {
        assert!(Cli::try_parse_from(["linkmint", "shorten"]).is_err());
    }
}
