//! Process configuration from command-line flags and environment variables.

use crate::RouterOptions;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "licensor-server")]
#[command(about = "License verification and administration API")]
pub struct Config {
    /// HTTP port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "LICENSOR_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// Path to the SQLite license database
    #[arg(short, long, env = "LICENSOR_DATABASE", default_value = "licenses.db")]
    pub database: PathBuf,

    /// Keep all records in memory (nothing is persisted)
    #[arg(long, env = "LICENSOR_IN_MEMORY")]
    pub in_memory: bool,

    /// How long a store call may wait on a locked database
    #[arg(long, env = "LICENSOR_STORE_TIMEOUT_MS", default_value_t = 5000)]
    pub store_timeout_ms: u64,

    /// Admin session lifetime
    #[arg(long, env = "LICENSOR_SESSION_TTL_SECS", default_value_t = 24 * 60 * 60)]
    pub session_ttl_secs: u64,

    /// Require an admin session for license management routes
    #[arg(long, env = "LICENSOR_REQUIRE_AUTH", default_value_t = true, action = ArgAction::Set)]
    pub require_auth: bool,

    /// Expose the first-admin registration endpoint
    #[arg(long, env = "LICENSOR_ALLOW_REGISTER", default_value_t = true, action = ArgAction::Set)]
    pub allow_register: bool,

    /// Directory of static admin panel files
    #[arg(long, env = "LICENSOR_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long, env = "LICENSOR_VERBOSE")]
    pub verbose: bool,
}

impl Config {
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    #[must_use]
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    #[must_use]
    pub fn router_options(&self) -> RouterOptions {
        RouterOptions {
            require_auth: self.require_auth,
            allow_register: self.allow_register,
            static_dir: self.static_dir.clone(),
        }
    }
}
