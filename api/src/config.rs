use std::{net::SocketAddr, time::Duration};

use clap::{Parser, ValueEnum};

/// Backing store the API serves records from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// MongoDB, at `--mongodb-uri`. Needs a replica set for transactional
    /// updates and deletes.
    Mongodb,

    /// Process memory. Records are lost when the server stops.
    Memory,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone, Debug, Parser)]
#[clap(version, about = "ZACA certificate record store API")]
pub struct ZacaApiConfig {
    #[clap(
        short,
        long,
        env = "ZACA_API_BIND_ADDR",
        default_value = "0.0.0.0:4000"
    )]
    pub bind_addr: SocketAddr,

    /// Origin allowed to make cross-origin requests.
    #[clap(
        long,
        env = "ZACA_API_PUBLIC_URL",
        default_value = "http://localhost:4000"
    )]
    pub public_url: String,

    /// Print the OpenAPI document to stdout and exit.
    #[clap(long, default_value_t = false)]
    pub dump_openapi: bool,

    #[clap(long, env = "ZACA_API_STORE", value_enum, default_value_t = StoreKind::Mongodb)]
    pub store: StoreKind,

    #[clap(
        long,
        env = "ZACA_API_MONGODB_URI",
        default_value = "mongodb://localhost:27017/zaca"
    )]
    pub mongodb_uri: String,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[clap(long, env = "ZACA_API_DEBUG", default_value_t = false)]
    pub debug: bool,

    #[clap(long, env = "ZACA_API_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Requests running longer than this are abandoned with a 408.
    #[clap(long, env = "ZACA_API_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// How long in-flight requests may run after a shutdown signal.
    #[clap(long, env = "ZACA_API_SHUTDOWN_TIMEOUT_SECS", default_value_t = 30)]
    pub shutdown_timeout_secs: u64,
}

impl ZacaApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Default `EnvFilter` directives when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "zaca_api=debug,zaca_common=debug,zaca_db=debug,tower_http=debug"
        } else {
            "zaca_api=info,zaca_common=info,zaca_db=info"
        }
    }
}
