//! Service configuration, from flags or `PHOTOEGG_*` environment variables.

use std::net::SocketAddr;
use std::num::NonZeroUsize;

use clap::Args;

/// Largest accepted upload by default: 500 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 500 * 1024 * 1024;

pub const DEFAULT_PORT: u16 = 8765;

#[derive(Debug, Clone, Args)]
pub struct ServiceConfig {
    /// Address to bind.
    #[arg(long, env = "PHOTOEGG_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "PHOTOEGG_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Maximum request body size in bytes.
    #[arg(long, env = "PHOTOEGG_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Images processed at once. Defaults to the number of available CPUs.
    #[arg(long, env = "PHOTOEGG_MAX_CONCURRENT_JOBS")]
    pub max_concurrent_jobs: Option<NonZeroUsize>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_concurrent_jobs: None,
        }
    }
}

impl ServiceConfig {
    pub fn concurrent_jobs(&self) -> usize {
        self.max_concurrent_jobs
            .or_else(|| std::thread::available_parallelism().ok())
            .map_or(1, NonZeroUsize::get)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}
