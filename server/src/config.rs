use std::net::SocketAddr;

use clap::Parser;

/// Runtime settings for the Thing server.
#[derive(Debug, Clone, Parser)]
#[command(name = "thing-server", version, about = "In-memory Thing resource over HTTP")]
pub struct ServerConfig {
    /// Address to bind.
    #[arg(long, env = "THING_HOST", default_value = "127.0.0.1")]
    pub host: std::net::IpAddr,

    /// Port to listen on; 0 picks a free one.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Default tracing filter when `RUST_LOG` is unset.
    #[arg(long, env = "THING_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
