use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiIngressError {
    #[error("Invalid bind address '{addr}': {source}")]
    InvalidBindAddr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("HTTP server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
