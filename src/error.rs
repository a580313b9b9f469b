//! Unified error type.

use std::fmt;
use std::net::SocketAddr;

/// The error returned by [`Server::serve`](crate::Server::serve).
///
/// Exactly one infrastructure failure surfaces once registration is done:
/// the listener failing to bind. Per-connection I/O problems are logged and
/// die with their connection; everything application-level is an HTTP
/// [`Response`](crate::Response).
#[derive(Debug)]
pub struct Error {
    addr: SocketAddr,
    source: std::io::Error,
}

impl Error {
    pub(crate) fn bind(addr: SocketAddr, source: std::io::Error) -> Self {
        Self { addr, source }
    }

    /// The address the server failed to bind.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to bind {}: {}", self.addr, self.source)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_address() {
        let err = Error::bind(
            "127.0.0.1:3000".parse().unwrap(),
            std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use"),
        );
        assert_eq!(err.to_string(), "failed to bind 127.0.0.1:3000: address in use");
        assert!(std::error::Error::source(&err).is_some());
    }
}
