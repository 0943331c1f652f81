//! Listen address parsing and socket binding.
//!
//! `listen` is either `host:port` or `unix:<path>`; the `unix:` prefix is
//! matched case-insensitively.

use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;

use crate::error::LinkerError;

const UNIX_PREFIX: &str = "unix:";

/// Byte stream of one accepted connection, TCP or Unix, plain or TLS.
pub type BoxedStream = Box<dyn AsyncReadWrite>;

pub trait AsyncReadWrite: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T> AsyncReadWrite for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// Where the linker accepts connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenAddr {
    Tcp(String),
    Unix(PathBuf),
}

impl ListenAddr {
    /// Parses a `listen` value. An empty host (`:8080`) binds every interface.
    pub fn parse(value: &str) -> Self {
        match value.get(..UNIX_PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(UNIX_PREFIX) => {
                Self::Unix(PathBuf::from(&value[UNIX_PREFIX.len()..]))
            }
            _ if value.starts_with(':') => Self::Tcp(format!("0.0.0.0{value}")),
            _ => Self::Tcp(value.to_string()),
        }
    }

    /// Socket file to remove once the listener is closed.
    pub fn socket_path(&self) -> Option<&Path> {
        match self {
            Self::Unix(path) => Some(path),
            Self::Tcp(_) => None,
        }
    }
}

impl std::fmt::Display for ListenAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tcp(addr) => f.write_str(addr),
            Self::Unix(path) => write!(f, "{UNIX_PREFIX}{}", path.display()),
        }
    }
}

/// A bound listening socket.
pub enum Listener {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(tokio::net::UnixListener),
}

impl Listener {
    /// Binds the socket.
    ///
    /// # Errors
    ///
    /// Returns [`LinkerError::Listen`] if the address is in use, cannot be
    /// resolved, or (for Unix sockets) the file already exists.
    pub async fn bind(address: &ListenAddr) -> Result<Self, LinkerError> {
        let listen_error = |source: io::Error| LinkerError::Listen {
            address: address.to_string(),
            source,
        };

        match address {
            ListenAddr::Tcp(addr) => TcpListener::bind(addr.as_str())
                .await
                .map(Self::Tcp)
                .map_err(listen_error),
            #[cfg(unix)]
            ListenAddr::Unix(path) => tokio::net::UnixListener::bind(path)
                .map(Self::Unix)
                .map_err(listen_error),
            #[cfg(not(unix))]
            ListenAddr::Unix(_) => Err(listen_error(io::Error::new(
                io::ErrorKind::Unsupported,
                "unix sockets are not supported on this platform",
            ))),
        }
    }

    /// Bound TCP address; `None` for Unix sockets.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match self {
            Self::Tcp(listener) => listener.local_addr().ok(),
            #[cfg(unix)]
            Self::Unix(_) => None,
        }
    }

    /// Accepts the next connection and a printable peer address.
    pub async fn accept(&self) -> io::Result<(BoxedStream, String)> {
        match self {
            Self::Tcp(listener) => {
                let (stream, peer) = listener.accept().await?;
                let _ = stream.set_nodelay(true);
                Ok((Box::new(stream), peer.to_string()))
            }
            #[cfg(unix)]
            Self::Unix(listener) => {
                let (stream, _) = listener.accept().await?;
                Ok((Box::new(stream), "unix".to_string()))
            }
        }
    }
}
