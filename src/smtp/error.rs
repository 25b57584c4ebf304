use std::io;

use thiserror::Error;

use super::types::Stage;

/// Failure of a probe session, tagged by retry class.
///
/// Only [`ProbeError::TransientResourceExhaustion`] is worth retrying: the
/// local host could not allocate what it needs to open the connection, which
/// says nothing about the remote server.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no local network resource available to reach {host}: {source}")]
    TransientResourceExhaustion {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("connection to {host} failed: {source}")]
    ConnectionFailed {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("{host} timed out during {stage}")]
    Timeout { host: String, stage: Stage },
    #[error("{host} closed the connection during {stage}: {source}")]
    Disconnected {
        host: String,
        stage: Stage,
        #[source]
        source: io::Error,
    },
    #[error("{host} refused {stage}: {code} {message}")]
    ServerRejected {
        host: String,
        stage: Stage,
        code: u16,
        message: String,
    },
    #[error("protocol error with {host} during {stage}: {message}")]
    Protocol {
        host: String,
        stage: Stage,
        message: String,
    },
}

impl ProbeError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientResourceExhaustion { .. })
    }

    /// Maps an I/O failure observed at `stage` onto its retry class.
    pub fn from_io(host: &str, stage: Stage, err: io::Error) -> Self {
        let host = host.to_string();
        match err.kind() {
            io::ErrorKind::AddrNotAvailable => Self::TransientResourceExhaustion { host, source: err },
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Self::Timeout { host, stage },
            io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => Self::Disconnected {
                host,
                stage,
                source: err,
            },
            io::ErrorKind::InvalidData => Self::Protocol {
                host,
                stage,
                message: err.to_string(),
            },
            _ => Self::ConnectionFailed { host, source: err },
        }
    }
}
