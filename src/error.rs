use std::io;
use thiserror::Error;

use crate::fetch::FetchError;

/// Ways a single transfer can end without producing its file.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Error when opening working directory: {0}")]
    WorkingDirectoryUnavailable(#[source] io::Error),

    #[error("Error while creating {filename}: {source}")]
    OutputCreate {
        filename: String,
        #[source]
        source: io::Error,
    },

    #[error("HTTP GET error for {url}: {source}")]
    RemoteFetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("Error while downloading {url}: {source}")]
    StreamCopy {
        url: String,
        #[source]
        source: io::Error,
    },

    #[error("Download task for {url} panicked")]
    WorkerPanicked { url: String },
}

impl TransferError {
    /// Short cause shown on the progress line; the full message goes to the log.
    pub fn reason(&self) -> String {
        match self {
            Self::WorkingDirectoryUnavailable(e) => format!("no working directory ({})", e),
            Self::OutputCreate { source, .. } => format!("cannot create file ({})", source),
            Self::RemoteFetch { source, .. } => format!("fetch failed ({})", source),
            Self::StreamCopy { source, .. } => format!("transfer interrupted ({})", source),
            Self::WorkerPanicked { .. } => "worker panicked".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = TransferError::OutputCreate {
            filename: "a.bin".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "Error while creating a.bin: denied");
        assert_eq!(err.reason(), "cannot create file (denied)");

        let err = TransferError::RemoteFetch {
            url: "http://host/a.bin".to_string(),
            source: FetchError::Status(reqwest::StatusCode::NOT_FOUND),
        };
        assert_eq!(
            err.to_string(),
            "HTTP GET error for http://host/a.bin: server answered 404 Not Found"
        );

        let err = TransferError::StreamCopy {
            url: "http://host/a.bin".to_string(),
            source: io::Error::new(io::ErrorKind::ConnectionReset, "reset"),
        };
        assert!(err.to_string().contains("http://host/a.bin"));
    }
}
