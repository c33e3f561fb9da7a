// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The server answered with a non-2xx status.
    #[error("HTTP error! status: {status}")]
    Network { status: u16 },

    /// The request never produced a usable body (connectivity, decode).
    #[error("{0}")]
    Transport(String),

    /// Superseded by a newer request; never shown to the user.
    #[error("request cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status } => Some(*status),
            Self::Transport(_) | Self::Cancelled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FetchError;

    #[test]
    fn network_error_carries_status_in_message() {
        let error = FetchError::Network { status: 503 };
        assert_eq!(error.status(), Some(503));
        assert_eq!(error.to_string(), "HTTP error! status: 503");
    }

    #[test]
    fn transport_error_displays_message_verbatim() {
        let error = FetchError::transport("connection refused");
        assert_eq!(error.to_string(), "connection refused");
        assert_eq!(error.status(), None);
        assert!(!error.is_cancelled());
        assert!(FetchError::Cancelled.is_cancelled());
    }
}
