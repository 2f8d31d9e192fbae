use std::fmt::{self, Display, Formatter};

/// Convenience alias for results carrying an [`ErrorKind`].
pub type Result<T> = std::result::Result<T, ErrorKind>;

/// Error kinds surfaced by the link, either as an immediate result from an
/// API call or as an `Error` event from poll.
///
/// Transport errors are not retried; they surface immediately and leave the
/// link in its current state. Protocol decode errors become an event, not a
/// crash. Programmer errors (releasing with no outstanding slice, resetting
/// an arena past its head) are diagnosed by assertion instead and never
/// appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The transport callback reported a failure.
    Io,
    /// The codec reported malformed wire data, or the handshake failed.
    Protocol,
    /// Encoded output or a slice did not fit in its buffer or arena.
    Overflow,
    /// API misuse at the link level, such as closing with pending TX.
    State,
    /// No codec is attached, or the codec does not implement the operation.
    Unsupported,
    /// The operation was attempted after the terminal state.
    Closed,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Io => write!(f, "transport failure"),
            ErrorKind::Protocol => write!(f, "malformed wire data"),
            ErrorKind::Overflow => write!(f, "output did not fit"),
            ErrorKind::State => write!(f, "operation not valid in the current state"),
            ErrorKind::Unsupported => write!(f, "operation not supported by the codec"),
            ErrorKind::Closed => write!(f, "link already closed"),
        }
    }
}

impl std::error::Error for ErrorKind {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_stable() {
        assert_eq!(ErrorKind::Io.to_string(), "transport failure");
        assert_eq!(ErrorKind::Protocol.to_string(), "malformed wire data");
    }
}
