use std::convert::From;
use std::error::Error;
use std::fmt;
use std::io;

pub type ConnectionResult<T> = Result<T, ConnectionError>;

#[derive(Debug)]
pub enum ConnectionError {
    IoError(io::Error),
    Timeout,
    ProtocolError,
    NegotiationError,
    UnsupportedAlgorithm,
    KeyExchangeError,
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::ConnectionError::*;
        match *self
        {
            IoError(ref err) => write!(f, "connection error: {}", err),
            Timeout => write!(f, "connection error: timed out waiting for packet"),
            ProtocolError => write!(f, "connection error: protocol error"),
            NegotiationError => write!(f, "connection error: negotiation error"),
            UnsupportedAlgorithm => write!(f, "connection error: unsupported algorithm"),
            KeyExchangeError => write!(f, "connection error: key exchange error"),
        }
    }
}

impl Error for ConnectionError {}

impl From<io::Error> for ConnectionError {
    fn from(err: io::Error) -> ConnectionError {
        ConnectionError::IoError(err)
    }
}
