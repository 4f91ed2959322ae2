//! Error types shared by the codec and the truth engine.
//!
//! Every public operation either returns a valid result or a single error;
//! partial output is never produced. Errors carry a message naming the
//! offending field or token so hosts can surface it directly.
//!
//! ## Error categories
//!
//! - **BadInput**: malformed JSON or TOON, invalid zone, invalid rrule,
//!   unparseable datetime, bad offset spec, unrecognized relative
//!   expression, malformed filter pattern
//! - **Overflow**: timestamp arithmetic or recurrence expansion exceeding
//!   the representable range
//! - **Internal**: an invariant violation that should never surface
//!
//! ## Examples
//!
//! ```rust
//! use toon_temporal::{decode, ErrorKind};
//!
//! let result = decode("key:\n   bad indent");
//! assert!(result.is_err());
//!
//! if let Err(err) = result {
//!     assert_eq!(err.kind(), ErrorKind::BadInput);
//!     eprintln!("parse error: {}", err);
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Uniform three-way classification callers translate into their host
/// runtime's error idiom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadInput,
    Overflow,
    Internal,
}

/// Represents all errors produced by this crate.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Rejected input: the message names the offending field or token.
    #[error("bad input: {0}")]
    BadInput(String),

    /// Rejected TOON text, with the physical line that caused it.
    #[error("bad input at line {line}: {msg}")]
    Syntax { line: usize, msg: String },

    /// Arithmetic or expansion left the representable range.
    #[error("overflow: {0}")]
    Overflow(String),

    /// Invariant violation; indicates a bug, not a caller mistake.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a `BadInput` error from any displayable message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toon_temporal::Error;
    ///
    /// let err = Error::bad_input("invalid zone id 'Not/A/Zone'");
    /// assert!(err.to_string().contains("Not/A/Zone"));
    /// ```
    pub fn bad_input<T: fmt::Display>(msg: T) -> Self {
        Error::BadInput(msg.to_string())
    }

    /// Creates a `BadInput` error anchored to a physical TOON line.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toon_temporal::Error;
    ///
    /// let err = Error::syntax(3, "expected 'key: value'");
    /// assert!(err.to_string().contains("line 3"));
    /// ```
    pub fn syntax<T: fmt::Display>(line: usize, msg: T) -> Self {
        Error::Syntax {
            line,
            msg: msg.to_string(),
        }
    }

    /// Creates an `Overflow` error.
    pub fn overflow<T: fmt::Display>(msg: T) -> Self {
        Error::Overflow(msg.to_string())
    }

    /// Creates an `Internal` error. Reaching this path is a bug.
    pub fn internal<T: fmt::Display>(msg: T) -> Self {
        Error::Internal(msg.to_string())
    }

    /// The uniform classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::BadInput(_) | Error::Syntax { .. } => ErrorKind::BadInput,
            Error::Overflow(_) => ErrorKind::Overflow,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
