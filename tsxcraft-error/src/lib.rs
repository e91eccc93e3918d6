//! # tsxcraft-error
//!
//! Unified error handling for tsxcraft.
//!
//! ## Design Philosophy
//!
//! - **ErrorKind**: Know what error occurred (e.g., FileNotFound, OffsetOutOfRange)
//! - **ErrorStatus**: Decide how to handle it (Permanent, Temporary, Persistent)
//! - **Error Context**: Assist in locating the cause with rich context
//! - **Error Source**: Wrap underlying errors without leaking raw types
//!
//! ## Usage
//!
//! ```rust
//! use tsxcraft_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::FileNotFound, "TSX file 'Card.tsx' not found")
//!         .with_operation("files::read")
//!         .with_context("path", "Card.tsx"))
//! }
//! ```
//!
//! ## Principles
//!
//! - All functions return `Result<T, tsxcraft_error::Error>`
//! - External errors are wrapped with `set_source(err)`
//! - Same error handled once, subsequent ops only append context
//! - Tool-facing errors are rendered from `message()`, never from `Debug`

mod error;
mod kind;
mod status;

pub use error::Error;
pub use kind::ErrorKind;
pub use status::ErrorStatus;

/// Result type alias using tsxcraft Error
pub type Result<T> = std::result::Result<T, Error>;
