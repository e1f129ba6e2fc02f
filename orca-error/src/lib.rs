//! # orca-error
//!
//! Unified error handling for orca - following OpenDAL's error handling practices.
//!
//! ## Design Philosophy
//!
//! - **ErrorKind**: Know what error occurred (e.g., NoCodeBlocks, AuthenticationFailed)
//! - **ErrorStatus**: Decide how to handle it (Permanent, Temporary, Persistent)
//! - **Error Context**: Assist in locating the cause with rich context
//! - **Error Source**: Wrap underlying errors without leaking raw types
//!
//! ## Usage
//!
//! ```rust
//! use orca_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::ModelNotFound, "model 'gpt-5' does not exist")
//!         .with_operation("provider::openai::complete")
//!         .with_context("model", "gpt-5"))
//! }
//! ```
//!
//! ## Principles
//!
//! - All functions return `Result<T, orca_error::Error>`
//! - External errors are wrapped with `set_source(err)`
//! - Same error handled once, subsequent ops only append context
//! - Don't abuse `From<OtherError>` to prevent raw error leakage

mod error;
mod kind;
mod status;

pub use error::Error;
pub use kind::ErrorKind;
pub use status::ErrorStatus;

/// Result type alias using orca Error
pub type Result<T> = std::result::Result<T, Error>;
