//! Read, check, and enumerate files with first-match fallback.
//!
//! [`FileLoader`] does everything with blocking `std::fs` calls and
//! [`AsyncFileLoader`] mirrors it on `tokio::fs`. Checks answer `false` or
//! `None` on I/O errors; loads report them.

pub mod checksum;
pub mod config;
pub mod error;
pub mod loader;

pub use error::{LoaderError, Result};
pub use loader::extension::normalize as normalize_extension;
pub use loader::{AsyncFileLoader, FileLoader, ListOptions, LoadedFile};
