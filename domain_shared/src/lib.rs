//! `domain_shared`
//!
//! Configuration objects that parameterize procedurally generated levels.
//!
//! Design goals:
//! - One tagged variant per generation domain, no trait objects.
//! - Every write to disk goes through the same filtered serialization.
//! - Updates snapshot the previous state before overwriting it.
//! - No `unsafe`.

pub mod bossfight;
pub mod error;
pub mod lifecycle;
pub mod registry;
pub mod schema;
pub mod value;

pub use error::{DomainError, Result};
pub use lifecycle::{DomainConfig, UpdateReport};

pub mod prelude {
    //! Commonly used exports.

    pub use crate::bossfight::*;
    pub use crate::error::DomainError;
    pub use crate::lifecycle::*;
    pub use crate::registry::*;
    pub use crate::schema::*;
    pub use crate::value::*;
}
