//! `crewdesk-core`: domain primitives shared by every crate.
//!
//! Nothing here knows about HTTP, tokens or storage.

pub mod business;
pub mod error;
pub mod id;

pub use business::BusinessType;
pub use error::{DomainError, DomainResult};
pub use id::UserId;
