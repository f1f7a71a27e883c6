//! # Agora Core
//!
//! The domain layer of the explore feed.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! the feed query service, the engagement recorder, and the ports they depend on.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, RepoError};
pub use services::{EngagementRecorder, FeedService, FeedSettings};
