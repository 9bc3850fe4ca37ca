//! Feature flag subsystem.
//!
//! # Data Flow
//! ```text
//! inbound write
//!     → validator.rs (structural + cross-field + schema rules)
//!     → store.rs (read previous record, then write)
//!     → changelog (render audit line from previous/new state)
//!     → response
//!
//! inbound read
//!     → store.rs (scan hash → glob.rs filter → sort → cursor → limit)
//!     → response
//! ```
//!
//! # Design Decisions
//! - The store never validates; every write path goes through the service
//! - Schema-based rules live in an injected document, not in code

pub mod glob;
pub mod model;
pub mod schema;
pub mod service;
pub mod store;
pub mod validator;

pub use model::{FeatureFlag, FlagConfiguration, FlagState};
pub use service::{FlagService, UpsertError};
pub use store::{FlagStore, StoreError};
pub use validator::{FlagCandidate, FlagValidator, ValidationErrors};
