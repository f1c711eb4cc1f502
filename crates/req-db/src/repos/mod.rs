//! Repository modules implementing CRUD operations for all ReqSmith entities.
//!
//! Each module adds methods to `ReqDb` via `impl ReqDb` blocks.

pub mod cache;
pub mod epic;
pub mod scenario;
pub mod story;
