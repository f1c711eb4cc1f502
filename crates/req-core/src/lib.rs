//! # req-core
//!
//! Core types, ID helpers, and error types for ReqSmith.
//!
//! This crate provides the foundational types shared across all ReqSmith crates:
//! - Entity structs for the requirements domain (epics, stories, scenarios,
//!   quality reports, requirement sets, critiques)
//! - Status enums with state machine transitions
//! - ID prefix constants and formatting helpers
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
