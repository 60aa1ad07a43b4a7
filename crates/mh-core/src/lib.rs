//! # mh-core
//!
//! Core types shared across the mhouse construction-tracking crates.
//!
//! This crate provides:
//! - Entity structs for houses, posts, house–post links, week infos and week marks
//! - Strongly typed IDs and the audit ID prefix
//! - Status and audit-operation enums
//! - Validated value objects (brigade, metrics, date spans, comments)
//! - Audit record types and their JSON response mapping
//! - Request shapes for business writes
//! - The `Actor` identity threaded through every write
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod requests;
pub mod responses;
pub mod values;
