//! Aabhushan Core - Shared types library.
//!
//! This crate provides common types used across all Aabhushan components:
//! - `storefront` - Public API server (catalog, identity sync, admin API)
//! - `cli` - Command-line tools for user management and webhook testing
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no document store access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for identity ids, emails, roles, prices and categories

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
