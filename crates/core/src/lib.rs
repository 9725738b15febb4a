//! Tiffinbox Core - Shared types library.
//!
//! This crate provides common types used across all Tiffinbox components:
//! - `storefront` - Public-facing marketplace site
//! - `integration-tests` - Network-level tests against a running storefront
//!
//! # Architecture
//!
//! The core crate contains only types and pure domain logic - no I/O, no
//! HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, prices, the order lifecycle, and the
//!   pure cart model

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
