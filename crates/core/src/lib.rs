//! Balloon Fiesta Core - Shared domain types and shop rules.
//!
//! This crate provides everything the storefront and CLI agree on:
//! - `storefront` - Public-facing shop (retail, wholesale, admin)
//! - `cli` - Command-line tools for catalog checks and account hashes
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP,
//! no clocks. Anything time-dependent takes `now` as an argument so rules can
//! be tested against fixed instants.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, phones, and statuses
//! - [`pricing`] - Unit price resolution per account type and inflation choice
//! - [`settings`] - Shop-wide settings from the catalog document
//! - [`catalog`] - The `web.json` document, product lookups, and listing queries
//! - [`cart`] - Cart lines, merge-by-identity, minimums, and totals
//! - [`hours`] - Store hours, open/closed status, and pickup validation
//! - [`checkout`] - Checkout form validation
//! - [`order`] - Orders, wholesale requests, and CSV export
//! - [`password`] - Password strength scoring

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod hours;
pub mod order;
pub mod password;
pub mod pricing;
pub mod settings;
pub mod types;

pub use settings::ShopSettings;
pub use types::*;
