//! Domain models for storefront.
//!
//! - [`account`] - Shop accounts (predefined and self-registered)
//! - [`session`] - Types stored in the visitor's session

pub mod account;
pub mod session;

pub use account::Account;
pub use session::{Notice, NoticeKind, Shopper, keys as session_keys};
