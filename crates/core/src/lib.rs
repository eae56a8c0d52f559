//! Domain layer for campaign signup pages.
//!
//! Holds everything that does not touch a socket or a database connection:
//! page-code normalization, locale links, the page resolver over the
//! [`store`] traits, and the multi-step signup flow controller.

pub mod error;
pub mod locale;
pub mod page;
pub mod page_code;
pub mod resolver;
pub mod signup;
pub mod store;
pub mod types;
