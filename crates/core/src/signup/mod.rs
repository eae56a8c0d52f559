//! Multi-step signup form: field sets, step definitions, and the flow
//! controller that drives a visitor from the first step to completion.

pub mod fields;
pub mod flow;
pub mod session;
pub mod steps;

/// Endpoint every step submission is posted to.
pub const SIGNUP_ENDPOINT: &str = "/api/v1/signup";
