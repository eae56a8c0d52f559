//! Request extractors.
//!
//! - [`campaign::CurrentCampaign`] -- Resolves the campaign served on the request's host.

pub mod campaign;
