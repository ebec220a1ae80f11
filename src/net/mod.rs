//! Networking: the transport seam and the REST wire schema.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` sends requests, `types` defines the JSON exchanged with the
//! backend. The auth and image clients sit on top of both.

#[cfg(test)]
pub(crate) mod stub;
pub mod transport;
pub mod types;
