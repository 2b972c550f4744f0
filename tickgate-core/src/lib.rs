//! # tickgate-core
//!
//! Coordination substrate for a tick-driven real-time client.
//! Provides per-tick priority arbitration of shared values and a transit
//! buffer that holds, releases and cancels protocol messages without ever
//! reordering them within a direction.

pub mod arbiter;
pub mod buffer;
pub mod config;
pub mod decision;
pub mod infrastructure;
pub mod infrastructure_in_memory;
pub mod interceptor;
pub mod resources;
pub mod session;
pub mod types;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod buffer_test;
#[cfg(test)]
mod config_test;
#[cfg(test)]
mod types_test;
