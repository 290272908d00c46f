//! Test modules for the service crate.

pub mod mock;
