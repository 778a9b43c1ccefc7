//! Shared fixtures for unit tests.

pub(crate) mod factories;
