//! Program metadata consumed by the analyses.
//!
//! Everything in here is produced by the loading/lifting collaborators and only read by the
//! call graph machinery:
//!
//! - [`token`] - stable arena identifiers for types and methods
//! - [`signature`] - owner-independent method signatures
//! - [`typesystem`] - the class/interface hierarchy and its builder
//! - [`method`] - method declarations, lifted bodies and the [`method::BodyProvider`] boundary

pub mod method;
pub mod signature;
pub mod token;
pub mod typesystem;
