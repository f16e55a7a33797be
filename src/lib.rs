//! Tamarack - address resolution for messy, human-entered postal addresses
//!
//! This library provides shared types and modules for the batch and serve
//! binaries: normalization/repair of raw address text, structured tagging,
//! a cascading search against a Nominatim-compatible service, per-candidate
//! validation, fuzzy road matching against the TIGER road reference store,
//! and range interpolation when no exact match exists.

pub mod config;
pub mod error;
pub mod fuzzy;
pub mod nominatim;
pub mod normalize;
pub mod reference;
pub mod resolver;
pub mod tagger;
pub mod tiger;
pub mod validate;

pub use config::Config;
pub use error::ResolveError;
pub use resolver::{Resolution, Resolver};
