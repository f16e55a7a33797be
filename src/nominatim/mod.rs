//! Client for the Nominatim-compatible search service.

mod candidate;
mod client;

pub use candidate::{CandidateAddress, SearchCandidate};
pub use client::{NominatimClient, SearchServiceError};
