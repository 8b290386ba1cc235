// src/extractors/mod.rs
pub mod listing;

// Re-export key extraction types for convenience
pub use listing::{
    ExtractOptions,
    ListingExtractor,
    ListingRecord,
    MissingDetails,
    DATA_UNAVAILABLE,
    LISTING_HEADERS,
};
