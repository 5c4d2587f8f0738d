// src/filters/mod.rs
pub mod identifier;

// Re-export the filter for convenience
pub use identifier::IdentifierFilter;
