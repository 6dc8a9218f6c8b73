//! Shared types for the castrig pipeline helpers.
//!
//! This crate holds the GStreamer-free data model: element descriptions,
//! property values, bus events and raw media formats.

pub mod element;
pub mod events;
pub mod format;

// Re-export commonly used types
pub use element::{ElementSpec, PropertyValue};
pub use events::BusEvent;
pub use format::{AudioFormat, VideoFormat};
