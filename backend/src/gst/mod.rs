//! GStreamer integration.

pub mod pipeline;
pub mod probe;
pub mod sources;

pub use pipeline::{PipelineContext, PipelineError};
pub use probe::tag_buffer_offsets;
pub use sources::{add_test_sources, SourceOptions, TestSources};
