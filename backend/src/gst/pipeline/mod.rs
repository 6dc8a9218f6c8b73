//! GStreamer pipeline context and graph assembly helpers.

mod bus;
mod factory;
mod lifecycle;
mod linking;
mod properties;

pub use bus::{bus_event, EventBridge, LoopControl, LoopHandle, MessageHandler, StatusLogger};
pub use factory::make_element;
pub use lifecycle::{ContextState, ElementObserver};
pub use properties::set_property;

use gstreamer as gst;
use gstreamer::glib;
use gstreamer::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("GStreamer error: {0}")]
    GStreamer(#[from] glib::Error),

    #[error("GStreamer boolean error: {0}")]
    BoolError(#[from] glib::BoolError),

    #[error("Unknown element kind: {0}")]
    UnknownElementKind(String),

    #[error("Failed to create element: {0}")]
    ElementCreation(String),

    #[error("Invalid property value for {element}.{property}: {reason}")]
    InvalidProperty {
        element: String,
        property: String,
        reason: String,
    },

    #[error("Failed to link {from} -> {to}: {reason}")]
    LinkError {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Pad not available: {element}:{pad}")]
    PadResolution { element: String, pad: String },

    #[error("Device unavailable: {0}")]
    DeviceUnavailable(PathBuf),

    #[error("Pipeline context already started")]
    DoubleInit,

    #[error("Another element is already named {0}")]
    DuplicateName(String),

    #[error("Pipeline state change failed: {0}")]
    StateChange(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Owns one GStreamer pipeline and the main loop that drains its bus.
///
/// Every helper that mutates the graph goes through a context, so tests can
/// build as many independent pipelines as they need.
pub struct PipelineContext {
    name: String,
    pipeline: gst::Pipeline,
    main_loop: glib::MainLoop,
    state: ContextState,
    /// Handlers consulted for every bus message, after the status logger
    handlers: Vec<Arc<dyn MessageHandler>>,
    /// Directory for DOT dumps; falls back to GST_DEBUG_DUMP_DOT_DIR when unset
    dot_dir: Option<PathBuf>,
    bus_handler: Option<glib::SignalHandlerId>,
    element_added_handler: Option<glib::SignalHandlerId>,
}

impl PipelineContext {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pipeline(&self) -> &gst::Pipeline {
        &self.pipeline
    }

    pub fn main_loop(&self) -> &glib::MainLoop {
        &self.main_loop
    }

    /// Find an element anywhere in the pipeline, including nested bins.
    pub fn by_name(&self, name: &str) -> Option<gst::Element> {
        self.pipeline.by_name(name)
    }
}

impl Drop for PipelineContext {
    fn drop(&mut self) {
        debug!("Dropping pipeline context: {}", self.name);
        self.teardown();
    }
}
