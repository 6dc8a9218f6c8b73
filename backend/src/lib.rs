//! castrig: helpers for assembling a live multi-camera GStreamer pipeline.
//!
//! A [`PipelineContext`] owns the pipeline and its main loop. Elements are
//! created from [`castrig_types::ElementSpec`] descriptions, chained with
//! [`PipelineContext::add_and_link`], and attached to the source tees with
//! [`PipelineContext::link_request_pads`] or
//! [`PipelineContext::link_to_input_selector`].

pub mod config;
pub mod gst;

pub use gst::pipeline::{
    make_element, ContextState, ElementObserver, EventBridge, LoopControl, LoopHandle,
    MessageHandler, StatusLogger,
};
pub use gst::{add_test_sources, PipelineContext, PipelineError, SourceOptions, TestSources};
