//! Stream placeholders for the front camera, the surface camera and audio.
//!
//! Each branch is a source, a caps filter fixing the raw format, and a tee
//! that consumers attach to later with
//! [`PipelineContext::link_request_pads`].

use super::pipeline::{make_element, PipelineContext, PipelineError};
use castrig_types::{AudioFormat, ElementSpec, VideoFormat};
use gstreamer as gst;
use std::path::{Path, PathBuf};
use tracing::info;

pub const FRONT_TEE: &str = "fronttestsource";
pub const SURFACE_TEE: &str = "surfacetestsource";
pub const AUDIO_TEE: &str = "audiotestsource";

/// How to build the three source branches.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceOptions {
    /// Use test pattern generators instead of capture devices
    pub fake: bool,
    pub front_device: PathBuf,
    pub surface_device: PathBuf,
    /// ARGB background of the surface test pattern
    pub background_color: u32,
    /// Waveform of the audio test source
    pub wave: String,
    pub front_format: VideoFormat,
    pub surface_format: VideoFormat,
    pub audio_format: AudioFormat,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            fake: true,
            front_device: PathBuf::from("/dev/video0"),
            surface_device: PathBuf::from("/dev/video1"),
            background_color: 0xFF00FF00,
            wave: "ticks".to_string(),
            front_format: VideoFormat::front_default(),
            surface_format: VideoFormat::surface_default(),
            audio_format: AudioFormat::default(),
        }
    }
}

/// The tee terminating each branch.
#[derive(Debug, Clone)]
pub struct TestSources {
    pub front: gst::Element,
    pub surface: gst::Element,
    pub audio: gst::Element,
}

fn require_device(device: &Path) -> Result<&Path, PipelineError> {
    if device.exists() {
        Ok(device)
    } else {
        Err(PipelineError::DeviceUnavailable(device.to_path_buf()))
    }
}

// A virtual v4l2loopback device only negotiates when fed RGB.
fn live_video(device: &Path) -> Result<Vec<ElementSpec>, PipelineError> {
    let device = require_device(device)?;
    Ok(vec![
        ElementSpec::new("v4l2src")
            .property("do-timestamp", true)
            .property("device", device.to_string_lossy().into_owned()),
        ElementSpec::new("videorate"),
        ElementSpec::new("videoconvert"),
    ])
}

fn front_source(options: &SourceOptions) -> Result<Vec<ElementSpec>, PipelineError> {
    if options.fake {
        Ok(vec![ElementSpec::new("videotestsrc")
            .property("is-live", true)
            .property("pattern", "smpte")])
    } else {
        live_video(&options.front_device)
    }
}

fn surface_source(options: &SourceOptions) -> Result<Vec<ElementSpec>, PipelineError> {
    if options.fake {
        Ok(vec![ElementSpec::new("videotestsrc")
            .property("is-live", true)
            .property("pattern", "ball")
            .property("background-color", options.background_color)])
    } else {
        live_video(&options.surface_device)
    }
}

fn audio_source(options: &SourceOptions) -> Vec<ElementSpec> {
    if options.fake {
        vec![ElementSpec::new("audiotestsrc")
            .property("is-live", true)
            .property("wave", options.wave.as_str())]
    } else {
        vec![ElementSpec::new("alsasrc").property("do-timestamp", true)]
    }
}

/// Build `source ! capsfilter caps=<caps> ! tee name=<tee_name>` and return the tee.
fn add_branch(
    ctx: &PipelineContext,
    source: Vec<ElementSpec>,
    caps: String,
    tee_name: &str,
) -> Result<gst::Element, PipelineError> {
    let mut specs = source;
    specs.push(ElementSpec::new("capsfilter").property("caps", caps));

    let tee = make_element(
        &ElementSpec::new("tee")
            .name(tee_name)
            .property("allow-not-linked", true),
    )?;
    let mut elements = specs
        .iter()
        .map(|spec| make_element(spec).map(Some))
        .collect::<Result<Vec<_>, _>>()?;
    elements.push(Some(tee.clone()));

    ctx.add_and_link(&elements)?;
    Ok(tee)
}

/// Add the front, surface and audio branches to the pipeline.
pub fn add_test_sources(
    ctx: &PipelineContext,
    options: &SourceOptions,
) -> Result<TestSources, PipelineError> {
    info!(
        "Adding {} sources to pipeline {}",
        if options.fake { "test" } else { "live" },
        ctx.name()
    );

    let front = add_branch(
        ctx,
        front_source(options)?,
        options.front_format.caps_string(),
        FRONT_TEE,
    )?;
    let surface = add_branch(
        ctx,
        surface_source(options)?,
        options.surface_format.caps_string(),
        SURFACE_TEE,
    )?;
    let audio = add_branch(
        ctx,
        audio_source(options),
        options.audio_format.caps_string(),
        AUDIO_TEE,
    )?;

    Ok(TestSources {
        front,
        surface,
        audio,
    })
}
