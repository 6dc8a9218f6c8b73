//! Buffer offset tagging.
//!
//! Some sinks (v4l2loopback in particular) expect `offset`/`offset_end` to
//! carry a running frame number. The probe rewrites both on every buffer
//! passing the pad.

use gstreamer as gst;
use gstreamer::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Install a buffer probe numbering buffers 1, 2, 3, ... on `pad`.
///
/// Each probe owns its counter, so tagging several pads never shares state.
pub fn tag_buffer_offsets(pad: &gst::Pad) -> Option<gst::PadProbeId> {
    let next = AtomicU64::new(1);
    debug!("Installing offset tagger on pad {}", pad.name());

    pad.add_probe(gst::PadProbeType::BUFFER, move |_pad, info| {
        if let Some(gst::PadProbeData::Buffer(ref mut buffer)) = info.data {
            let frame = next.fetch_add(1, Ordering::Relaxed);
            let buffer = buffer.make_mut();
            buffer.set_offset(frame);
            buffer.set_offset_end(frame + 1);
        }
        gst::PadProbeReturn::Ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_offsets_count_from_one() {
        gst::init().unwrap();
        let pipeline = gst::Pipeline::new();
        let src = gst::ElementFactory::make("videotestsrc")
            .property("num-buffers", 3i32)
            .build()
            .unwrap();
        let sink = gst::ElementFactory::make("fakesink").build().unwrap();
        pipeline.add_many([&src, &sink]).unwrap();
        src.link(&sink).unwrap();

        tag_buffer_offsets(&src.static_pad("src").unwrap()).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_probe = seen.clone();
        sink.static_pad("sink")
            .unwrap()
            .add_probe(gst::PadProbeType::BUFFER, move |_pad, info| {
                if let Some(gst::PadProbeData::Buffer(ref buffer)) = info.data {
                    seen_probe
                        .lock()
                        .unwrap()
                        .push((buffer.offset(), buffer.offset_end()));
                }
                gst::PadProbeReturn::Ok
            })
            .unwrap();

        pipeline.set_state(gst::State::Playing).unwrap();
        let bus = pipeline.bus().unwrap();
        let msg = bus
            .timed_pop_filtered(
                gst::ClockTime::from_seconds(10),
                &[gst::MessageType::Eos, gst::MessageType::Error],
            )
            .unwrap();
        assert_eq!(msg.type_(), gst::MessageType::Eos);
        pipeline.set_state(gst::State::Null).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![(1, 2), (2, 3), (3, 4)]);
    }
}
