use super::{make_element, PipelineContext, PipelineError};
use castrig_types::ElementSpec;
use gstreamer as gst;
use gstreamer::prelude::*;
use tracing::{debug, error};

/// Name of the request pad template on `input-selector`.
const SELECTOR_SINK_TEMPLATE: &str = "sink_%u";

fn pad_label(pad: &gst::Pad) -> String {
    match pad.parent_element() {
        Some(element) => format!("{}:{}", element.name(), pad.name()),
        None => pad.name().to_string(),
    }
}

fn link_pad_pair(from: &gst::Pad, to: &gst::Pad) -> Result<(), PipelineError> {
    from.link(to).map_err(|e| {
        error!("Failed to link {} -> {}: {:?}", pad_label(from), pad_label(to), e);
        PipelineError::LinkError {
            from: pad_label(from),
            to: pad_label(to),
            reason: format!("{:?}", e),
        }
    })?;
    debug!("Linked pads: {} -> {}", pad_label(from), pad_label(to));
    Ok(())
}

/// A resolved pad, and whether it was requested for this link.
struct ResolvedPad {
    pad: gst::Pad,
    requested: bool,
}

impl ResolvedPad {
    /// Give a requested pad back to its element after a failed link.
    fn release(self, element: &gst::Element) {
        if self.requested {
            debug!("Releasing request pad {}", pad_label(&self.pad));
            element.release_request_pad(&self.pad);
        }
    }
}

/// Get a pad by name: static pad first, then a request pad from the
/// template with that name, then a request pad by concrete name (`src_0`).
fn resolve_pad(element: &gst::Element, pad_name: &str) -> Result<ResolvedPad, PipelineError> {
    if let Some(pad) = element.static_pad(pad_name) {
        return Ok(ResolvedPad {
            pad,
            requested: false,
        });
    }

    let unavailable = || PipelineError::PadResolution {
        element: element.name().to_string(),
        pad: pad_name.to_string(),
    };

    if let Some(template) = element.pad_template(pad_name) {
        if template.presence() == gst::PadPresence::Request {
            let pad = element
                .request_pad(&template, None, None)
                .ok_or_else(unavailable)?;
            debug!(
                "Requested pad '{}' from template '{}' on {}",
                pad.name(),
                pad_name,
                element.name()
            );
            return Ok(ResolvedPad {
                pad,
                requested: true,
            });
        }
    }

    element
        .request_pad_simple(pad_name)
        .map(|pad| ResolvedPad {
            pad,
            requested: true,
        })
        .ok_or_else(unavailable)
}

fn link_queue(queue: &gst::Element, src_pad: &gst::Pad, sink_pad: &gst::Pad) -> Result<(), PipelineError> {
    let pad = |name: &str| {
        queue
            .static_pad(name)
            .ok_or_else(|| PipelineError::PadResolution {
                element: queue.name().to_string(),
                pad: name.to_string(),
            })
    };
    link_pad_pair(src_pad, &pad("sink")?)?;
    link_pad_pair(&pad("src")?, sink_pad)?;

    // Synced only once linked, like add_and_link
    queue
        .sync_state_with_parent()
        .map_err(|e| PipelineError::StateChange(format!("{}: {}", queue.name(), e)))
}

impl PipelineContext {
    /// Add elements to the pipeline and link them left to right.
    ///
    /// `None` entries are skipped, so optional stages can be written inline.
    /// Elements already in the pipeline are not added again. Returns the
    /// number of links made.
    pub fn add_and_link(&self, elements: &[Option<gst::Element>]) -> Result<usize, PipelineError> {
        let present: Vec<&gst::Element> = elements.iter().flatten().collect();
        let mut prev: Option<&gst::Element> = None;
        let mut links = 0;

        for &element in &present {
            self.ensure_added(element)?;

            if let Some(prev) = prev {
                prev.link(element).map_err(|e| {
                    error!("Failed to link {} -> {}: {}", prev.name(), element.name(), e);
                    PipelineError::LinkError {
                        from: prev.name().to_string(),
                        to: element.name().to_string(),
                        reason: e.to_string(),
                    }
                })?;
                debug!("Linked {} -> {}", prev.name(), element.name());
                links += 1;
            }
            prev = Some(element);
        }

        // Downstream first, so a live source never pushes into an unlinked pad
        for element in present.iter().rev() {
            element.sync_state_with_parent().map_err(|e| {
                PipelineError::StateChange(format!("{}: {}", element.name(), e))
            })?;
        }

        Ok(links)
    }

    fn ensure_added(&self, element: &gst::Element) -> Result<(), PipelineError> {
        let name = element.name();
        match self.pipeline.by_name(&name) {
            Some(existing) if &existing == element => {
                debug!("Element {} already in pipeline {}", name, self.name);
                Ok(())
            }
            Some(_) => Err(PipelineError::DuplicateName(name.to_string())),
            None => {
                self.pipeline.add(element)?;
                debug!("Added element {} to pipeline {}", name, self.name);
                Ok(())
            }
        }
    }

    /// Link a pad of `src` to a pad of `sink`, requesting pads as needed.
    ///
    /// With `use_queue`, a new `queue` sits between the two so producer and
    /// consumer run on separate streaming threads. Returns the sink-side pad.
    pub fn link_request_pads(
        &self,
        src: &gst::Element,
        src_pad_name: &str,
        sink: &gst::Element,
        sink_pad_name: &str,
        use_queue: bool,
    ) -> Result<gst::Pad, PipelineError> {
        let src_pad = resolve_pad(src, src_pad_name)?;
        let sink_pad = match resolve_pad(sink, sink_pad_name) {
            Ok(pad) => pad,
            Err(e) => {
                src_pad.release(src);
                return Err(e);
            }
        };

        let linked = if use_queue {
            self.link_through_queue(&src_pad.pad, &sink_pad.pad)
        } else {
            link_pad_pair(&src_pad.pad, &sink_pad.pad)
        };

        match linked {
            Ok(()) => Ok(sink_pad.pad),
            Err(e) => {
                src_pad.release(src);
                sink_pad.release(sink);
                Err(e)
            }
        }
    }

    /// Link `src_pad -> queue -> sink_pad` and bring the queue to the
    /// pipeline's state. On failure the queue is removed again.
    fn link_through_queue(&self, src_pad: &gst::Pad, sink_pad: &gst::Pad) -> Result<(), PipelineError> {
        let queue = make_element(&ElementSpec::new("queue"))?;
        self.pipeline.add(&queue)?;

        let linked = link_queue(&queue, src_pad, sink_pad);
        if linked.is_err() {
            // Removing from the bin unlinks the queue's pads
            let _ = queue.set_state(gst::State::Null);
            if let Err(e) = self.pipeline.remove(&queue) {
                error!("Failed to remove {} after link failure: {}", queue.name(), e);
            }
        }
        linked
    }

    /// Link `src` to a new sink pad of `selector` and make it the active one.
    pub fn link_to_input_selector(
        &self,
        src: &gst::Element,
        src_pad_name: &str,
        selector: &gst::Element,
    ) -> Result<gst::Pad, PipelineError> {
        if selector.find_property("active-pad").is_none() {
            return Err(PipelineError::InvalidProperty {
                element: selector.name().to_string(),
                property: "active-pad".to_string(),
                reason: "element is not a selector".to_string(),
            });
        }

        let pad = self.link_request_pads(src, src_pad_name, selector, SELECTOR_SINK_TEMPLATE, false)?;
        selector.set_property("active-pad", &pad);
        debug!("Active pad of {} is now {}", selector.name(), pad.name());
        Ok(pad)
    }
}
