use super::{set_property, PipelineError};
use castrig_types::ElementSpec;
use gstreamer as gst;
use gstreamer::prelude::*;
use tracing::{debug, error};

/// Create an element from its description and apply its properties in order.
///
/// Nothing is added to a pipeline here.
pub fn make_element(spec: &ElementSpec) -> Result<gst::Element, PipelineError> {
    if gst::ElementFactory::find(&spec.kind).is_none() {
        return Err(PipelineError::UnknownElementKind(spec.kind.clone()));
    }

    let builder = gst::ElementFactory::make(&spec.kind);
    let builder = match &spec.name {
        Some(name) => builder.name(name),
        None => builder,
    };
    let element = builder.build().map_err(|e| {
        error!("Failed to create element of kind {}: {}", spec.kind, e);
        PipelineError::ElementCreation(format!("{}: {}", spec.kind, e))
    })?;

    let element_name = element.name();
    debug!("Created element {} (type: {})", element_name, spec.kind);

    for (prop_name, prop_value) in &spec.properties {
        set_property(&element, &element_name, prop_name, prop_value)?;
    }

    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_element_with_properties() {
        gst::init().unwrap();
        let tee = make_element(
            &ElementSpec::new("tee")
                .name("fronttestsource")
                .property("allow-not-linked", true),
        )
        .unwrap();

        assert_eq!(tee.name().as_str(), "fronttestsource");
        assert!(tee.property::<bool>("allow-not-linked"));
    }

    #[test]
    fn test_default_name_from_kind() {
        gst::init().unwrap();
        let queue = make_element(&ElementSpec::new("queue")).unwrap();
        assert!(queue.name().starts_with("queue"));
    }

    #[test]
    fn test_unknown_kind() {
        gst::init().unwrap();
        let err = make_element(&ElementSpec::new("nonexistentelement")).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownElementKind(ref kind) if kind == "nonexistentelement"));
    }

    #[test]
    fn test_invalid_property_fails_creation() {
        gst::init().unwrap();
        let err = make_element(&ElementSpec::new("tee").property("wave", "ticks")).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidProperty { ref property, .. } if property == "wave"));
    }
}
