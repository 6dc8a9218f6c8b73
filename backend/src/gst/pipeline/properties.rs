use super::PipelineError;
use castrig_types::PropertyValue;
use gstreamer as gst;
use gstreamer::glib;
use gstreamer::prelude::*;
use std::fmt::Display;
use tracing::debug;

/// A numeric property value before it is narrowed to the property's type.
#[derive(Debug, Clone, Copy)]
enum Number {
    Integer(i128),
    Real(f64),
}

impl Number {
    fn from_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Int(v) => Some(Number::Integer(i128::from(*v))),
            PropertyValue::UInt(v) => Some(Number::Integer(i128::from(*v))),
            PropertyValue::Float(v) => Some(Number::Real(*v)),
            PropertyValue::String(s) => {
                let s = s.trim();
                s.parse::<i128>()
                    .map(Number::Integer)
                    .or_else(|_| s.parse::<f64>().map(Number::Real))
                    .ok()
            }
            PropertyValue::Bool(_) => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Integer(v) => v as f64,
            Number::Real(v) => v,
        }
    }
}

fn integer_value<T>(number: Number, min: T, max: T) -> Result<glib::Value, String>
where
    T: TryFrom<i128> + PartialOrd + Display + ToValue,
{
    let Number::Integer(n) = number else {
        return Err(format!("expected an integer, got {}", number.as_f64()));
    };
    let v = T::try_from(n).map_err(|_| format!("value {} doesn't fit the property type", n))?;
    if v < min || v > max {
        return Err(format!("value {} outside range [{}, {}]", v, min, max));
    }
    Ok(v.to_value())
}

fn real_value<T>(v: T, min: T, max: T) -> Result<glib::Value, String>
where
    T: PartialOrd + Display + ToValue,
{
    if v < min || v > max {
        return Err(format!("value {} outside range [{}, {}]", v, min, max));
    }
    Ok(v.to_value())
}

/// Convert `value` for a numeric property. Returns `None` if the property
/// is not numeric.
fn numeric_value(
    pspec: &glib::ParamSpec,
    value: &PropertyValue,
) -> Option<Result<glib::Value, String>> {
    let parsed = Number::from_value(value);
    let number = || parsed.ok_or_else(|| format!("expected a number, got {}", value.kind()));

    let result = if let Some(p) = pspec.downcast_ref::<glib::ParamSpecInt>() {
        number().and_then(|n| integer_value(n, p.minimum(), p.maximum()))
    } else if let Some(p) = pspec.downcast_ref::<glib::ParamSpecUInt>() {
        number().and_then(|n| integer_value(n, p.minimum(), p.maximum()))
    } else if let Some(p) = pspec.downcast_ref::<glib::ParamSpecInt64>() {
        number().and_then(|n| integer_value(n, p.minimum(), p.maximum()))
    } else if let Some(p) = pspec.downcast_ref::<glib::ParamSpecUInt64>() {
        number().and_then(|n| integer_value(n, p.minimum(), p.maximum()))
    } else if let Some(p) = pspec.downcast_ref::<glib::ParamSpecDouble>() {
        number().and_then(|n| real_value(n.as_f64(), p.minimum(), p.maximum()))
    } else if let Some(p) = pspec.downcast_ref::<glib::ParamSpecFloat>() {
        number().and_then(|n| real_value(n.as_f64() as f32, p.minimum(), p.maximum()))
    } else {
        return None;
    };
    Some(result)
}

fn display_value(value: &PropertyValue) -> String {
    match value {
        PropertyValue::String(v) => v.clone(),
        PropertyValue::Int(v) => v.to_string(),
        PropertyValue::UInt(v) => v.to_string(),
        PropertyValue::Float(v) => v.to_string(),
        PropertyValue::Bool(v) => v.to_string(),
    }
}

/// Set a property on an element.
///
/// Strings are deserialized against the property's type (enum nicks, caps,
/// flags); numbers are narrowed to the property's exact type and checked
/// against its range. Any mismatch is returned as
/// [`PipelineError::InvalidProperty`] instead of panicking.
pub fn set_property(
    element: &gst::Element,
    element_name: &str,
    prop_name: &str,
    prop_value: &PropertyValue,
) -> Result<(), PipelineError> {
    debug!(
        "Setting property: {}.{} = {:?}",
        element_name, prop_name, prop_value
    );

    let invalid = |reason: String| PipelineError::InvalidProperty {
        element: element_name.to_string(),
        property: prop_name.to_string(),
        reason,
    };

    let pspec = element
        .find_property(prop_name)
        .ok_or_else(|| invalid("no such property".to_string()))?;

    let flags = pspec.flags();
    if !flags.contains(glib::ParamFlags::WRITABLE) {
        return Err(invalid("property is not writable".to_string()));
    }
    if flags.contains(glib::ParamFlags::CONSTRUCT_ONLY) {
        return Err(invalid(
            "property can only be set at construction".to_string(),
        ));
    }

    let value = match numeric_value(&pspec, prop_value) {
        Some(result) => result.map_err(invalid)?,
        None => match prop_value {
            PropertyValue::Bool(v) if pspec.value_type() == glib::Type::BOOL => v.to_value(),
            other => {
                let text = display_value(other);
                glib::Value::deserialize_with_pspec(&text, &pspec).map_err(|_| {
                    invalid(format!(
                        "cannot parse '{}' as {}",
                        text,
                        pspec.value_type().name()
                    ))
                })?
            }
        },
    };

    element.set_property_from_value(prop_name, &value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(kind: &str) -> gst::Element {
        gst::init().unwrap();
        gst::ElementFactory::make(kind).build().unwrap()
    }

    #[test]
    fn test_enum_from_nick() {
        let src = make("videotestsrc");
        let reference = make("videotestsrc");
        let default = format!("{:?}", src.property_value("pattern"));

        set_property(&src, "src", "pattern", &"ball".into()).unwrap();
        reference.set_property_from_str("pattern", "ball");

        let pattern = format!("{:?}", src.property_value("pattern"));
        assert_ne!(pattern, default);
        assert_eq!(pattern, format!("{:?}", reference.property_value("pattern")));
    }

    #[test]
    fn test_unsigned_color() {
        let src = make("videotestsrc");
        set_property(
            &src,
            "src",
            "background-color",
            &PropertyValue::UInt(0xFF00FF00),
        )
        .unwrap();
        assert_eq!(src.property::<u32>("background-color"), 0xFF00FF00);
    }

    #[test]
    fn test_bool_and_int() {
        let src = make("videotestsrc");
        set_property(&src, "src", "is-live", &true.into()).unwrap();
        set_property(&src, "src", "num-buffers", &PropertyValue::Int(10)).unwrap();
        assert!(src.property::<bool>("is-live"));
        assert_eq!(src.property::<i32>("num-buffers"), 10);
    }

    #[test]
    fn test_numeric_string() {
        let src = make("videotestsrc");
        set_property(&src, "src", "num-buffers", &"25".into()).unwrap();
        assert_eq!(src.property::<i32>("num-buffers"), 25);
    }

    #[test]
    fn test_caps_from_string() {
        let filter = make("capsfilter");
        set_property(
            &filter,
            "filter",
            "caps",
            &"video/x-raw,format=YV12,width=640,height=360,framerate=15/1".into(),
        )
        .unwrap();
        let caps = filter.property::<gst::Caps>("caps");
        let s = caps.structure(0).unwrap();
        assert_eq!(s.name().as_str(), "video/x-raw");
        assert_eq!(s.get::<i32>("width").unwrap(), 640);
    }

    #[test]
    fn test_unknown_property() {
        let src = make("videotestsrc");
        let err = set_property(&src, "src", "no-such-thing", &true.into()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidProperty { ref property, .. } if property == "no-such-thing"));
    }

    #[test]
    fn test_out_of_range_and_wrong_type() {
        let src = make("videotestsrc");
        // num-buffers is a gint with minimum -1
        let err = set_property(&src, "src", "num-buffers", &PropertyValue::Int(-5)).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidProperty { .. }));

        let err = set_property(&src, "src", "num-buffers", &PropertyValue::Float(1.5)).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidProperty { .. }));

        let err = set_property(&src, "src", "pattern", &"no-such-pattern".into()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidProperty { .. }));
    }

    #[test]
    fn test_read_only_property() {
        let queue = make("queue");
        let err = set_property(&queue, "queue", "current-level-buffers", &PropertyValue::UInt(1))
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidProperty { ref reason, .. } if reason.contains("not writable")));
    }
}
