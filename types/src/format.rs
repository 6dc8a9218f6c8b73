//! Raw media formats the test source branches are normalized to.

use serde::{Deserialize, Serialize};

/// A raw video format, rendered as `video/x-raw` caps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFormat {
    /// Pixel format (e.g., "YV12", "RGB")
    pub format: String,
    pub width: u32,
    pub height: u32,
    /// Framerate as (numerator, denominator)
    pub framerate: (u32, u32),
}

impl VideoFormat {
    pub fn new(format: impl Into<String>, width: u32, height: u32, fps: u32) -> Self {
        Self {
            format: format.into(),
            width,
            height,
            framerate: (fps, 1),
        }
    }

    /// Format of the front camera branch.
    pub fn front_default() -> Self {
        Self::new("YV12", 640, 360, 15)
    }

    /// Format of the surface camera branch.
    pub fn surface_default() -> Self {
        Self::new("YV12", 1280, 720, 15)
    }

    pub fn caps_string(&self) -> String {
        format!(
            "video/x-raw,format={},width={},height={},framerate={}/{}",
            self.format, self.width, self.height, self.framerate.0, self.framerate.1
        )
    }
}

/// A raw audio format, rendered as `audio/x-raw` caps.
///
/// The sample format carries the bit depth (`U8`, `S16LE`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub format: String,
    pub rate: u32,
    pub channels: u32,
}

impl AudioFormat {
    pub fn caps_string(&self) -> String {
        format!(
            "audio/x-raw,format={},rate={},channels={}",
            self.format, self.rate, self.channels
        )
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            format: "U8".to_string(),
            rate: 48000,
            channels: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_caps_strings() {
        assert_eq!(
            VideoFormat::front_default().caps_string(),
            "video/x-raw,format=YV12,width=640,height=360,framerate=15/1"
        );
        assert_eq!(
            VideoFormat::surface_default().caps_string(),
            "video/x-raw,format=YV12,width=1280,height=720,framerate=15/1"
        );
        assert_eq!(
            AudioFormat::default().caps_string(),
            "audio/x-raw,format=U8,rate=48000,channels=1"
        );
    }

    #[test]
    fn test_fractional_framerate() {
        let mut format = VideoFormat::new("RGB", 1920, 1080, 30);
        format.framerate = (30000, 1001);
        assert!(format.caps_string().ends_with("framerate=30000/1001"));
    }
}
