/*!
    Decoder configuration types.
*/

use ffmpeg_types::HwDeviceType;

/**
    Configuration for video decoder.
*/
#[derive(Clone, Debug, Default)]
pub struct VideoDecoderConfig {
    /// Prefer hardware decoding if available.
    pub prefer_hw: bool,
    /// Specific hardware device to use (None = pick from the available ones).
    pub hw_device: Option<HwDeviceType>,
}

impl VideoDecoderConfig {
    /**
        Create a new config with default settings (software decoding).
    */
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Create a config that prefers hardware acceleration.

        The device is chosen with [`HwDeviceType::preferred`] among the
        devices the linked libraries support.
    */
    pub fn with_hw_accel() -> Self {
        Self {
            prefer_hw: true,
            hw_device: None,
        }
    }

    /**
        Create a config with a specific hardware device.
    */
    pub fn with_hw_device(device: HwDeviceType) -> Self {
        Self {
            prefer_hw: true,
            hw_device: Some(device),
        }
    }

    /**
        Config for an optional device, software decoding for `None`.
    */
    pub fn from_device(device: Option<HwDeviceType>) -> Self {
        device.map(Self::with_hw_device).unwrap_or_default()
    }
}
