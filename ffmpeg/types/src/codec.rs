/*!
    Codec identification.
*/

/**
    Video codec identifiers.

    This is a subset of codecs commonly used in media pipelines.
    Not all native codecs are represented.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CodecId {
    /// H.264 / AVC
    H264,
    /// H.265 / HEVC
    H265,
    /// VP8
    Vp8,
    /// VP9
    Vp9,
    /// AV1
    Av1,
    /// MPEG-4 Part 2
    Mpeg4,
    /// MPEG-2 Video
    Mpeg2Video,
    /// Motion JPEG
    Mjpeg,
}

impl CodecId {
    /**
        Short codec name, as used for native encoder/decoder lookups.
    */
    pub const fn name(self) -> &'static str {
        match self {
            Self::H264 => "h264",
            Self::H265 => "hevc",
            Self::Vp8 => "vp8",
            Self::Vp9 => "vp9",
            Self::Av1 => "av1",
            Self::Mpeg4 => "mpeg4",
            Self::Mpeg2Video => "mpeg2video",
            Self::Mjpeg => "mjpeg",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(CodecId::H264.name(), "h264");
        assert_eq!(CodecId::H265.name(), "hevc");
    }
}
