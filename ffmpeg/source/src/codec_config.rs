/*!
    Opaque codec configuration for passing to decoders.
*/

use ffmpeg_next::codec;

use ffmpeg_types::CodecId;

use ffmpeg_native::convert::codec_id_from_native;

/**
    Codec parameters of a source stream.

    Hides the ffmpeg-next parameters type from the public API of the source.
    Pass this to `ffmpeg-decode` to create a decoder for the stream.
*/
pub struct CodecConfig {
    parameters: codec::Parameters,
}

impl CodecConfig {
    pub(crate) fn new(parameters: codec::Parameters) -> Self {
        Self { parameters }
    }

    pub fn codec_id(&self) -> Option<CodecId> {
        codec_id_from_native(self.parameters.id())
    }

    /**
        Short native name of the codec, e.g. "h264" or "rawvideo".
    */
    pub fn codec_name(&self) -> &'static str {
        self.parameters.id().name()
    }

    pub fn parameters(&self) -> &codec::Parameters {
        &self.parameters
    }

    pub fn into_parameters(self) -> codec::Parameters {
        self.parameters
    }
}

impl Clone for CodecConfig {
    fn clone(&self) -> Self {
        Self {
            parameters: self.parameters.clone(),
        }
    }
}

impl std::fmt::Debug for CodecConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecConfig")
            .field("codec", &self.codec_name())
            .finish_non_exhaustive()
    }
}
