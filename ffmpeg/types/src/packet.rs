/*!
    Encoded packet type.
*/

use crate::{MediaDuration, Pts, Rational};

/**
    An encoded media packet.

    Contains compressed data from a single stream, with timing information.
    Packets are the unit of data between demuxer and decoder, or between
    encoder and sink.
*/
#[derive(Clone, Debug)]
pub struct Packet {
    /// Compressed data.
    pub data: Vec<u8>,
    /// Presentation timestamp (when to display).
    pub pts: Option<Pts>,
    /// Decode timestamp (may differ from PTS for B-frames).
    pub dts: Option<Pts>,
    /// Duration of this packet's content.
    pub duration: MediaDuration,
    /// Time base for interpreting timestamps.
    pub time_base: Rational,
    /// Whether this is a keyframe (can be decoded independently).
    pub is_keyframe: bool,
    /// Index of the stream in the container this packet belongs to.
    pub stream_index: usize,
}

impl Packet {
    /**
        Create a packet carrying only data, e.g. for feeding a decoder.
    */
    pub fn from_data(data: Vec<u8>, time_base: Rational) -> Self {
        Self {
            data,
            pts: None,
            dts: None,
            duration: MediaDuration::default(),
            time_base,
            is_keyframe: false,
            stream_index: 0,
        }
    }

    /**
        Returns the presentation time as a Duration, if PTS is set.
    */
    pub fn presentation_time(&self) -> Option<std::time::Duration> {
        self.pts.map(|pts| pts.to_duration(self.time_base))
    }

    /**
        Returns true for the empty packet used to signal end of stream.
    */
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

static_assertions::assert_impl_all!(Packet: Send, Sync);
