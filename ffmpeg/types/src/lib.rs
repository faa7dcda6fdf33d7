/*!
    Shared types for the ffmpeg crate ecosystem.

    This crate defines the vocabulary of the ecosystem, the types that cross crate
    boundaries. It has no dependency on the native libraries, so consumers can
    depend on it without pulling in the bindings.

    # Core Types

    - [`Rational`] - Rational numbers for time bases and frame rates
    - [`Pts`] and [`MediaDuration`] - Timestamps in time_base units
    - [`VideoFrame`] - Decoded frame data in system memory
    - [`Packet`] - Encoded packet data

    # Format Types

    - [`PixelFormat`] - Video pixel formats, including hardware surfaces
    - [`CodecId`] - Codec identifiers
    - [`HwDeviceType`] - Hardware acceleration devices

    # Native Interop

    - [`abi`] - Error codes and version helpers mirroring the C macros
    - [`Error`] and [`Result`] - Common error types, native codes pass through unchanged
*/

pub mod abi;

mod codec;
mod error;
mod format;
mod frame;
mod hw;
mod packet;
mod rational;
mod stream;
mod timestamp;

pub use abi::LibraryVersion;
pub use codec::CodecId;
pub use error::{Error, Result};
pub use format::{PixelFormat, Plane};
pub use frame::VideoFrame;
pub use hw::{HwDeviceType, decoded_pixel_format};
pub use packet::Packet;
pub use rational::Rational;
pub use stream::{MediaInfo, VideoStreamInfo};
pub use timestamp::{MediaDuration, Pts};
