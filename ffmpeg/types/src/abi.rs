/*!
    Helpers mirroring the C preprocessor macros of the native libraries.

    These are the few pieces of the native headers that are not exported as
    symbols (they only exist as macros), so they have to be reproduced to
    interpret return codes and version numbers.
*/

use std::fmt;

/**
    `EAGAIN` as reported by the platform C library.

    Apple platforms use a different errno numbering from Linux and Windows.
*/
#[cfg(any(target_os = "macos", target_os = "ios"))]
pub const EAGAIN: i32 = 35;
#[cfg(not(any(target_os = "macos", target_os = "ios")))]
pub const EAGAIN: i32 = 11;

pub const ENOMEM: i32 = 12;
pub const EINVAL: i32 = 22;
pub const EPIPE: i32 = 32;

/**
    End of file, `FFERRTAG('E', 'O', 'F', ' ')`.
*/
pub const AVERROR_EOF: i32 = fferrtag(b'E', b'O', b'F', b' ');

/**
    Decoder or demuxer found invalid input, `FFERRTAG('I', 'N', 'D', 'A')`.
*/
pub const AVERROR_INVALIDDATA: i32 = fferrtag(b'I', b'N', b'D', b'A');

/**
    Requested decoder was not found, `FFERRTAG(0xF8, 'D', 'E', 'C')`.
*/
pub const AVERROR_DECODER_NOT_FOUND: i32 = fferrtag(0xF8, b'D', b'E', b'C');

/**
    Requested encoder was not found, `FFERRTAG(0xF8, 'E', 'N', 'C')`.
*/
pub const AVERROR_ENCODER_NOT_FOUND: i32 = fferrtag(0xF8, b'E', b'N', b'C');

/**
    Packs four bytes into a little-endian tag, `MKTAG(a, b, c, d)`.
*/
pub const fn mktag(a: u8, b: u8, c: u8, d: u8) -> i32 {
    (a as u32 | (b as u32) << 8 | (c as u32) << 16 | (d as u32) << 24) as i32
}

/**
    Negated tag used for library specific error codes, `FFERRTAG(a, b, c, d)`.
*/
pub const fn fferrtag(a: u8, b: u8, c: u8, d: u8) -> i32 {
    mktag(a, b, c, d).wrapping_neg()
}

/**
    Converts a positive errno value into a native error code, `AVERROR(e)`.
*/
pub const fn averror(errno: i32) -> i32 {
    -errno
}

/**
    Converts a native error code back into a positive errno value, `AVUNERROR(e)`.
*/
pub const fn avunerror(code: i32) -> i32 {
    -code
}

/**
    Packs a version triple, `AV_VERSION_INT(a, b, c)`.
*/
pub const fn version_int(major: u32, minor: u32, micro: u32) -> u32 {
    major << 16 | minor << 8 | micro
}

/**
    Formats a version triple, `AV_VERSION_DOT(a, b, c)`.
*/
pub fn version_dot(major: u32, minor: u32, micro: u32) -> String {
    format!("{major}.{minor}.{micro}")
}

/**
    Same as [`version_dot`], `AV_VERSION(a, b, c)`.
*/
pub fn version(major: u32, minor: u32, micro: u32) -> String {
    version_dot(major, minor, micro)
}

/**
    A decoded library version, as returned by `avcodec_version()` and friends.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LibraryVersion {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
}

impl LibraryVersion {
    /**
        Unpack a value produced by `AV_VERSION_INT`.
    */
    pub const fn from_int(value: u32) -> Self {
        Self {
            major: value >> 16,
            minor: (value >> 8) & 0xff,
            micro: value & 0xff,
        }
    }

    /**
        Pack back into the `AV_VERSION_INT` representation.
    */
    pub const fn to_int(self) -> u32 {
        version_int(self.major, self.minor, self.micro)
    }
}

impl fmt::Display for LibraryVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)
    }
}
