/*!
    Versions of the linked native libraries.
*/

use std::ffi::CStr;

use ffmpeg_next::ffi;

use ffmpeg_types::LibraryVersion;

/**
    The FFmpeg build string (`av_version_info`), e.g. "7.1" or "n7.1-3-gabc".
*/
pub fn version_info() -> String {
    // SAFETY: returns a pointer to a static string.
    let ptr = unsafe { ffi::av_version_info() };
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

/**
    Runtime versions of the linked libraries, keyed by library name.
*/
pub fn library_versions() -> Vec<(&'static str, LibraryVersion)> {
    // SAFETY: the version functions take no arguments and have no side effects.
    unsafe {
        vec![
            ("avutil", LibraryVersion::from_int(ffi::avutil_version())),
            ("avcodec", LibraryVersion::from_int(ffi::avcodec_version())),
            ("avformat", LibraryVersion::from_int(ffi::avformat_version())),
            ("swscale", LibraryVersion::from_int(ffi::swscale_version())),
            ("swresample", LibraryVersion::from_int(ffi::swresample_version())),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_info_is_not_empty() {
        assert!(!version_info().is_empty());
    }

    #[test]
    fn runtime_avutil_matches_headers() {
        let versions = library_versions();
        assert_eq!(versions.len(), 5);
        let (name, avutil) = versions[0];
        assert_eq!(name, "avutil");
        assert_eq!(avutil.major, ffi::LIBAVUTIL_VERSION_MAJOR);
    }
}
