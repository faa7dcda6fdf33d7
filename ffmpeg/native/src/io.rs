/*!
    Accessor view over a native `AVIOContext`.
*/

use std::ffi::{CStr, CString, c_char, c_int};
use std::ptr::{self, NonNull};

use ffmpeg_next::ffi;

use ffmpeg_types::{Error, Result};

const SEEK_CUR: c_int = 1;

/**
    A byte stream context owned by FFmpeg.

    Getters and setters read and write the native struct fields directly.
    A context marked as owned is closed exactly once when dropped, a
    borrowed one is left alone.
*/
pub struct IoContext {
    ptr: NonNull<ffi::AVIOContext>,
    owned: bool,
}

// SAFETY: the context is only reached through &self/&mut self, never shared
// between threads without synchronization.
unsafe impl Send for IoContext {}

impl IoContext {
    /**
        Wrap a raw pointer, returning `None` for null.

        # Safety

        `ptr` must point to a valid context for the lifetime of the view.
        When `owned` is true, nothing else may close it.
    */
    pub unsafe fn from_raw(ptr: *mut ffi::AVIOContext, owned: bool) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr, owned })
    }

    /**
        Open a URL (or plain path) for writing.
    */
    pub fn open_write(url: &str) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;

        let c_url = CString::new(url).map_err(|_| Error::invalid_data("url contains a nul byte"))?;
        let mut pb: *mut ffi::AVIOContext = ptr::null_mut();
        let ret = unsafe { ffi::avio_open(&mut pb, c_url.as_ptr(), ffi::AVIO_FLAG_WRITE as c_int) };
        if ret < 0 {
            tracing::debug!(url, code = ret, "avio_open failed");
            return Err(Error::from_native(ret));
        }

        unsafe { Self::from_raw(pb, true) }.ok_or_else(|| Error::codec("avio_open returned no context"))
    }

    pub fn as_ptr(&self) -> *const ffi::AVIOContext {
        self.ptr.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut ffi::AVIOContext {
        self.ptr.as_ptr()
    }

    pub fn is_owned(&self) -> bool {
        self.owned
    }

    fn raw(&self) -> &ffi::AVIOContext {
        unsafe { self.ptr.as_ref() }
    }

    fn raw_mut(&mut self) -> &mut ffi::AVIOContext {
        unsafe { self.ptr.as_mut() }
    }

    pub fn buffer_size(&self) -> i32 {
        self.raw().buffer_size
    }

    /// Position in the underlying resource of the start of the buffer.
    pub fn position(&self) -> i64 {
        self.raw().pos
    }

    pub fn eof_reached(&self) -> bool {
        self.raw().eof_reached != 0
    }

    /**
        The sticky error recorded by the last failed operation, if any.
    */
    pub fn error(&self) -> Option<Error> {
        let code = self.raw().error;
        (code < 0).then(|| Error::from_native(code))
    }

    pub fn write_flag(&self) -> bool {
        self.raw().write_flag != 0
    }

    /// Raw `AVIO_SEEKABLE_*` flags.
    pub fn seekable(&self) -> i32 {
        self.raw().seekable
    }

    pub fn is_seekable(&self) -> bool {
        self.seekable() & ffi::AVIO_SEEKABLE_NORMAL as i32 != 0
    }

    pub fn direct(&self) -> bool {
        self.raw().direct != 0
    }

    pub fn set_direct(&mut self, direct: bool) {
        self.raw_mut().direct = c_int::from(direct);
    }

    pub fn max_packet_size(&self) -> i32 {
        self.raw().max_packet_size
    }

    pub fn set_max_packet_size(&mut self, size: i32) {
        self.raw_mut().max_packet_size = size;
    }

    pub fn min_packet_size(&self) -> i32 {
        self.raw().min_packet_size
    }

    pub fn set_min_packet_size(&mut self, size: i32) {
        self.raw_mut().min_packet_size = size;
    }

    pub fn checksum(&self) -> u64 {
        self.raw().checksum as u64
    }

    pub fn protocol_whitelist(&self) -> Option<String> {
        string_field(self.raw().protocol_whitelist)
    }

    pub fn protocol_blacklist(&self) -> Option<String> {
        string_field(self.raw().protocol_blacklist)
    }

    /**
        Current byte offset, including data still sitting in the buffer.
    */
    pub fn tell(&mut self) -> Result<i64> {
        let pos = unsafe { ffi::avio_seek(self.as_mut_ptr(), 0, SEEK_CUR) };
        if pos < 0 {
            return Err(Error::from_native(pos as i32));
        }
        Ok(pos)
    }

    /**
        Size of the underlying resource, if it can be determined.
    */
    pub fn size(&mut self) -> Result<i64> {
        let size = unsafe { ffi::avio_size(self.as_mut_ptr()) };
        if size < 0 {
            return Err(Error::from_native(size as i32));
        }
        Ok(size)
    }

    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        for chunk in data.chunks(c_int::MAX as usize) {
            unsafe { ffi::avio_write(self.as_mut_ptr(), chunk.as_ptr(), chunk.len() as c_int) };
        }
        self.error().map_or(Ok(()), Err)
    }

    pub fn flush(&mut self) -> Result<()> {
        unsafe { ffi::avio_flush(self.as_mut_ptr()) };
        self.error().map_or(Ok(()), Err)
    }
}

fn string_field(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

impl Drop for IoContext {
    fn drop(&mut self) {
        if self.owned {
            let mut ptr = self.ptr.as_ptr();
            unsafe {
                ffi::avio_closep(&mut ptr);
            }
        }
    }
}

impl std::fmt::Debug for IoContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoContext")
            .field("owned", &self.owned)
            .field("position", &self.position())
            .field("write_flag", &self.write_flag())
            .field("eof_reached", &self.eof_reached())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_url(dir: &tempfile::TempDir, name: &str) -> (std::path::PathBuf, String) {
        let path = dir.path().join(name);
        let url = path.to_str().unwrap().to_string();
        (path, url)
    }

    #[test]
    fn null_pointer_has_no_view() {
        assert!(unsafe { IoContext::from_raw(ptr::null_mut(), true) }.is_none());
    }

    #[test]
    fn write_and_flush() {
        let dir = tempfile::tempdir().unwrap();
        let (path, url) = temp_url(&dir, "out.bin");

        let mut io = IoContext::open_write(&url).unwrap();
        assert!(io.is_owned());
        assert!(io.write_flag());
        assert!(io.buffer_size() > 0);

        io.write(b"hello ").unwrap();
        io.write(b"world").unwrap();
        assert_eq!(io.tell().unwrap(), 11);
        io.flush().unwrap();
        assert_eq!(io.position(), 11);
        assert!(io.error().is_none());
        drop(io);

        assert_eq!(std::fs::read(path).unwrap(), b"hello world");
    }

    #[test]
    fn setters_write_native_fields() {
        let dir = tempfile::tempdir().unwrap();
        let (_, url) = temp_url(&dir, "fields.bin");
        let mut io = IoContext::open_write(&url).unwrap();

        io.set_max_packet_size(4096);
        io.set_min_packet_size(512);
        io.set_direct(true);

        assert_eq!(io.max_packet_size(), 4096);
        assert_eq!(io.min_packet_size(), 512);
        assert!(io.direct());
        assert_eq!(unsafe { (*io.as_ptr()).max_packet_size }, 4096);
        assert_eq!(unsafe { (*io.as_ptr()).direct }, 1);
    }

    #[test]
    fn borrowed_view_does_not_close() {
        let dir = tempfile::tempdir().unwrap();
        let (path, url) = temp_url(&dir, "borrowed.bin");
        let mut owner = IoContext::open_write(&url).unwrap();

        let mut view = unsafe { IoContext::from_raw(owner.as_mut_ptr(), false) }.unwrap();
        view.write(b"abc").unwrap();
        drop(view);

        owner.write(b"def").unwrap();
        drop(owner);
        assert_eq!(std::fs::read(path).unwrap(), b"abcdef");
    }

    #[test]
    fn open_write_reports_native_error() {
        let err = IoContext::open_write("/definitely/not/here/out.bin").unwrap_err();
        assert!(err.code().is_some());
    }
}
