/*!
    Hardware acceleration support.
*/

use std::ptr;

use ffmpeg_next::{ffi, util::frame::video::Video as VideoFrameFFmpeg};

use ffmpeg_types::{Error, HwDeviceType, Result};

use ffmpeg_native::convert::{hw_device_from_native, hw_device_to_native};

/**
    Hardware device types supported by the linked libraries, in the order
    the native side enumerates them.
*/
pub fn available_hw_devices() -> Vec<HwDeviceType> {
    let mut devices = Vec::new();
    let mut current = ffi::AVHWDeviceType::AV_HWDEVICE_TYPE_NONE;
    loop {
        current = unsafe { ffi::av_hwdevice_iterate_types(current) };
        if current == ffi::AVHWDeviceType::AV_HWDEVICE_TYPE_NONE {
            break;
        }
        match hw_device_from_native(current) {
            Some(device) => devices.push(device),
            None => tracing::trace!(?current, "skipping unknown hardware device type"),
        }
    }
    devices
}

/**
    Hardware device context wrapper.
*/
pub(crate) struct HwDeviceContext {
    ctx: *mut ffi::AVBufferRef,
    device: HwDeviceType,
}

impl HwDeviceContext {
    /**
        Open the default device of the given type.
    */
    pub fn create(device: HwDeviceType) -> Result<Self> {
        let device_type = hw_device_to_native(device).ok_or_else(|| {
            Error::unsupported_format(format!("hardware device {device} is not supported"))
        })?;

        let mut ctx: *mut ffi::AVBufferRef = ptr::null_mut();
        let ret = unsafe {
            ffi::av_hwdevice_ctx_create(&mut ctx, device_type, ptr::null(), ptr::null_mut(), 0)
        };
        if ret < 0 {
            return Err(Error::from_native(ret));
        }
        if ctx.is_null() {
            return Err(Error::codec(format!("no context created for {device}")));
        }

        Ok(Self { ctx, device })
    }

    pub fn device(&self) -> HwDeviceType {
        self.device
    }

    /**
        Create a new reference to the context, for a decoder to own.
    */
    pub fn create_ref(&self) -> *mut ffi::AVBufferRef {
        unsafe { ffi::av_buffer_ref(self.ctx) }
    }
}

impl Drop for HwDeviceContext {
    fn drop(&mut self) {
        if !self.ctx.is_null() {
            unsafe {
                ffi::av_buffer_unref(&mut self.ctx);
            }
        }
    }
}

// SAFETY: The FFmpeg buffer reference is internally reference-counted
// and thread-safe for the operations we perform.
unsafe impl Send for HwDeviceContext {}

/**
    Check if a frame lives in device memory and needs a transfer.
*/
pub(crate) fn is_hw_frame(frame: &VideoFrameFFmpeg) -> bool {
    unsafe { !(*frame.as_ptr()).hw_frames_ctx.is_null() }
}

/**
    Download a hardware frame into system memory.
*/
pub(crate) fn transfer_hw_frame(hw_frame: &VideoFrameFFmpeg) -> Result<VideoFrameFFmpeg> {
    let mut sw_frame = VideoFrameFFmpeg::empty();
    unsafe {
        let ret = ffi::av_hwframe_transfer_data(sw_frame.as_mut_ptr(), hw_frame.as_ptr(), 0);
        if ret < 0 {
            return Err(Error::from_native(ret));
        }
        (*sw_frame.as_mut_ptr()).pts = (*hw_frame.as_ptr()).pts;
    }
    Ok(sw_frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn enumerated_devices_are_unique() {
        let devices = available_hw_devices();
        let unique: HashSet<_> = devices.iter().collect();
        assert_eq!(unique.len(), devices.len());
    }

    #[test]
    fn software_frames_are_not_hardware() {
        let frame = VideoFrameFFmpeg::new(ffmpeg_next::format::Pixel::YUV420P, 4, 4);
        assert!(!is_hw_frame(&frame));
    }
}
