//! libx264 software encoder backend.

use std::ffi::CString;
use std::os::raw::c_int;
use std::ptr;

use bytes::Bytes;
use tracing::{debug, instrument, trace};

use crate::sys;
use crate::{CodecError, CodecResult, EncodedFrame, FrameType, H264Encoder, StreamConfig, YuvBuffer};

/// Both GOP bounds are pinned high and scene-cut detection is disabled:
/// keyframes come only from explicit requests (and the first frame), never
/// from encoder heuristics. The upstream viewer transport decides cadence.
const KEYINT: c_int = 7200;

/// RAII wrapper over a libx264 encoder handle.
pub struct X264Encoder {
    handle: *mut sys::x264_t,
    width: u32,
    height: u32,
    /// Cached SPS/PPS header bytes.
    headers: Bytes,
}

impl X264Encoder {
    /// Open an encoder configured per [`StreamConfig`] for a fixed picture size.
    #[instrument(name = "x264_new", skip_all, fields(width = width, height = height))]
    pub fn new(width: u32, height: u32, config: &StreamConfig) -> CodecResult<Self> {
        let tune = if config.fast_decode() {
            "zerolatency,fastdecode"
        } else {
            "zerolatency"
        };
        let preset = CString::new(config.preset.as_str())
            .map_err(|_| CodecError::Preset(config.preset.clone()))?;
        let tune = CString::new(tune).expect("static tune string");

        let mut param: sys::x264_param_t = unsafe { std::mem::zeroed() };
        if unsafe { sys::x264_param_default_preset(&mut param, preset.as_ptr(), tune.as_ptr()) } < 0
        {
            return Err(CodecError::Preset(config.preset.clone()));
        }

        param.i_csp = sys::X264_CSP_I420;
        param.i_width = width as c_int;
        param.i_height = height as c_int;

        // CRF with a VBV ceiling; the buffer holds two seconds at the cap.
        param.rc.i_rc_method = sys::X264_RC_CRF;
        param.rc.f_rf_constant = config.crf as f32;
        param.rc.i_vbv_max_bitrate = (config.bitrate / 1000) as c_int;
        param.rc.i_vbv_buffer_size = (config.bitrate / 1000 * 2) as c_int;

        param.i_fps_num = config.fps;
        param.i_fps_den = 1;
        param.b_vfr_input = 0;
        param.b_repeat_headers = 1;
        param.b_annexb = 1;
        param.i_log_level = sys::X264_LOG_ERROR;
        param.i_threads = config.threads as c_int;
        param.i_keyint_min = KEYINT;
        param.i_keyint_max = KEYINT;
        param.i_scenecut_threshold = 0;

        if config.cabac() {
            param.b_cabac = 1;
        }
        if config.extended_refs() {
            param.i_frame_reference = 3;
        }

        let profile = CString::new(config.profile.as_str())
            .map_err(|_| CodecError::Profile(config.profile.clone()))?;
        if unsafe { sys::x264_param_apply_profile(&mut param, profile.as_ptr()) } < 0 {
            return Err(CodecError::Profile(config.profile.clone()));
        }

        let handle = unsafe { sys::x264_encoder_open(&mut param) };
        if handle.is_null() {
            return Err(CodecError::Open(format!(
                "x264_encoder_open failed for {width}x{height}"
            )));
        }

        let headers = unsafe { read_headers(handle) };
        debug!(
            preset = %config.preset,
            profile = %config.profile,
            crf = config.crf,
            bitrate = config.bitrate,
            header_bytes = headers.len(),
            "x264 encoder opened"
        );

        Ok(Self {
            handle,
            width,
            height,
            headers,
        })
    }

    /// SPS/PPS bytes captured at open. Consumers can prime a decoder with
    /// these before the first keyframe arrives.
    pub fn headers(&self) -> &Bytes {
        &self.headers
    }
}

/// Copy the encoder's parameter-set NALs into one Annex-B buffer.
unsafe fn read_headers(handle: *mut sys::x264_t) -> Bytes {
    let mut nals: *mut sys::x264_nal_t = ptr::null_mut();
    let mut count: c_int = 0;
    let size = sys::x264_encoder_headers(handle, &mut nals, &mut count);
    if size <= 0 || nals.is_null() {
        return Bytes::new();
    }
    // NAL payloads are laid out contiguously starting at the first one.
    let first = &*nals;
    Bytes::copy_from_slice(std::slice::from_raw_parts(first.p_payload, size as usize))
}

impl H264Encoder for X264Encoder {
    #[instrument(name = "x264_encode", skip_all, fields(pts = pts))]
    fn encode(
        &mut self,
        picture: &YuvBuffer,
        pts: i64,
        frame_type: FrameType,
    ) -> CodecResult<Option<EncodedFrame>> {
        debug_assert_eq!((picture.width, picture.height), (self.width, self.height));

        let mut pic_in: sys::x264_picture_t = unsafe { std::mem::zeroed() };
        unsafe { sys::x264_picture_init(&mut pic_in) };
        pic_in.i_pts = pts;
        pic_in.i_type = match frame_type {
            FrameType::Auto => sys::X264_TYPE_AUTO,
            FrameType::Keyframe => sys::X264_TYPE_KEYFRAME,
        };
        pic_in.img.i_csp = sys::X264_CSP_I420;
        pic_in.img.i_plane = 3;
        pic_in.img.i_stride[0] = picture.stride_y as c_int;
        pic_in.img.i_stride[1] = picture.stride_u as c_int;
        pic_in.img.i_stride[2] = picture.stride_v as c_int;
        // x264 never writes through the input planes.
        pic_in.img.plane[0] = picture.y.as_ptr() as *mut u8;
        pic_in.img.plane[1] = picture.u.as_ptr() as *mut u8;
        pic_in.img.plane[2] = picture.v.as_ptr() as *mut u8;

        let mut pic_out: sys::x264_picture_t = unsafe { std::mem::zeroed() };
        let mut nals: *mut sys::x264_nal_t = ptr::null_mut();
        let mut nal_count: c_int = 0;

        let size = unsafe {
            sys::x264_encoder_encode(self.handle, &mut nals, &mut nal_count, &mut pic_in, &mut pic_out)
        };
        if size < 0 {
            return Err(CodecError::Encode(format!(
                "x264_encoder_encode failed: {size}"
            )));
        }
        if size == 0 || nals.is_null() {
            // The frame is buffered inside the encoder; nothing to
            // deliver this tick.
            trace!(pts, "no encoder output");
            return Ok(None);
        }

        let data = unsafe {
            let first = &*nals;
            Bytes::copy_from_slice(std::slice::from_raw_parts(first.p_payload, size as usize))
        };

        Ok(Some(EncodedFrame {
            data,
            pts: pic_out.i_pts,
            keyframe: pic_out.b_keyframe != 0,
            nal_count,
        }))
    }

    fn name(&self) -> &'static str {
        "x264"
    }
}

impl Drop for X264Encoder {
    fn drop(&mut self) {
        unsafe { sys::x264_encoder_close(self.handle) };
    }
}

// SAFETY: the handle is driven from a single worker thread at a time;
// libx264 manages its own internal thread pool.
unsafe impl Send for X264Encoder {}
