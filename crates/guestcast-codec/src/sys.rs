//! Raw FFI bindings to libx264.
//!
//! Covers the minimal subset required by [`X264Encoder`](super::x264).
//! Struct layouts match the x264.h API at X264_BUILD 164.
//!
//! # Linking
//!
//! `build.rs` emits `-l x264` when the `x264` cargo feature is enabled.
//!
//! # Safety
//!
//! All functions in this module are `unsafe extern "C"`. The safe wrapper
//! in `x264.rs` enforces handle validity and keeps input plane pointers
//! alive across each encode call. Callback slots in [`x264_param_t`] are
//! declared as raw pointers and are never installed from Rust.

#![allow(non_camel_case_types, non_snake_case, dead_code)]

use std::ffi::c_void;
use std::os::raw::{c_char, c_int, c_uint};

/// Opaque encoder handle.
#[repr(C)]
pub struct x264_t {
    _private: [u8; 0],
}

pub const X264_CSP_I420: c_int = 0x0002;

pub const X264_RC_CQP: c_int = 0;
pub const X264_RC_CRF: c_int = 1;
pub const X264_RC_ABR: c_int = 2;

pub const X264_TYPE_AUTO: c_int = 0x0000;
pub const X264_TYPE_IDR: c_int = 0x0001;
pub const X264_TYPE_I: c_int = 0x0002;
pub const X264_TYPE_P: c_int = 0x0003;
/// IDR or I depending on `b_open_gop`.
pub const X264_TYPE_KEYFRAME: c_int = 0x0006;

pub const X264_LOG_NONE: c_int = -1;
pub const X264_LOG_ERROR: c_int = 0;
pub const X264_LOG_WARNING: c_int = 1;
pub const X264_LOG_INFO: c_int = 2;
pub const X264_LOG_DEBUG: c_int = 3;

#[repr(C)]
#[derive(Clone, Copy)]
pub struct x264_zone_t {
    pub i_start: c_int,
    pub i_end: c_int,
    pub b_force_qp: c_int,
    pub i_qp: c_int,
    pub f_bitrate_factor: f32,
    pub param: *mut x264_param_t,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct x264_param_vui_t {
    pub i_sar_height: c_int,
    pub i_sar_width: c_int,
    pub i_overscan: c_int,
    pub i_vidformat: c_int,
    pub b_fullrange: c_int,
    pub i_colorprim: c_int,
    pub i_transfer: c_int,
    pub i_colmatrix: c_int,
    pub i_chroma_loc: c_int,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct x264_param_analyse_t {
    pub intra: c_uint,
    pub inter: c_uint,
    pub b_transform_8x8: c_int,
    pub i_weighted_pred: c_int,
    pub b_weighted_bipred: c_int,
    pub i_direct_mv_pred: c_int,
    pub i_chroma_qp_offset: c_int,
    pub i_me_method: c_int,
    pub i_me_range: c_int,
    pub i_mv_range: c_int,
    pub i_mv_range_thread: c_int,
    pub i_subpel_refine: c_int,
    pub b_chroma_me: c_int,
    pub b_mixed_references: c_int,
    pub i_trellis: c_int,
    pub b_fast_pskip: c_int,
    pub b_dct_decimate: c_int,
    pub i_noise_reduction: c_int,
    pub f_psy_rd: f32,
    pub f_psy_trellis: f32,
    pub b_psy: c_int,
    pub b_mb_info: c_int,
    pub b_mb_info_update: c_int,
    pub i_luma_deadzone: [c_int; 2],
    pub b_psnr: c_int,
    pub b_ssim: c_int,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct x264_param_rc_t {
    pub i_rc_method: c_int,
    pub i_qp_constant: c_int,
    pub i_qp_min: c_int,
    pub i_qp_max: c_int,
    pub i_qp_step: c_int,
    pub i_bitrate: c_int,
    pub f_rf_constant: f32,
    pub f_rf_constant_max: f32,
    pub f_rate_tolerance: f32,
    pub i_vbv_max_bitrate: c_int,
    pub i_vbv_buffer_size: c_int,
    pub f_vbv_buffer_init: f32,
    pub f_ip_factor: f32,
    pub f_pb_factor: f32,
    pub b_filler: c_int,
    pub i_aq_mode: c_int,
    pub f_aq_strength: f32,
    pub b_mb_tree: c_int,
    pub i_lookahead: c_int,
    pub b_stat_write: c_int,
    pub psz_stat_out: *mut c_char,
    pub b_stat_read: c_int,
    pub psz_stat_in: *mut c_char,
    pub f_qcompress: f32,
    pub f_qblur: f32,
    pub f_complexity_blur: f32,
    pub zones: *mut x264_zone_t,
    pub i_zones: c_int,
    pub psz_zones: *mut c_char,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct x264_param_crop_rect_t {
    pub i_left: c_uint,
    pub i_top: c_uint,
    pub i_right: c_uint,
    pub i_bottom: c_uint,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct x264_param_t {
    /* CPU flags */
    pub cpu: c_uint,
    pub i_threads: c_int,
    pub i_lookahead_threads: c_int,
    pub b_sliced_threads: c_int,
    pub b_deterministic: c_int,
    pub b_cpu_independent: c_int,
    pub i_sync_lookahead: c_int,

    /* Video properties */
    pub i_width: c_int,
    pub i_height: c_int,
    pub i_csp: c_int,
    pub i_bitdepth: c_int,
    pub i_level_idc: c_int,
    pub i_frame_total: c_int,

    pub i_nal_hrd: c_int,

    pub vui: x264_param_vui_t,

    /* Bitstream parameters */
    pub i_frame_reference: c_int,
    pub i_dpb_size: c_int,
    pub i_keyint_max: c_int,
    pub i_keyint_min: c_int,
    pub i_scenecut_threshold: c_int,
    pub b_intra_refresh: c_int,

    pub i_bframe: c_int,
    pub i_bframe_adaptive: c_int,
    pub i_bframe_bias: c_int,
    pub i_bframe_pyramid: c_int,
    pub b_open_gop: c_int,
    pub b_bluray_compat: c_int,
    pub i_avcintra_class: c_int,
    pub i_avcintra_flavor: c_int,

    pub b_deblocking_filter: c_int,
    pub i_deblocking_filter_alphac0: c_int,
    pub i_deblocking_filter_beta: c_int,

    pub b_cabac: c_int,
    pub i_cabac_init_idc: c_int,

    pub b_interlaced: c_int,
    pub b_constrained_intra: c_int,

    pub i_cqm_preset: c_int,
    pub psz_cqm_file: *mut c_char,
    pub cqm_4iy: [u8; 16],
    pub cqm_4py: [u8; 16],
    pub cqm_4ic: [u8; 16],
    pub cqm_4pc: [u8; 16],
    pub cqm_8iy: [u8; 64],
    pub cqm_8py: [u8; 64],
    pub cqm_8ic: [u8; 64],
    pub cqm_8pc: [u8; 64],

    /* Log */
    pub pf_log: *mut c_void,
    pub p_log_private: *mut c_void,
    pub i_log_level: c_int,
    pub b_full_recon: c_int,
    pub psz_dump_yuv: *mut c_char,

    pub analyse: x264_param_analyse_t,
    pub rc: x264_param_rc_t,

    pub crop_rect: x264_param_crop_rect_t,

    pub i_frame_packing: c_int,
    pub i_alternative_transfer: c_int,

    /* Muxing parameters */
    pub b_aud: c_int,
    pub b_repeat_headers: c_int,
    pub b_annexb: c_int,
    pub i_sps_id: c_int,
    pub b_vfr_input: c_int,
    pub b_pulldown: c_int,
    pub i_fps_num: u32,
    pub i_fps_den: u32,
    pub i_timebase_num: u32,
    pub i_timebase_den: u32,

    pub b_tff: c_int,
    pub b_pic_struct: c_int,
    pub b_fake_interlaced: c_int,
    pub b_stitchable: c_int,

    pub b_opencl: c_int,
    pub i_opencl_device: c_int,
    pub opencl_device_id: *mut c_void,
    pub psz_clbin_file: *mut c_char,

    /* Slicing parameters */
    pub i_slice_max_size: c_int,
    pub i_slice_max_mbs: c_int,
    pub i_slice_min_mbs: c_int,
    pub i_slice_count: c_int,
    pub i_slice_count_max: c_int,

    pub param_free: *mut c_void,
    pub nalu_process: *mut c_void,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct x264_image_t {
    pub i_csp: c_int,
    pub i_plane: c_int,
    pub i_stride: [c_int; 4],
    pub plane: [*mut u8; 4],
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct x264_image_properties_t {
    pub quant_offsets: *mut f32,
    pub quant_offsets_free: *mut c_void,
    pub mb_info: *mut u8,
    pub mb_info_free: *mut c_void,
    pub f_ssim: f64,
    pub f_psnr_avg: f64,
    pub f_psnr: [f64; 3],
    pub f_crf_avg: f64,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct x264_hrd_t {
    pub cpb_initial_arrival_time: f64,
    pub cpb_final_arrival_time: f64,
    pub cpb_removal_time: f64,
    pub dpb_output_time: f64,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct x264_sei_payload_t {
    pub payload_size: c_int,
    pub payload_type: c_int,
    pub payload: *mut u8,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct x264_sei_t {
    pub num_payloads: c_int,
    pub payloads: *mut x264_sei_payload_t,
    pub sei_free: *mut c_void,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct x264_picture_t {
    pub i_type: c_int,
    pub i_qpplus1: c_int,
    pub i_pic_struct: c_int,
    pub b_keyframe: c_int,
    pub i_pts: i64,
    pub i_dts: i64,
    pub param: *mut x264_param_t,
    pub img: x264_image_t,
    pub prop: x264_image_properties_t,
    pub hrd_timing: x264_hrd_t,
    pub extra_sei: x264_sei_t,
    pub opaque: *mut c_void,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct x264_nal_t {
    pub i_ref_idc: c_int,
    pub i_type: c_int,
    pub b_long_startcode: c_int,
    pub i_first_mb: c_int,
    pub i_last_mb: c_int,
    pub i_payload: c_int,
    pub p_payload: *mut u8,
    pub i_padding: c_int,
}

extern "C" {
    pub fn x264_param_default_preset(
        param: *mut x264_param_t,
        preset: *const c_char,
        tune: *const c_char,
    ) -> c_int;

    pub fn x264_param_apply_profile(param: *mut x264_param_t, profile: *const c_char) -> c_int;

    pub fn x264_picture_init(pic: *mut x264_picture_t);

    // x264.h maps x264_encoder_open onto a build-versioned symbol to force
    // a link error against incompatible library versions.
    #[link_name = "x264_encoder_open_164"]
    pub fn x264_encoder_open(param: *mut x264_param_t) -> *mut x264_t;

    pub fn x264_encoder_headers(
        handle: *mut x264_t,
        pp_nal: *mut *mut x264_nal_t,
        pi_nal: *mut c_int,
    ) -> c_int;

    pub fn x264_encoder_encode(
        handle: *mut x264_t,
        pp_nal: *mut *mut x264_nal_t,
        pi_nal: *mut c_int,
        pic_in: *mut x264_picture_t,
        pic_out: *mut x264_picture_t,
    ) -> c_int;

    pub fn x264_encoder_delayed_frames(handle: *mut x264_t) -> c_int;

    pub fn x264_encoder_close(handle: *mut x264_t);
}
