//! Clip synthesis: one still image to a fixed-duration pan/zoom clip.
//!
//! All clips in a job share resolution, frame rate, and pixel format. That
//! uniformity is what lets the assembler concatenate at the demuxer level
//! without re-encoding artifacts, so it is enforced here, not negotiated.

use std::path::Path;

use slidecast_core::config::{PanDirection, RenderConfig};

pub(crate) fn clip_frames(config: &RenderConfig) -> u32 {
    ((config.seconds_per_image * config.fps as f64).round() as u32).max(1)
}

/// Linear zoom from `zoom_start` to `zoom_end` across the clip. zoompan's
/// `zoom` variable carries the previous frame's value, so the expression adds
/// a constant per-frame increment and clamps at the end ratio.
pub(crate) fn zoom_expression(config: &RenderConfig, frames: u32) -> String {
    let increment = (config.zoom_end - config.zoom_start) / frames as f64;
    format!(
        "min(max(zoom,{:.6})+{:.6},{:.6})",
        config.zoom_start, increment, config.zoom_end
    )
}

/// Pan expressions position the zoom window; `on` is the output frame index.
pub(crate) fn pan_expressions(pan: PanDirection, frames: u32) -> (String, String) {
    let center_x = "iw/2-(iw/zoom/2)".to_string();
    let center_y = "ih/2-(ih/zoom/2)".to_string();
    match pan {
        PanDirection::Center => (center_x, center_y),
        PanDirection::Right => (format!("(iw-iw/zoom)*on/{}", frames), center_y),
        PanDirection::Left => (format!("(iw-iw/zoom)*(1-on/{})", frames), center_y),
        PanDirection::Down => (center_x, format!("(ih-ih/zoom)*on/{}", frames)),
        PanDirection::Up => (center_x, format!("(ih-ih/zoom)*(1-on/{})", frames)),
    }
}

/// Cover-scale and center-crop to the target frame, then apply the pan/zoom
/// transform and pin the pixel format.
pub(crate) fn clip_filter(config: &RenderConfig) -> String {
    let frames = clip_frames(config);
    let (x, y) = pan_expressions(config.pan, frames);
    format!(
        "scale={w}:{h}:force_original_aspect_ratio=increase,\
         crop={w}:{h},\
         zoompan=z='{z}':x='{x}':y='{y}':d={d}:s={w}x{h}:fps={fps},\
         format=pix_fmts=yuv420p",
        w = config.width,
        h = config.height,
        z = zoom_expression(config, frames),
        x = x,
        y = y,
        d = frames,
        fps = config.fps,
    )
}

pub(crate) fn synthesize_args(config: &RenderConfig, image: &Path, out: &Path) -> Vec<String> {
    vec![
        "-loop".to_string(),
        "1".to_string(),
        "-i".to_string(),
        image.to_string_lossy().to_string(),
        "-vf".to_string(),
        clip_filter(config),
        "-t".to_string(),
        format!("{:.3}", config.seconds_per_image),
        "-r".to_string(),
        config.fps.to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        config.x264_preset.clone(),
        "-crf".to_string(),
        config.x264_crf.to_string(),
        "-an".to_string(),
        "-y".to_string(),
        out.to_string_lossy().to_string(),
    ]
}
