//! Overlay compositing: screen-blend a looping decorative video onto the
//! slideshow at fixed opacity, preserving the base resolution.

use std::path::Path;

use slidecast_core::config::RenderConfig;

/// `-stream_loop -1` repeats the overlay indefinitely; `shortest=1` on the
/// blend trims it back to the base stream's duration.
pub(crate) fn overlay_filter(config: &RenderConfig) -> String {
    format!(
        "[1:v]format=rgba,scale={w}:{h},setsar=1,colorchannelmixer=aa={op:.2}[ovl];\
         [0:v][ovl]blend=all_mode=screen:shortest=1[outv]",
        w = config.width,
        h = config.height,
        op = config.overlay_opacity,
    )
}

pub(crate) fn composite_args(
    config: &RenderConfig,
    base: &Path,
    overlay: &Path,
    out: &Path,
) -> Vec<String> {
    vec![
        "-i".to_string(),
        base.to_string_lossy().to_string(),
        "-stream_loop".to_string(),
        "-1".to_string(),
        "-i".to_string(),
        overlay.to_string_lossy().to_string(),
        "-filter_complex".to_string(),
        overlay_filter(config),
        "-map".to_string(),
        "[outv]".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        config.x264_preset.clone(),
        "-crf".to_string(),
        config.x264_crf.to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-an".to_string(),
        "-y".to_string(),
        out.to_string_lossy().to_string(),
    ]
}
