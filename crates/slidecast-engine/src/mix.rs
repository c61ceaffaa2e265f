//! Audio mixing: attach the background track to the rendered video.
//!
//! The audio input loops when shorter than the video and is trimmed by `-t`
//! to the probed video duration when longer. Short fades at both ends avoid
//! abrupt cuts on loop boundaries and trims.

use std::path::Path;

use slidecast_core::config::RenderConfig;

/// afade chain for the given video duration. Returns `None` when the fade
/// window is disabled or the clip is too short to fade both ends.
pub(crate) fn fade_filter(config: &RenderConfig, video_duration: f64) -> Option<String> {
    let fade = config.audio_fade_secs;
    if fade <= 0.0 || video_duration <= fade * 2.0 {
        return None;
    }
    Some(format!(
        "afade=t=in:st=0:d={fade:.3},afade=t=out:st={out_start:.3}:d={fade:.3}",
        fade = fade,
        out_start = video_duration - fade,
    ))
}

pub(crate) fn mix_args(
    config: &RenderConfig,
    video: &Path,
    audio: &Path,
    video_duration: f64,
    out: &Path,
) -> Vec<String> {
    let mut args = vec![
        "-i".to_string(),
        video.to_string_lossy().to_string(),
        "-stream_loop".to_string(),
        "-1".to_string(),
        "-i".to_string(),
        audio.to_string_lossy().to_string(),
        "-map".to_string(),
        "0:v".to_string(),
        "-map".to_string(),
        "1:a".to_string(),
        "-c:v".to_string(),
        "copy".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        config.audio_bitrate.clone(),
    ];

    if let Some(filter) = fade_filter(config, video_duration) {
        args.push("-af".to_string());
        args.push(filter);
    }

    args.extend([
        "-t".to_string(),
        format!("{:.3}", video_duration),
        "-y".to_string(),
        out.to_string_lossy().to_string(),
    ]);
    args
}
