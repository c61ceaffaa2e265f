//! Sequence assembly: ordered clips into one slideshow stream.
//!
//! Primary path is demuxer-level concatenation with stream copy, valid
//! because every clip in a job shares identical codec parameters. A
//! filter-graph re-encode path exists for callers that cannot guarantee
//! uniformity.

use std::path::Path;

use slidecast_core::config::RenderConfig;

/// Escape a path for the concat demuxer list format: entries are wrapped in
/// single quotes, and an embedded quote closes, escapes, and reopens.
pub(crate) fn escape_concat_path(path: &str) -> String {
    path.replace('\'', r"'\''")
}

/// Body of the `-f concat` list file, one `file '...'` line per clip in
/// input order.
pub(crate) fn concat_list(clips: &[impl AsRef<Path>]) -> String {
    let mut list = String::new();
    for clip in clips {
        list.push_str("file '");
        list.push_str(&escape_concat_path(&clip.as_ref().to_string_lossy()));
        list.push_str("'\n");
    }
    list
}

pub(crate) fn assemble_args(list_path: &Path, out: &Path) -> Vec<String> {
    vec![
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-i".to_string(),
        list_path.to_string_lossy().to_string(),
        "-c".to_string(),
        "copy".to_string(),
        "-y".to_string(),
        out.to_string_lossy().to_string(),
    ]
}

/// Filter-graph concatenation (re-encode). Only used when the caller cannot
/// guarantee uniform stream parameters across clips.
pub(crate) fn assemble_reencode_args(
    config: &RenderConfig,
    clips: &[impl AsRef<Path>],
    out: &Path,
) -> Vec<String> {
    let mut args = Vec::new();
    for clip in clips {
        args.push("-i".to_string());
        args.push(clip.as_ref().to_string_lossy().to_string());
    }

    let inputs: String = (0..clips.len()).map(|i| format!("[{}:v]", i)).collect();
    let graph = format!("{}concat=n={}:v=1:a=0[outv]", inputs, clips.len());

    args.extend([
        "-filter_complex".to_string(),
        graph,
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
        "-r".to_string(),
        config.fps.to_string(),
        "-y".to_string(),
        out.to_string_lossy().to_string(),
    ]);
    args
}
