use crate::playback::HlsMode;
use crate::store;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Build the ffmpeg argument vector for one HLS job.
///
/// Both modes share the output shape: primary video stream, primary audio
/// stream when one exists, audio normalized to stereo AAC, 6-second
/// independently decodable MPEG-TS segments and an unbounded playlist.
/// Copy mode rewraps the existing H.264 stream; transcode mode re-encodes
/// with forced keyframes so segment boundaries stay aligned.
pub(crate) fn build_args(mode: HlsMode, input: &Path, dir: &Path) -> Vec<OsString> {
    let playlist = store::playlist_path(dir);
    let segments = dir.join(store::SEGMENT_TEMPLATE);

    let mut args: Vec<OsString> = vec![
        "-loglevel".into(),
        "error".into(),
        "-i".into(),
        input.as_os_str().into(),
    ];

    match mode {
        HlsMode::Copy => {
            // The TS muxer needs Annex B framing, not MP4's length-prefixed
            // AVCC.
            args.extend([
                "-c:v".into(),
                "copy".into(),
                "-bsf:v".into(),
                "h264_mp4toannexb".into(),
            ]);
        }
        HlsMode::Transcode => {
            if cfg!(target_os = "macos") {
                args.extend([
                    "-c:v".into(),
                    "h264_videotoolbox".into(),
                    "-b:v".into(),
                    "4M".into(),
                ]);
            } else {
                args.extend([
                    "-c:v".into(),
                    "libx264".into(),
                    "-preset".into(),
                    "fast".into(),
                    "-b:v".into(),
                    "4M".into(),
                ]);
            }
            args.extend([
                "-force_key_frames".into(),
                "expr:gte(t,n_forced*2)".into(),
            ]);
        }
    }

    args.extend([
        "-map".into(),
        "0:v:0".into(),
        // The trailing ? keeps ffmpeg from failing on audio-less inputs.
        "-map".into(),
        "0:a:0?".into(),
        "-c:a".into(),
        "aac".into(),
        "-ac".into(),
        "2".into(),
        "-b:a".into(),
        "128k".into(),
    ]);
    args.extend([
        "-f".into(),
        "hls".into(),
        "-hls_time".into(),
        "6".into(),
        "-hls_list_size".into(),
        "0".into(),
        "-hls_segment_filename".into(),
        segments.into_os_string(),
        "-hls_flags".into(),
        "independent_segments".into(),
    ]);
    args.push(playlist.into_os_string());

    args
}

/// Transcoder command with all standard streams discarded; the exit code is
/// the only success signal.
pub(crate) fn command(ffmpeg: &str, args: &[OsString]) -> Command {
    let mut cmd = Command::new(ffmpeg);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    cmd
}
