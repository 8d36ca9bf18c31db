use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Ask ffprobe for the codec name of the primary video stream.
///
/// Returns an empty string on any failure; callers must treat an unknown
/// codec as not browser-playable and fall back to a full transcode.
pub async fn video_codec(ffprobe: &str, path: &Path) -> String {
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "quiet",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=codec_name",
            "-print_format",
            "flat",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .await;

    match output {
        Ok(out) if out.status.success() => {
            flat_value(&String::from_utf8_lossy(&out.stdout)).unwrap_or_default()
        }
        Ok(out) => {
            debug!(
                "ffprobe exited with {} for {}",
                out.status,
                path.display()
            );
            String::new()
        }
        Err(e) => {
            debug!("failed to run ffprobe for {}: {}", path.display(), e);
            String::new()
        }
    }
}

/// Ask ffprobe for the container duration in seconds.
///
/// Files with sparse or damaged headers sometimes need a larger probe
/// window, so a second attempt raises analyzeduration/probesize before
/// giving up.
pub async fn container_duration(ffprobe: &str, path: &Path) -> Option<f64> {
    let attempts: [&[&str]; 2] = [
        &[
            "-v",
            "quiet",
            "-show_entries",
            "format=duration",
            "-print_format",
            "flat",
        ],
        &[
            "-v",
            "quiet",
            "-analyzeduration",
            "20000000",
            "-probesize",
            "50000000",
            "-show_entries",
            "format=duration",
            "-print_format",
            "flat",
        ],
    ];

    for args in attempts {
        let output = Command::new(ffprobe)
            .args(args)
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await;

        let Ok(out) = output else { continue };
        if !out.status.success() {
            continue;
        }
        if let Some(value) = flat_value(&String::from_utf8_lossy(&out.stdout)) {
            if let Ok(secs) = value.parse::<f64>() {
                return Some(secs);
            }
        }
    }

    None
}

/// Extract the quoted value of the first `key="value"` pair in ffprobe's
/// flat output, e.g. `streams.stream.0.codec_name="h264"`.
fn flat_value(s: &str) -> Option<String> {
    let start = s.find("=\"")? + 2;
    let rest = &s[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}
