/// Video metadata probe
///
/// Shells out to yt-dlp for format/metadata extraction. The child's stdout
/// and stderr are drained concurrently (a sequential read can deadlock once
/// a pipe buffer fills), the whole run is bounded by a timeout, and on
/// expiry the child is killed outright rather than polled.
use crate::config::ProbeConfig;
use serde::{Deserialize, Serialize};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to spawn probe process: {0}")]
    Spawn(std::io::Error),

    #[error("probe process timed out after {0}s")]
    Timeout(u64),

    #[error("probe process exited with {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("failed to parse probe output: {source}")]
    Parse {
        source: serde_json::Error,
        /// Raw stdout, echoed back to the caller as a debugging aid.
        raw: String,
    },

    #[error("i/o error while reading probe output: {0}")]
    Io(std::io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoInfo {
    pub title: Option<String>,
    pub formats: Vec<VideoFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoFormat {
    pub id: Option<String>,
    pub extension: Option<String>,
    pub resolution: Option<String>,
    pub fps: Option<f64>,
    pub filesize: Option<i64>,
    pub filesize_approx: Option<i64>,
    pub bitrate_kbps: Option<f64>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub url: Option<String>,
    pub note: Option<String>,
    pub height: Option<i32>,
    pub width: Option<i32>,
    pub protocol: Option<String>,
}

// Field names as yt-dlp emits them with `-j`.
#[derive(Debug, Deserialize)]
struct RawInfo {
    title: Option<String>,
    formats: Option<Vec<RawFormat>>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    format_id: Option<String>,
    ext: Option<String>,
    resolution: Option<String>,
    fps: Option<f64>,
    filesize: Option<i64>,
    filesize_approx: Option<i64>,
    tbr: Option<f64>,
    vcodec: Option<String>,
    acodec: Option<String>,
    url: Option<String>,
    format_note: Option<String>,
    height: Option<i32>,
    width: Option<i32>,
    protocol: Option<String>,
}

impl From<RawFormat> for VideoFormat {
    fn from(raw: RawFormat) -> Self {
        VideoFormat {
            id: raw.format_id,
            extension: raw.ext,
            resolution: raw.resolution,
            fps: raw.fps,
            filesize: raw.filesize,
            filesize_approx: raw.filesize_approx,
            bitrate_kbps: raw.tbr,
            video_codec: raw.vcodec,
            audio_codec: raw.acodec,
            url: raw.url,
            note: raw.format_note,
            height: raw.height,
            width: raw.width,
            protocol: raw.protocol,
        }
    }
}

impl From<RawInfo> for VideoInfo {
    fn from(raw: RawInfo) -> Self {
        VideoInfo {
            title: raw.title,
            formats: raw
                .formats
                .unwrap_or_default()
                .into_iter()
                .map(VideoFormat::from)
                .collect(),
        }
    }
}

#[derive(Clone)]
pub struct VideoProbe {
    binary: String,
    timeout: Duration,
}

impl VideoProbe {
    pub fn new(cfg: &ProbeConfig) -> Self {
        Self {
            binary: cfg.binary.clone(),
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }

    pub async fn probe(&self, url: &str) -> Result<VideoInfo, ProbeError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["-j", "--no-warnings", "--no-call-home", "--no-check-certificate"])
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = run_with_timeout(cmd, self.timeout).await?;

        if !output.status.success() {
            return Err(ProbeError::NonZeroExit {
                code: output.status.code(),
                stderr: output.stderr.trim().to_string(),
            });
        }

        parse_probe_output(output.stdout.trim())
    }
}

#[derive(Debug)]
pub(crate) struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: ExitStatus,
}

pub(crate) async fn run_with_timeout(
    mut cmd: Command,
    limit: Duration,
) -> Result<CapturedOutput, ProbeError> {
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(ProbeError::Spawn)?;

    let mut stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| ProbeError::Io(std::io::Error::other("stdout not captured")))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| ProbeError::Io(std::io::Error::other("stderr not captured")))?;

    let run = async {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        let (out_res, err_res) = tokio::join!(
            stdout_pipe.read_to_end(&mut stdout),
            stderr_pipe.read_to_end(&mut stderr),
        );
        out_res?;
        err_res?;

        let status = child.wait().await?;

        Ok::<_, std::io::Error>(CapturedOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            status,
        })
    };

    match timeout(limit, run).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(ProbeError::Io(e)),
        Err(_elapsed) => {
            // The reader future is gone; reclaim the child and kill it so
            // nothing is left running.
            if let Err(e) = child.kill().await {
                tracing::warn!(error = %e, "failed to kill timed-out probe process");
            }
            Err(ProbeError::Timeout(limit.as_secs()))
        }
    }
}

fn parse_probe_output(raw: &str) -> Result<VideoInfo, ProbeError> {
    serde_json::from_str::<RawInfo>(raw)
        .map(VideoInfo::from)
        .map_err(|source| ProbeError::Parse {
            source,
            raw: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    const SAMPLE_OUTPUT: &str = r#"{
        "title": "Sample clip",
        "formats": [
            {
                "format_id": "137",
                "ext": "mp4",
                "resolution": "1920x1080",
                "fps": 29.97,
                "filesize": 1048576,
                "tbr": 4400.5,
                "vcodec": "avc1.640028",
                "acodec": "none",
                "url": "https://cdn.example/video.mp4",
                "format_note": "1080p",
                "height": 1080,
                "width": 1920,
                "protocol": "https"
            },
            { "format_id": "140", "ext": "m4a", "acodec": "mp4a.40.2", "filesize_approx": 98304 }
        ],
        "uploader": "someone",
        "duration": 212.4
    }"#;

    #[test]
    fn parses_probe_json_and_maps_fields() {
        let info = parse_probe_output(SAMPLE_OUTPUT).expect("should parse");
        assert_eq!(info.title.as_deref(), Some("Sample clip"));
        assert_eq!(info.formats.len(), 2);

        let video = &info.formats[0];
        assert_eq!(video.id.as_deref(), Some("137"));
        assert_eq!(video.extension.as_deref(), Some("mp4"));
        assert_eq!(video.bitrate_kbps, Some(4400.5));
        assert_eq!(video.video_codec.as_deref(), Some("avc1.640028"));
        assert_eq!(video.note.as_deref(), Some("1080p"));
        assert_eq!(video.height, Some(1080));

        let audio = &info.formats[1];
        assert_eq!(audio.filesize_approx, Some(98304));
        assert_eq!(audio.fps, None);
    }

    #[test]
    fn missing_formats_decode_to_empty_list() {
        let info = parse_probe_output(r#"{"title": "bare"}"#).expect("should parse");
        assert!(info.formats.is_empty());
    }

    #[test]
    fn parse_failure_carries_raw_output() {
        let err = parse_probe_output("yt-dlp: command output garbage").expect_err("should fail");
        match err {
            ProbeError::Parse { raw, .. } => assert!(raw.contains("garbage")),
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn captures_both_streams_and_status() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo out-line; echo err-line >&2; exit 0"]);

        let output = run_with_timeout(cmd, Duration::from_secs(5))
            .await
            .expect("command should run");
        assert!(output.status.success());
        assert_eq!(output.stdout.trim(), "out-line");
        assert_eq!(output.stderr.trim(), "err-line");
    }

    #[tokio::test]
    async fn reports_non_zero_exit() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo boom >&2; exit 3"]);

        let output = run_with_timeout(cmd, Duration::from_secs(5))
            .await
            .expect("command should run");
        assert_eq!(output.status.code(), Some(3));
        assert_eq!(output.stderr.trim(), "boom");
    }

    #[tokio::test]
    async fn kills_process_on_timeout() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "sleep 30"]);
        cmd.kill_on_drop(true);

        let started = Instant::now();
        let err = run_with_timeout(cmd, Duration::from_millis(300))
            .await
            .expect_err("should time out");

        assert!(matches!(err, ProbeError::Timeout(_)));
        // The child was killed, not awaited to completion.
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn probe_surfaces_non_zero_exit_as_error() {
        let probe = VideoProbe::new(&ProbeConfig {
            binary: "false".to_string(),
            timeout_secs: 5,
        });

        let err = probe
            .probe("https://example.com/clip")
            .await
            .expect_err("false(1) should fail");
        assert!(matches!(err, ProbeError::NonZeroExit { .. }));
    }
}
