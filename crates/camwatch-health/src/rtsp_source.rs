//! RTSP frame source.
//!
//! Decoding is delegated to an `ffmpeg` child process that pulls the
//! stream, scales it down and writes raw BGR frames to stdout. One process
//! lives for one attempt; closing the stream kills it.

use std::io::ErrorKind;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};
use tracing::debug;

use crate::error::{OpenError, ReadError};
use crate::frame::{Frame, FrameSource, FrameStream, PixelFormat};

/// Frames are scaled to this size before validation.
pub const FRAME_WIDTH: u32 = 320;
pub const FRAME_HEIGHT: u32 = 240;

/// Opens `rtsp://` and `rtsps://` endpoints through ffmpeg.
#[derive(Debug, Clone)]
pub struct RtspSource {
    program: String,
    width: u32,
    height: u32,
}

impl Default for RtspSource {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl RtspSource {
    /// `program` is the ffmpeg binary, looked up on `PATH` if not absolute.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
        }
    }
}

fn ffmpeg_args(endpoint: &str, width: u32, height: u32) -> Vec<String> {
    let scale = format!("scale={width}:{height}");
    [
        "-nostdin",
        "-loglevel",
        "error",
        "-rtsp_transport",
        "tcp",
        "-i",
        endpoint,
        "-an",
        "-vf",
        scale.as_str(),
        "-f",
        "rawvideo",
        "-pix_fmt",
        "bgr24",
        "pipe:1",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[async_trait]
impl FrameSource for RtspSource {
    async fn open(&self, endpoint: &str) -> Result<Box<dyn FrameStream>, OpenError> {
        let scheme = endpoint.split_once("://").map(|(scheme, _)| scheme);
        if !matches!(scheme, Some("rtsp" | "rtsps")) {
            return Err(OpenError::UnsupportedScheme(endpoint.to_string()));
        }

        let mut command = Command::new(&self.program);
        command.args(ffmpeg_args(endpoint, self.width, self.height));
        let stream = RawVideoStream::spawn(command, endpoint, self.width, self.height).await?;
        Ok(Box::new(stream))
    }
}

/// Fixed-size BGR frames read off a child process's stdout.
struct RawVideoStream {
    child: Child,
    stdout: ChildStdout,
    width: u32,
    height: u32,
    /// The frame read while opening, handed out by the first `read`.
    pending: Option<Frame>,
}

impl RawVideoStream {
    /// Start `command` and wait for its first frame.
    ///
    /// The stream only counts as open once a frame arrives; a process that
    /// exits or fails to connect first is an open failure.
    async fn spawn(
        mut command: Command,
        endpoint: &str,
        width: u32,
        height: u32,
    ) -> Result<Self, OpenError> {
        let connect_err = |reason: String| OpenError::Connect {
            endpoint: endpoint.to_string(),
            reason,
        };

        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| connect_err(format!("failed to start decoder: {e}")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| connect_err("decoder stdout unavailable".to_string()))?;

        let mut stream = Self {
            child,
            stdout,
            width,
            height,
            pending: None,
        };
        let first = stream
            .next_frame()
            .await
            .map_err(|e| connect_err(format!("no frame from decoder: {e}")))?;
        stream.pending = Some(first);

        debug!(%endpoint, width, height, "rtsp stream opened");
        Ok(stream)
    }

    async fn next_frame(&mut self) -> Result<Frame, ReadError> {
        let len = self.width as usize * self.height as usize * PixelFormat::Bgr8.channels();
        let mut buf = vec![0u8; len];
        match self.stdout.read_exact(&mut buf).await {
            Ok(_) => Ok(Frame::new(self.width, self.height, PixelFormat::Bgr8, buf)),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(ReadError::Closed),
            Err(e) => Err(ReadError::Request(e.to_string())),
        }
    }
}

#[async_trait]
impl FrameStream for RawVideoStream {
    async fn read(&mut self) -> Result<Frame, ReadError> {
        match self.pending.take() {
            Some(frame) => Ok(frame),
            None => self.next_frame().await,
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.child.kill().await {
            debug!(error = %e, "decoder already exited");
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::validator::FrameValidator;

    const W: u32 = 64;
    const H: u32 = 48;
    const FRAME_BYTES: usize = (W * H * 3) as usize;

    fn shell(script: &str) -> Command {
        let mut command = Command::new("sh");
        command.args(["-c", script]);
        command
    }

    #[test]
    fn ffmpeg_pipeline_arguments() {
        let args = ffmpeg_args("rtsp://192.168.1.115/camera1", 320, 240);
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[input + 1], "rtsp://192.168.1.115/camera1");
        assert!(args.windows(2).any(|w| w == ["-pix_fmt", "bgr24"]));
        assert!(args.windows(2).any(|w| w == ["-vf", "scale=320:240"]));
        assert_eq!(args.last().map(String::as_str), Some("pipe:1"));
    }

    #[tokio::test]
    async fn reads_fixed_size_frames_until_exit() {
        let script = format!(
            "head -c {FRAME_BYTES} /dev/urandom; head -c {FRAME_BYTES} /dev/zero"
        );
        let mut stream = RawVideoStream::spawn(shell(&script), "rtsp://cam/1", W, H)
            .await
            .unwrap();
        let validator = FrameValidator::default();

        let noisy = stream.read().await.unwrap();
        assert_eq!((noisy.width, noisy.height), (W, H));
        assert_eq!(noisy.format, PixelFormat::Bgr8);
        assert!(validator.validate(Some(&noisy)));

        let black = stream.read().await.unwrap();
        assert!(!validator.validate(Some(&black)));

        assert!(matches!(stream.read().await, Err(ReadError::Closed)));
        stream.close().await;
    }

    #[tokio::test]
    async fn decoder_exiting_before_first_frame_fails_open() {
        let result = RawVideoStream::spawn(shell("exit 1"), "rtsp://cam/1", W, H).await;
        assert!(matches!(result, Err(OpenError::Connect { .. })));
    }

    #[tokio::test]
    async fn missing_decoder_fails_open() {
        let source = RtspSource::new("/nonexistent/bin/ffmpeg");
        let result = source.open("rtsp://192.168.1.115/camera1").await;
        assert!(matches!(result, Err(OpenError::Connect { .. })));
    }

    #[tokio::test]
    async fn http_endpoint_is_unsupported() {
        let result = RtspSource::default().open("http://cam/snap.jpg").await;
        assert!(matches!(result, Err(OpenError::UnsupportedScheme(_))));
    }
}
