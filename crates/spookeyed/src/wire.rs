//! Line protocol spoken by the detection collaborator on stdin.
//!
//! One JSON object per line, tagged by `type`:
//!
//! ```text
//! {"type":"face","bounds":{...},"landmarks":[{"x":..,"y":..}, ...68],"expressions":{...}}
//! {"type":"resize","source":"sibling","width":640,"height":480}
//! ```
//!
//! Several `face` lines may arrive per detection cycle; each overwrites the
//! tracked point, so the last one wins.

use crate::render_loop::{DaemonError, EngineHandle};
use serde::Deserialize;
use spookeye_core::{ContentSize, FaceReport, ResizeSource};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Face(FaceReport),
    Resize {
        #[serde(default = "default_resize_source")]
        source: ResizeSource,
        width: u32,
        height: u32,
    },
}

fn default_resize_source() -> ResizeSource {
    ResizeSource::Sibling
}

/// Parse one line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Message>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// Forward every message from `reader` to the render loop until EOF.
///
/// Malformed lines are logged and skipped. Returns the number of messages
/// forwarded.
pub async fn pump<R>(reader: R, handle: EngineHandle) -> Result<u64, DaemonError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0u64;
    let mut line_no = 0u64;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "input read failed; closing");
                break;
            }
        };
        line_no += 1;

        let msg = match parse_line(&line) {
            Ok(Some(msg)) => msg,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(line = line_no, error = %e, "skipping malformed message");
                continue;
            }
        };

        match msg {
            Message::Face(report) => {
                tracing::debug!(
                    line = line_no,
                    expression = report.expressions.dominant().0,
                    "face report"
                );
                handle.report_face(report).await?;
            }
            Message::Resize {
                source,
                width,
                height,
            } => {
                handle
                    .resize(source, ContentSize::new(width, height))
                    .await?;
            }
        }
        forwarded += 1;
    }

    Ok(forwarded)
}
