//! Feed replay
//!
//! A feed is newline-delimited JSON, one gateway frame per line:
//! `{"op": 0, "t": "MESSAGE_CREATE", "d": {...}}`. Frames that are not
//! dispatches (heartbeats, hello, ...) are skipped, as are blank lines.

use mirror_core::ConnectionState;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

/// Gateway opcode for dispatch frames
const OP_DISPATCH: u8 = 0;

#[derive(Debug, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub op: Option<u8>,

    #[serde(default)]
    pub t: Option<String>,

    #[serde(default)]
    pub d: Value,
}

impl Frame {
    /// Event name, for dispatch frames only
    pub fn dispatch_name(&self) -> Option<&str> {
        match self.op {
            Some(op) if op != OP_DISPATCH => None,
            _ => self.t.as_deref(),
        }
    }
}

/// Replay counters
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplaySummary {
    pub lines: usize,
    pub dispatched: usize,
    /// Kinds that produced an event, summed over all frames
    pub delivered: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} lines, {} dispatched, {} delivered, {} skipped, {} failed",
            self.lines, self.dispatched, self.delivered, self.skipped, self.failed
        )
    }
}

/// Feed every frame of `reader` into `state`
///
/// A malformed line or a failing dispatch is logged and counted; the replay
/// goes on. Only I/O errors end it early.
pub async fn replay<R>(state: &Arc<ConnectionState>, reader: R) -> anyhow::Result<ReplaySummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = ReplaySummary::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        summary.lines += 1;
        let line = line.trim();
        if line.is_empty() {
            summary.skipped += 1;
            continue;
        }

        let frame: Frame = match serde_json::from_str(line) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(line = summary.lines, error = %e, "Malformed frame");
                summary.failed += 1;
                continue;
            }
        };
        let Some(name) = frame.dispatch_name() else {
            debug!(line = summary.lines, op = ?frame.op, "Skipping non-dispatch frame");
            summary.skipped += 1;
            continue;
        };

        summary.dispatched += 1;
        match state.dispatch(name, frame.d.clone()).await {
            Ok(delivered) => summary.delivered += delivered,
            Err(e) => {
                warn!(line = summary.lines, event = name, error = %e, "Dispatch failed");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}
