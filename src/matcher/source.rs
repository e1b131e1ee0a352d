//! Line sources feeding the ingest loop
//!
//! Every source forwards raw lines into a bounded channel and returns when
//! its input ends. Dropping the sender on return is the end-of-input signal
//! for the ingest loop.

use super::config::MatcherCommand;
use crate::error::MatcherError;
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

/// Forward every line of `reader` into `tx`
///
/// Matcher output echoes raw corpus bytes, so lines are decoded lossily:
/// invalid UTF-8 becomes U+FFFD and the line is still forwarded.
/// Stops early, without error, once the receiving side has gone away.
/// Returns the number of lines forwarded.
pub async fn forward_lines<R>(mut reader: R, tx: mpsc::Sender<String>) -> Result<u64, MatcherError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::with_capacity(256);
    let mut forwarded = 0u64;
    let mut lossy = 0u64;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await.map_err(MatcherError::Read)? == 0 {
            break;
        }

        let line = match String::from_utf8(trim_line_ending(&buf).to_vec()) {
            Ok(line) => line,
            Err(e) => {
                lossy += 1;
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };

        if tx.send(line).await.is_err() {
            log::warn!("⚠️  Line channel closed, stopping line source");
            break;
        }
        forwarded += 1;
    }

    if lossy > 0 {
        log::debug!("{} of {} lines carried invalid UTF-8", lossy, forwarded);
    }

    Ok(forwarded)
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Spawn the matcher and forward its stdout until it exits
///
/// A non-zero exit is logged, not returned: the caller still gets its final
/// report once the channel closes.
pub async fn run_matcher(command: &MatcherCommand, tx: mpsc::Sender<String>) -> Result<u64, MatcherError> {
    log::info!("🚀 Spawning matcher: {} {}", command.program, command.args().join(" "));

    let mut child = Command::new(&command.program)
        .args(command.args())
        .stdout(Stdio::piped())
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| MatcherError::Spawn {
            program: command.program.clone(),
            source,
        })?;

    let stdout = child.stdout.take().ok_or(MatcherError::MissingStdout)?;
    let forwarded = forward_lines(BufReader::new(stdout), tx).await?;

    let status = child.wait().await.map_err(MatcherError::Wait)?;
    if status.success() {
        log::info!("✅ Matcher finished after {} lines", forwarded);
    } else {
        log::error!("❌ Matcher exited with {} after {} lines", status, forwarded);
    }

    Ok(forwarded)
}

/// Forward our own standard input
pub async fn run_stdin(tx: mpsc::Sender<String>) -> Result<u64, MatcherError> {
    log::info!("📥 Reading matcher output from stdin");
    let forwarded = forward_lines(BufReader::new(tokio::io::stdin()), tx).await?;
    log::info!("✅ Stdin closed after {} lines", forwarded);
    Ok(forwarded)
}
