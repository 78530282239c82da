// src/process/pipe.rs

//! Non-blocking access to a child's output pipes.
//!
//! A background Tokio task reads the pipe in chunks and forwards them over an
//! unbounded channel. [`PipeReader::drain`] then collects whatever has arrived
//! without ever waiting, which is what the runner's poll loop requires.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{trace, warn};

const CHUNK_SIZE: usize = 8 * 1024;

/// Receiving side of a pumped pipe.
#[derive(Debug)]
pub struct PipeReader {
    stream: &'static str,
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
    /// Bytes received but not yet handed out (an incomplete UTF-8 sequence).
    pending: Vec<u8>,
    /// The pump task finished and the channel is drained.
    eof: bool,
}

/// Spawn a pump task for `pipe` and return the reader side.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_pipe<R>(stream: &'static str, command: &str, mut pipe: R) -> PipeReader
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<Vec<u8>>();
    let command = command.to_string();

    tokio::spawn(async move {
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            match pipe.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    if tx.send(buf[..n].to_vec()).is_err() {
                        // Reader side dropped; nobody cares about the rest.
                        break;
                    }
                }
                Err(e) => {
                    warn!(%command, stream, error = %e, "error reading process pipe");
                    break;
                }
            }
        }
        trace!(%command, stream, "pipe reached EOF");
    });

    PipeReader {
        stream,
        rx,
        pending: Vec::new(),
        eof: false,
    }
}

impl PipeReader {
    /// Which stream this reader is attached to ("stdout" / "stderr").
    pub fn stream(&self) -> &'static str {
        self.stream
    }

    /// Take all text received since the last call. Never blocks.
    ///
    /// Multi-byte characters split across chunk boundaries are held back
    /// until the rest of the sequence arrives (or the pipe closes).
    pub fn drain(&mut self) -> String {
        loop {
            match self.rx.try_recv() {
                Ok(chunk) => self.pending.extend_from_slice(&chunk),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.eof = true;
                    break;
                }
            }
        }
        self.take_text()
    }

    /// `true` once the pipe hit EOF and every byte has been handed out.
    pub fn is_closed(&self) -> bool {
        self.eof && self.pending.is_empty()
    }

    fn take_text(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }

        match std::str::from_utf8(&self.pending) {
            Ok(text) => {
                let text = text.to_string();
                self.pending.clear();
                text
            }
            Err(e) if e.error_len().is_none() && !self.eof => {
                let tail = self.pending.split_off(e.valid_up_to());
                let head = std::mem::replace(&mut self.pending, tail);
                // `head` is valid UTF-8 up to `valid_up_to`.
                String::from_utf8_lossy(&head).into_owned()
            }
            Err(_) => {
                let text = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                text
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader_with(chunks: &[&[u8]], closed: bool) -> PipeReader {
        let (tx, rx) = mpsc::unbounded_channel();
        for chunk in chunks {
            tx.send(chunk.to_vec()).unwrap();
        }
        if !closed {
            // Keep the channel open for the duration of the test.
            std::mem::forget(tx);
        }
        PipeReader {
            stream: "stdout",
            rx,
            pending: Vec::new(),
            eof: false,
        }
    }

    #[test]
    fn drain_coalesces_available_chunks() {
        let mut reader = reader_with(&[b"hel", b"lo\n"], false);
        assert_eq!(reader.drain(), "hello\n");
        assert_eq!(reader.drain(), "");
        assert!(!reader.is_closed());
    }

    #[test]
    fn drain_holds_back_split_utf8_sequence() {
        // "é" is 0xC3 0xA9.
        let mut reader = reader_with(&[b"caf\xC3"], false);
        assert_eq!(reader.drain(), "caf");
        assert_eq!(reader.pending, vec![0xC3]);
    }

    #[test]
    fn drain_reports_closed_after_eof() {
        let mut reader = reader_with(&[b"done"], true);
        assert_eq!(reader.drain(), "done");
        assert!(reader.is_closed());
    }

    #[test]
    fn incomplete_tail_is_flushed_lossily_on_eof() {
        let mut reader = reader_with(&[b"x\xC3"], true);
        assert_eq!(reader.drain(), "x\u{FFFD}");
        assert!(reader.is_closed());
    }
}
