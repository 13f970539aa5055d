//! Newline-delimited framing.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::TransportError;

// ---------------------------------------------------------------------------
// FrameReader
// ---------------------------------------------------------------------------

/// Reads newline-terminated frames from a buffered byte stream.
///
/// Frames are returned with trailing whitespace (including the `\n` and
/// any `\r`) stripped. Blank lines are skipped. Reads are strictly
/// sequential: one call to [`next_frame`](Self::next_frame) yields exactly
/// one logical line.
#[derive(Debug)]
pub struct FrameReader<R> {
    inner: R,
    buf: Vec<u8>,
    frames_read: u64,
}

impl<R> FrameReader<R>
where
    R: AsyncBufRead + Unpin,
{
    /// Wraps a buffered reader. For a raw socket half, wrap it in
    /// `tokio::io::BufReader` first.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(4096),
            frames_read: 0,
        }
    }

    /// Waits for the next complete, non-blank frame.
    ///
    /// # Errors
    /// - [`TransportError::ConnectionClosed`] on end of stream, including a
    ///   stream that ends in the middle of a line.
    /// - [`TransportError::ReceiveFailed`] if the underlying read fails.
    pub async fn next_frame(&mut self) -> Result<Vec<u8>, TransportError> {
        loop {
            self.buf.clear();
            let n = self
                .inner
                .read_until(b'\n', &mut self.buf)
                .await
                .map_err(TransportError::ReceiveFailed)?;

            if n == 0 {
                return Err(TransportError::ConnectionClosed(
                    "end of stream".into(),
                ));
            }
            if self.buf.last() != Some(&b'\n') {
                return Err(TransportError::ConnectionClosed(format!(
                    "stream ended mid-frame after {n} byte(s)"
                )));
            }

            let len = trimmed_len(&self.buf);
            if len == 0 {
                tracing::trace!("skipping blank line");
                continue;
            }

            self.frames_read += 1;
            return Ok(self.buf[..len].to_vec());
        }
    }

    /// Number of non-blank frames returned so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Unwraps the reader, discarding nothing that was already buffered by
    /// the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// Length of `buf` once trailing ASCII whitespace is removed.
fn trimmed_len(buf: &[u8]) -> usize {
    buf.iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1)
}

// ---------------------------------------------------------------------------
// FrameWriter
// ---------------------------------------------------------------------------

/// Writes newline-terminated frames to a byte stream.
///
/// The protocol forbids newlines inside a message, so any `\n` or `\r`
/// in a frame is removed before exactly one `\n` is appended.
#[derive(Debug)]
pub struct FrameWriter<W> {
    inner: W,
    line: Vec<u8>,
}

impl<W> FrameWriter<W>
where
    W: AsyncWrite + Unpin,
{
    /// Wraps a writer (typically the write half of a TCP stream).
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            line: Vec::with_capacity(1024),
        }
    }

    /// Writes a single frame and flushes.
    ///
    /// # Errors
    /// Returns [`TransportError::SendFailed`] if the write or flush fails.
    pub async fn write_frame(
        &mut self,
        frame: &[u8],
    ) -> Result<(), TransportError> {
        self.write_frames(&[frame]).await
    }

    /// Writes several frames back to back with a single flush at the end.
    ///
    /// Used for a tag line followed by its payload line so the pair leaves
    /// in one write.
    ///
    /// # Errors
    /// Returns [`TransportError::SendFailed`] if the write or flush fails.
    pub async fn write_frames(
        &mut self,
        frames: &[&[u8]],
    ) -> Result<(), TransportError> {
        self.line.clear();
        for frame in frames {
            self.line.extend(
                frame.iter().copied().filter(|b| !matches!(b, b'\n' | b'\r')),
            );
            self.line.push(b'\n');
        }

        self.inner
            .write_all(&self.line)
            .await
            .map_err(TransportError::SendFailed)?;
        self.inner.flush().await.map_err(TransportError::SendFailed)
    }

    /// Shuts down the write direction. The peer sees end of stream.
    ///
    /// # Errors
    /// Returns [`TransportError::SendFailed`] if the shutdown fails.
    pub async fn close(&mut self) -> Result<(), TransportError> {
        self.inner
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    /// Unwraps the writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}
