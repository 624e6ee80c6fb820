//! Line framing over a child's standard streams
//!
//! Generic over the underlying reader/writer so the framing can be exercised
//! against in-memory buffers.

use crate::error::Result;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter, Lines};

/// Reads newline-delimited lines from a child's stdout
#[derive(Debug)]
pub struct LineReader<R> {
    lines: Lines<BufReader<R>>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    /// Wrap a raw reader
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
        }
    }

    /// Read the next line without its terminator
    ///
    /// Returns `Ok(None)` at EOF.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.next_line().await?)
    }
}

/// Writes newline-delimited JSON messages to a child's stdin
#[derive(Debug)]
pub struct LineWriter<W> {
    writer: BufWriter<W>,
}

impl<W: AsyncWrite + Unpin> LineWriter<W> {
    /// Wrap a raw writer
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Serialize `message` as one line and flush it
    ///
    /// The flush matters: lpac blocks on its read until the whole line has
    /// arrived.
    pub async fn send<T: Serialize + ?Sized>(&mut self, message: &T) -> Result<()> {
        let json = serde_json::to_string(message)?;

        // Write message followed by newline
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        Ok(())
    }

    /// Access the underlying writer
    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    /// Unwrap the underlying writer, discarding anything not yet flushed
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::lf(b"{\"type\":\"lpa\"}\n")]
    #[case::crlf(b"{\"type\":\"lpa\"}\r\n")]
    #[case::unterminated(b"{\"type\":\"lpa\"}")]
    #[tokio::test]
    async fn test_reader_strips_terminator(#[case] input: &'static [u8]) {
        let mut reader = LineReader::new(input);
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some(r#"{"type":"lpa"}"#));
        assert_eq!(reader.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reader_splits_lines() {
        let input: &[u8] = b"{\"a\":1}\r\n{\"b\":2}\n\nlast";
        let mut reader = LineReader::new(input);

        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("{\"a\":1}"));
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("{\"b\":2}"));
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some(""));
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("last"));
        assert_eq!(reader.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_writer_frames_and_flushes() {
        // serde_json::Value objects serialize with sorted keys
        let mock = tokio_test::io::Builder::new()
            .write(b"{\"payload\":{\"ecode\":0},\"type\":\"apdu\"}\n")
            .build();
        let mut writer = LineWriter::new(mock);

        writer
            .send(&json!({"type": "apdu", "payload": {"ecode": 0}}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_writer_into_inner() {
        let mut writer = LineWriter::new(Vec::new());
        writer.send("hello").await.unwrap();
        writer.send(&[1, 2]).await.unwrap();
        assert_eq!(writer.get_ref().as_slice(), b"\"hello\"\n[1,2]\n");
        assert_eq!(writer.into_inner(), b"\"hello\"\n[1,2]\n".to_vec());
    }
}
