//! Streaming CSV row reader
//!
//! Reads one line at a time from any async byte source, so memory use does
//! not grow with file size. `\n` and `\r\n` endings are both accepted, mixed
//! freely within one file. The first line is the header row.
//!
//! Bytes that are not valid UTF-8 are replaced with U+FFFD and reading
//! carries on.

use std::borrow::Cow;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, warn};

use crate::error::IngestResult;
use crate::record::FlatRow;

const READ_BUFFER_BYTES: usize = 64 * 1024;

pub struct RowReader<R> {
    reader: R,
    buf: Vec<u8>,
    headers: Option<Vec<String>>,
    line_number: usize,
}

impl RowReader<BufReader<File>> {
    /// Open a file for row-at-a-time reading
    pub async fn open(path: impl AsRef<Path>) -> IngestResult<Self> {
        let file = File::open(path.as_ref()).await?;
        Ok(Self::from_read(file))
    }
}

impl<S: AsyncRead + Unpin> RowReader<BufReader<S>> {
    pub fn from_read(source: S) -> Self {
        Self::new(BufReader::with_capacity(READ_BUFFER_BYTES, source))
    }
}

impl<R: AsyncBufRead + Unpin> RowReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            headers: None,
            line_number: 0,
        }
    }

    /// Header names, once the first line has been read
    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    /// 1-based number of the last line read
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Next data row, or `None` at end of input.
    ///
    /// The header line is consumed on the first call.
    pub async fn next_row(&mut self) -> IngestResult<Option<FlatRow>> {
        if self.headers.is_none() {
            let Some(line) = self.next_line().await? else {
                return Ok(None);
            };
            let headers: Vec<String> = line.split(',').map(|h| h.trim().to_string()).collect();
            debug!(columns = headers.len(), ?headers, "Captured header row");
            self.headers = Some(headers);
        }

        let Some(line) = self.next_line().await? else {
            return Ok(None);
        };
        let headers = self.headers.as_deref().unwrap_or_default();
        Ok(Some(FlatRow::from_line(headers, &line)))
    }

    async fn next_line(&mut self) -> IngestResult<Option<String>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf).await? == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }

        let line = match String::from_utf8_lossy(&self.buf) {
            Cow::Borrowed(text) => text.to_string(),
            Cow::Owned(text) => {
                warn!(line = self.line_number, "Replaced invalid UTF-8 bytes");
                text
            }
        };
        Ok(Some(line))
    }
}
