//! Streamed operation records.
//!
//! A stream is a sequence of bare JSON documents, one per record, each
//! followed by a newline. Clients read it as newline-delimited JSON, not as an
//! array. Records are written and flushed one at a time.

use std::io;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One step of a streamed operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRecord {
    #[serde(rename = "H")]
    pub h: i64,
    #[serde(rename = "W")]
    pub w: i64,
}

impl StreamRecord {
    pub const fn new(h: i64, w: i64) -> Self {
        Self { h, w }
    }
}

/// Fixed sequence served for every VM until real operations exist.
pub fn demo_sequence() -> [StreamRecord; 3] {
    [
        StreamRecord::new(2, 7),
        StreamRecord::new(4, 7),
        StreamRecord::new(8, 7),
    ]
}

/// Destination for streamed records.
#[async_trait]
pub trait RecordSink: Send {
    /// Serialize `record` as one JSON document plus `\n` and flush it to the
    /// client before returning.
    async fn write_record(&mut self, record: &StreamRecord) -> io::Result<()>;
}

/// Encode a record the way every sink puts it on the wire.
pub fn encode_record(record: &StreamRecord) -> io::Result<Vec<u8>> {
    let mut buf = serde_json::to_vec(record)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Write `records` in order, stopping at the first failure.
///
/// Records already written stay delivered. Returns how many were written.
pub async fn emit<S, I>(sink: &mut S, records: I) -> io::Result<usize>
where
    S: RecordSink + ?Sized,
    I: IntoIterator<Item = StreamRecord>,
{
    let mut written = 0;
    for record in records {
        sink.write_record(&record).await?;
        written += 1;
    }
    Ok(written)
}
