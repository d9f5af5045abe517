//! Streamed HTTP response bodies.

use std::io;

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use govm_core::{RecordSink, StreamRecord, encode_record};

/// Feeds records into a response body one chunk at a time.
///
/// The channel holds a single chunk and a write waits until the response body
/// has taken its own chunk, so a record counts as written only once it left
/// the sink. A client that goes away before that fails the write.
pub struct ChunkSink {
    tx: mpsc::Sender<Result<Bytes, io::Error>>,
}

/// A connected sink and the response body it writes to.
pub fn channel() -> (ChunkSink, Body) {
    let (tx, rx) = mpsc::channel(1);
    (ChunkSink { tx }, Body::from_stream(ReceiverStream::new(rx)))
}

#[async_trait]
impl RecordSink for ChunkSink {
    async fn write_record(&mut self, record: &StreamRecord) -> io::Result<()> {
        let chunk = Bytes::from(encode_record(record)?);
        self.tx.send(Ok(chunk)).await.map_err(|_| disconnected())?;
        // The slot frees up once the body stream has pulled the chunk.
        drop(self.tx.reserve().await.map_err(|_| disconnected())?);
        Ok(())
    }
}

fn disconnected() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "client disconnected")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use futures_util::StreamExt;
    use govm_core::{demo_sequence, emit};

    #[tokio::test]
    async fn body_carries_one_line_per_record() {
        let (mut sink, body) = channel();
        let writer = tokio::spawn(async move { emit(&mut sink, demo_sequence()).await });

        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        assert_eq!(writer.await.unwrap().unwrap(), 3);
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            "{\"H\":2,\"W\":7}\n{\"H\":4,\"W\":7}\n{\"H\":8,\"W\":7}\n"
        );
    }

    #[tokio::test]
    async fn dropped_body_fails_the_writer() {
        let (mut sink, body) = channel();
        drop(body);
        let err = emit(&mut sink, demo_sequence()).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[tokio::test]
    async fn writer_waits_for_each_record_to_be_taken() {
        let (mut sink, body) = channel();
        let writer = tokio::spawn(async move { emit(&mut sink, demo_sequence()).await });
        let mut frames = body.into_data_stream();

        let first = frames.next().await.unwrap().unwrap();
        assert_eq!(&first[..], b"{\"H\":2,\"W\":7}\n");

        // The second record is queued but not taken, so the writer is parked.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!writer.is_finished());

        let rest: Vec<Bytes> = frames.map(|f| f.unwrap()).collect().await;
        assert_eq!(rest.len(), 2);
        assert_eq!(writer.await.unwrap().unwrap(), 3);
    }

    #[tokio::test]
    async fn disconnect_before_last_record_is_taken_fails_the_writer() {
        let (mut sink, body) = channel();
        let writer = tokio::spawn(async move { emit(&mut sink, demo_sequence()).await });
        let mut frames = body.into_data_stream();

        for _ in 0..2 {
            frames.next().await.unwrap().unwrap();
        }
        drop(frames);

        let err = writer.await.unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
