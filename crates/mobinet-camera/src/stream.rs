// mobinet-camera/src/stream.rs
use crate::{Frame, FrameSource, Result};
use futures_core::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

// back‑pressure: source → channel → consumer
const DEPTH: usize = 4;

/// Drive a blocking [`FrameSource`] on its own thread and expose it as a
/// stream. The stream ends after the first source error, which is yielded.
pub fn frame_stream<S: FrameSource>(mut source: S) -> impl Stream<Item = Result<Frame>> + Send + Unpin {
    let (tx, rx) = mpsc::channel(DEPTH);

    std::thread::spawn(move || {
        loop {
            match source.next_frame_blocking() {
                Ok(f) => {
                    if tx.blocking_send(Ok(f)).is_err() {
                        break; // consumer dropped
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(Err(e));
                    break;
                }
            }
        }
        log::debug!("frame source thread exiting");
    });

    ReceiverStream::new(rx)
}
