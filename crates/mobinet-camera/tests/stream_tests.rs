use mobinet_camera::{frame_stream, CameraError, Frame, PlaneBuffers, SyntheticSource};
use tokio_stream::StreamExt;

#[tokio::test]
async fn synthetic_stream_yields_frames_then_ends() {
    let src = SyntheticSource::new(16, 8).with_limit(3);
    let mut s = frame_stream(src);

    let mut bufs = PlaneBuffers::new();
    let mut frames = 0;
    while let Some(item) = s.next().await {
        match item {
            Ok(frame) => {
                bufs.ingest(&frame).expect("ingest");
                frame.release();
                frames += 1;
            }
            Err(CameraError::EndOfStream) => break,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(frames, 3);
    assert_eq!(bufs.allocations(), 3);
    assert_eq!((bufs.width(), bufs.height()), (16, 8));
}

#[test]
fn driver_buffers_are_released_on_drop() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Tracked(Vec<u8>, Arc<AtomicUsize>);
    impl AsRef<[u8]> for Tracked {
        fn as_ref(&self) -> &[u8] {
            &self.0
        }
    }
    impl Drop for Tracked {
        fn drop(&mut self) {
            self.1.fetch_add(1, Ordering::SeqCst);
        }
    }

    let released = Arc::new(AtomicUsize::new(0));
    let planes = vec![
        mobinet_camera::Plane::new(Tracked(vec![16; 16], released.clone()), 4, 1),
        mobinet_camera::Plane::new(Tracked(vec![128; 4], released.clone()), 2, 1),
        mobinet_camera::Plane::new(Tracked(vec![128; 4], released.clone()), 2, 1),
    ];
    let frame = Frame::new(4, 4, 0, planes);

    let mut bufs = PlaneBuffers::new();
    bufs.ingest(&frame).unwrap();
    assert_eq!(released.load(Ordering::SeqCst), 0);
    frame.release();
    assert_eq!(released.load(Ordering::SeqCst), 3);

    // the copy outlives the driver storage
    assert!(bufs.y().bytes().iter().all(|&b| b == 16));
}
