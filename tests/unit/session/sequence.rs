use super::*;
use crate::encode::sink::InMemorySink;

const SIZE: CanvasSize = CanvasSize {
    width: 3,
    height: 2,
};
const FPS: Fps = Fps { num: 24, den: 1 };

fn frame(seed: u8) -> FrameRGBA {
    // Includes a translucent premultiplied pixel so a lossy reload would show.
    let mut data = vec![seed; 24];
    data[0..4].copy_from_slice(&[7, 3, 1, 9]);
    FrameRGBA {
        width: SIZE.width,
        height: SIZE.height,
        data,
        premultiplied: true,
    }
}

struct FailingSink;

impl FrameSink for FailingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> SawcutResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, _frame: &FrameRGBA) -> SawcutResult<()> {
        if idx.0 == 1 {
            return Err(SawcutError::validation("disk full"));
        }
        Ok(())
    }

    fn end(&mut self) -> SawcutResult<Option<PathBuf>> {
        Ok(None)
    }
}

#[test]
fn in_memory_sequence_keeps_order() {
    let mut seq = FrameSequence::in_memory(SIZE, FPS);
    assert!(seq.is_empty());
    for i in 0..3 {
        seq.push(frame(i * 10 + 20)).unwrap();
    }
    assert_eq!(seq.len(), 3);
    assert!(seq.spool_dir().is_none());
    assert_eq!(seq.frame(1).unwrap(), frame(30));
    assert!(seq.frame(3).is_err());
    assert_eq!(
        seq.into_frames().unwrap(),
        vec![frame(20), frame(30), frame(40)]
    );
}

#[test]
fn push_rejects_mismatched_size() {
    let mut seq = FrameSequence::in_memory(SIZE, FPS);
    let mut wrong = frame(1);
    wrong.width = 2;
    assert!(seq.push(wrong).is_err());
}

#[test]
fn spooled_sequence_writes_pngs_and_reloads_losslessly() {
    let root = tempfile::tempdir().unwrap();
    let mut seq = FrameSequence::spooled(SIZE, FPS, Some(root.path())).unwrap();
    seq.push(frame(50)).unwrap();
    seq.push(frame(60)).unwrap();

    let dir = seq.spool_dir().unwrap().to_path_buf();
    assert!(dir.starts_with(root.path()));
    assert!(dir.join("frame_00000.png").is_file());
    assert!(dir.join("frame_00001.png").is_file());

    assert_eq!(seq.frame(1).unwrap(), frame(60));
    assert_eq!(seq.into_frames().unwrap(), vec![frame(50), frame(60)]);
    assert!(!dir.exists());
}

#[test]
fn dropping_a_spooled_sequence_removes_its_directory() {
    let root = tempfile::tempdir().unwrap();
    let mut seq = FrameSequence::spooled(SIZE, FPS, Some(root.path())).unwrap();
    seq.push(frame(1)).unwrap();
    let dir = seq.spool_dir().unwrap().to_path_buf();
    drop(seq);
    assert!(!dir.exists());
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

#[test]
fn encode_streams_frames_in_order() {
    let root = tempfile::tempdir().unwrap();
    let mut seq = FrameSequence::spooled(SIZE, FPS, Some(root.path())).unwrap();
    for i in 0..4 {
        seq.push(frame(i)).unwrap();
    }

    let mut sink = InMemorySink::new();
    let out = seq.encode_into(&mut sink).unwrap();
    assert_eq!(out, None);
    assert!(sink.is_finished());
    assert_eq!(
        sink.config(),
        Some(SinkConfig {
            width: 3,
            height: 2,
            fps: FPS
        })
    );
    let indices: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(indices, [0, 1, 2, 3]);
    assert_eq!(sink.frames()[2].1, frame(2));
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

#[test]
fn sink_failure_becomes_encode_error_and_cleans_up() {
    let root = tempfile::tempdir().unwrap();
    let mut seq = FrameSequence::spooled(SIZE, FPS, Some(root.path())).unwrap();
    for i in 0..3 {
        seq.push(frame(i)).unwrap();
    }

    let err = seq.encode_into(&mut FailingSink).unwrap_err();
    match err {
        SawcutError::VideoEncode(msg) => assert!(msg.contains("disk full"), "{msg}"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

#[test]
fn missing_spool_parent_is_an_error() {
    let root = tempfile::tempdir().unwrap();
    let missing = root.path().join("nope");
    assert!(FrameSequence::spooled(SIZE, FPS, Some(&missing)).is_err());
}
