//! Loading a frame store for playback.

use std::time::Duration;

use super::placeholder::placeholder;
use super::BoundingBox;
use crate::frames::{FrameSequence, FrameStore};

/// Load every frame of `store`, fitted to `bbox`.
///
/// Never fails: an unreadable store is an empty sequence and a malformed
/// frame file is replaced by the placeholder in its slot. Frames of a
/// different size are resampled to the box.
pub fn load_sequence(store: &FrameStore, bbox: BoundingBox) -> FrameSequence {
    let slots = match store.load_slots() {
        Ok(slots) => slots,
        Err(e) => {
            log::warn!("{}", e);
            return FrameSequence::default();
        }
    };
    if slots.is_empty() {
        log::info!("No frames in {}", store.dir().display());
        return FrameSequence::default();
    }

    let frames: Vec<_> = slots
        .into_iter()
        .map(|slot| match slot {
            Ok(frame) => frame.resample(bbox.width, bbox.height),
            Err(e) => {
                log::warn!("{}; showing placeholder for this frame", e);
                placeholder(bbox)
            }
        })
        .collect();

    let delays = store
        .manifest()
        .filter(|m| m.frame_count == frames.len())
        .map(|m| m.delays_ms.into_iter().map(Duration::from_millis).collect())
        .unwrap_or_default();

    log::debug!("Loaded {} frame(s) from {}", frames.len(), store.dir().display());
    FrameSequence::with_delays(frames, delays)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let seq = load_sequence(&FrameStore::new(dir.path().join("nope")), BoundingBox::new(4, 2));
        assert!(seq.is_empty());
    }

    #[test]
    fn test_frames_resampled_to_box() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("frame_00000.txt"), "ab\ncd").unwrap();
        let seq = load_sequence(&FrameStore::new(dir.path()), BoundingBox::new(4, 4));
        assert_eq!(seq.dimensions(), (4, 4));
        assert_eq!(seq.frames()[0].to_string_display(), "aabb\naabb\nccdd\nccdd");
    }

    #[test]
    fn test_malformed_slot_becomes_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("frame_00000.txt"), "@@@@@\n@@@@@\n@@@@@").unwrap();
        std::fs::write(dir.path().join("frame_00001.txt"), "\x1b[5Aoops").unwrap();
        let bbox = BoundingBox::new(5, 3);
        let seq = load_sequence(&FrameStore::new(dir.path()), bbox);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.frames()[1], placeholder(bbox));
    }
}
