//! On-disk frame store.
//!
//! A store is a directory of `frame_NNNNN.txt` files (one encoded frame
//! each, zero-padded index) plus a `manifest.toml`. Unpadded names such as
//! `frame_7.txt` are read too; files are always ordered by numeric index.

use std::fs;
use std::path::{Path, PathBuf};

use super::codec::{decode_frame, encode_frame};
use super::error::FrameError;
use super::frame::{Frame, FrameSequence};
use super::manifest::{Manifest, MANIFEST_FILE};

const FRAME_PREFIX: &str = "frame_";
const FRAME_SUFFIX: &str = ".txt";

/// Frame files of a store in playback order.
pub type FrameFiles = Vec<(usize, PathBuf)>;

/// A directory holding generated frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameStore {
    dir: PathBuf,
}

impl FrameStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default store location: `<data dir>/gifzitto/anim`.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("gifzitto").join("anim"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the frame file for `index`.
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(frame_file_name(index))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    /// Create the directory if needed and verify that files can be written.
    pub fn ensure_writable(&self) -> Result<(), FrameError> {
        fs::create_dir_all(&self.dir).map_err(|e| FrameError::output_write(&self.dir, e))?;

        let probe = self.dir.join(format!(".write-probe-{}", std::process::id()));
        fs::write(&probe, b"").map_err(|e| FrameError::output_write(&self.dir, e))?;
        let _ = fs::remove_file(&probe);
        Ok(())
    }

    /// List frame files sorted by index.
    ///
    /// A missing directory is an empty store.
    pub fn frame_files(&self) -> Result<FrameFiles, FrameError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(FrameError::StoreRead {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| FrameError::StoreRead {
                path: self.dir.clone(),
                source,
            })?;
            let name = entry.file_name();
            if let Some(index) = name.to_str().and_then(parse_frame_index) {
                files.push((index, entry.path()));
            }
        }
        files.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        Ok(files)
    }

    /// Read the manifest, if one exists and parses.
    pub fn manifest(&self) -> Option<Manifest> {
        let path = self.manifest_path();
        let text = fs::read_to_string(&path).ok()?;
        match Manifest::from_toml(&text) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                log::warn!("Ignoring unreadable manifest {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Load every frame file, keeping per-file failures in their slot.
    ///
    /// The outer error covers only failures to list the directory.
    pub fn load_slots(&self) -> Result<Vec<Result<Frame, FrameError>>, FrameError> {
        let files = self.frame_files()?;
        Ok(files.into_iter().map(|(_, path)| read_frame(&path)).collect())
    }

    /// Load all frames, failing on the first malformed file.
    pub fn load(&self) -> Result<FrameSequence, FrameError> {
        let frames = self.load_slots()?.into_iter().collect::<Result<Vec<_>, _>>()?;
        let delays = self
            .manifest()
            .filter(|m| m.frame_count == frames.len())
            .map(|m| m.delays_ms.into_iter().map(std::time::Duration::from_millis).collect())
            .unwrap_or_default();
        Ok(FrameSequence::with_delays(frames, delays))
    }

    /// Remove all frame files and the manifest. Returns how many frame
    /// files were removed.
    pub fn clean(&self) -> Result<usize, FrameError> {
        let files = self.frame_files()?;
        for (_, path) in &files {
            fs::remove_file(path).map_err(|e| FrameError::output_write(&self.dir, e))?;
        }
        match fs::remove_file(self.manifest_path()) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(FrameError::output_write(&self.dir, e)),
        }
        Ok(files.len())
    }

    /// Replace the store contents with `sequence`.
    ///
    /// Everything is first written to a staging directory inside the store.
    /// The old frames and manifest are then moved into a backup directory
    /// and the staged files renamed into place. If any rename fails the
    /// backup is put back, so the store never holds a partial sequence.
    /// Returns how many old frame files were replaced.
    pub fn publish(&self, sequence: &FrameSequence, manifest: &Manifest) -> Result<usize, FrameError> {
        let staging = self.dir.join(format!(".staging-{}", std::process::id()));
        let result = self.stage_and_swap(&staging, sequence, manifest);
        if staging.exists() {
            let _ = fs::remove_dir_all(&staging);
        }
        result
    }

    fn stage_and_swap(&self, staging: &Path, sequence: &FrameSequence, manifest: &Manifest) -> Result<usize, FrameError> {
        let write_err = |e| FrameError::output_write(staging, e);

        if staging.exists() {
            fs::remove_dir_all(staging).map_err(write_err)?;
        }
        fs::create_dir_all(staging).map_err(write_err)?;

        for (i, frame) in sequence.frames().iter().enumerate() {
            fs::write(staging.join(frame_file_name(i)), encode_frame(frame)).map_err(write_err)?;
        }
        let manifest_text = manifest
            .to_toml()
            .map_err(|e| write_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        fs::write(staging.join(MANIFEST_FILE), manifest_text).map_err(write_err)?;

        let backup = self.dir.join(format!(".previous-{}", std::process::id()));
        let previous = self.set_aside(&backup)?;
        let manifest_path = self.manifest_path();
        let replaced = previous.iter().filter(|p| **p != manifest_path).count();

        match self.move_in(staging, sequence.len()) {
            Ok(()) => {
                let _ = fs::remove_dir_all(&backup);
                Ok(replaced)
            }
            Err(e) => {
                log::warn!("Publishing to {} failed, restoring previous frames", self.dir.display());
                for i in 0..sequence.len() {
                    let _ = fs::remove_file(self.frame_path(i));
                }
                if manifest_path.is_file() {
                    let _ = fs::remove_file(&manifest_path);
                }
                if restore(&backup, &previous) {
                    let _ = fs::remove_dir_all(&backup);
                }
                Err(e)
            }
        }
    }

    /// Move the current frame files and manifest into `backup`.
    ///
    /// Returns their original paths. On failure the files already moved are
    /// put back.
    fn set_aside(&self, backup: &Path) -> Result<Vec<PathBuf>, FrameError> {
        let dir_err = |e| FrameError::output_write(&self.dir, e);

        if backup.exists() {
            fs::remove_dir_all(backup).map_err(dir_err)?;
        }
        fs::create_dir_all(backup).map_err(dir_err)?;

        let mut current: Vec<PathBuf> = self.frame_files()?.into_iter().map(|(_, path)| path).collect();
        let manifest_path = self.manifest_path();
        if manifest_path.is_file() {
            current.push(manifest_path);
        }

        let mut moved = Vec::with_capacity(current.len());
        for path in current {
            let Some(name) = path.file_name() else { continue };
            if let Err(e) = fs::rename(&path, backup.join(name)) {
                if restore(backup, &moved) {
                    let _ = fs::remove_dir_all(backup);
                }
                return Err(dir_err(e));
            }
            moved.push(path);
        }
        Ok(moved)
    }

    fn move_in(&self, staging: &Path, count: usize) -> Result<(), FrameError> {
        let swap_err = |e| FrameError::output_write(&self.dir, e);
        for i in 0..count {
            fs::rename(staging.join(frame_file_name(i)), self.frame_path(i)).map_err(swap_err)?;
        }
        fs::rename(staging.join(MANIFEST_FILE), self.manifest_path()).map_err(swap_err)
    }
}

/// Move files set aside in `backup` back to their original paths.
///
/// Returns false if any file could not be restored; the backup directory
/// then still holds it.
fn restore(backup: &Path, originals: &[PathBuf]) -> bool {
    let mut complete = true;
    for path in originals {
        let Some(name) = path.file_name() else { continue };
        if let Err(e) = fs::rename(backup.join(name), path) {
            log::error!("Could not restore {}: {}", path.display(), e);
            complete = false;
        }
    }
    complete
}

fn frame_file_name(index: usize) -> String {
    format!("{FRAME_PREFIX}{index:05}{FRAME_SUFFIX}")
}

/// Parse the index out of `frame_<digits>.txt`.
fn parse_frame_index(name: &str) -> Option<usize> {
    let digits = name.strip_prefix(FRAME_PREFIX)?.strip_suffix(FRAME_SUFFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn read_frame(path: &Path) -> Result<Frame, FrameError> {
    let bytes = fs::read(path).map_err(|source| FrameError::StoreRead {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| FrameError::FrameDecode {
        path: path.to_path_buf(),
        reason: "not valid UTF-8".to_string(),
    })?;
    decode_frame(&text).map_err(|e| FrameError::FrameDecode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_file_name_is_padded() {
        assert_eq!(frame_file_name(0), "frame_00000.txt");
        assert_eq!(frame_file_name(123), "frame_00123.txt");
    }

    #[test]
    fn test_parse_frame_index() {
        assert_eq!(parse_frame_index("frame_00012.txt"), Some(12));
        assert_eq!(parse_frame_index("frame_7.txt"), Some(7));
        assert_eq!(parse_frame_index("frame_.txt"), None);
        assert_eq!(parse_frame_index("frame_1a.txt"), None);
        assert_eq!(parse_frame_index("frame_1.txt.bak"), None);
        assert_eq!(parse_frame_index("manifest.toml"), None);
    }

    #[test]
    fn test_legacy_names_sort_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for i in [10, 2, 1] {
            fs::write(dir.path().join(format!("frame_{i}.txt")), format!("{}", i % 10)).unwrap();
        }
        let store = FrameStore::new(dir.path());
        let indices: Vec<usize> = store.frame_files().unwrap().into_iter().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![1, 2, 10]);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FrameStore::new(dir.path().join("absent"));
        assert!(store.frame_files().unwrap().is_empty());
        assert!(store.load_slots().unwrap().is_empty());
        assert!(store.manifest().is_none());
    }

    #[test]
    fn test_malformed_file_stays_in_its_slot() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("frame_00000.txt"), "ab\ncd").unwrap();
        fs::write(dir.path().join("frame_00001.txt"), "\x1b[2Jxx").unwrap();
        let slots = FrameStore::new(dir.path()).load_slots().unwrap();
        assert_eq!(slots.len(), 2);
        assert!(slots[0].is_ok());
        assert!(matches!(slots[1], Err(FrameError::FrameDecode { .. })));
    }
}
