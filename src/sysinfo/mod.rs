//! System information text shown beside the animation.
//!
//! The compositor treats an [`InfoBlock`] as opaque lines; it only needs
//! their count and visible width.

mod modules;

pub use modules::{InfoModule, SystemInfo};

/// Display-ready lines of system information.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoBlock {
    lines: Vec<String>,
}

impl InfoBlock {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl From<Vec<String>> for InfoBlock {
    fn from(lines: Vec<String>) -> Self {
        Self::new(lines)
    }
}

impl FromIterator<String> for InfoBlock {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Produces the info block. Called again whenever playback refreshes it.
pub trait InfoProvider {
    fn collect(&self) -> InfoBlock;
}

/// A fixed info block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticInfo(pub InfoBlock);

impl InfoProvider for StaticInfo {
    fn collect(&self) -> InfoBlock {
        self.0.clone()
    }
}

impl<F: Fn() -> InfoBlock> InfoProvider for F {
    fn collect(&self) -> InfoBlock {
        self()
    }
}
