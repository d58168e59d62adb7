//! Frame store manifest (`manifest.toml`).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::generator::GeneratorOptions;
use crate::color::ColorMode;

/// File name of the manifest inside a frame store.
pub const MANIFEST_FILE: &str = "manifest.toml";

/// Describes how a frame store was generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub width: u16,
    pub height: u16,
    pub color_mode: ColorMode,
    pub invert: bool,
    pub char_aspect: f32,
    pub frame_count: usize,
    /// Source delay per frame in milliseconds
    #[serde(default)]
    pub delays_ms: Vec<u64>,
    /// SHA-256 of the source bytes and generation options
    pub fingerprint: String,
}

impl Manifest {
    /// Hash the source image together with every option that affects output.
    pub fn fingerprint(source: &[u8], options: &GeneratorOptions) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source);
        hasher.update(options.width.to_le_bytes());
        hasher.update(options.height.to_le_bytes());
        hasher.update(options.color_mode.name().as_bytes());
        hasher.update([options.invert as u8]);
        hasher.update(options.char_aspect.to_le_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Manifest {
        Manifest {
            width: 40,
            height: 20,
            color_mode: ColorMode::TrueColor,
            invert: false,
            char_aspect: 2.0,
            frame_count: 2,
            delays_ms: vec![100, 120],
            fingerprint: "abc".into(),
        }
    }

    #[test]
    fn test_manifest_toml_round_trip() {
        let m = sample();
        let text = m.to_toml().unwrap();
        assert!(text.contains("color_mode = \"truecolor\""));
        assert_eq!(Manifest::from_toml(&text).unwrap(), m);
    }

    #[test]
    fn test_manifest_delays_optional() {
        let text = "width = 4\nheight = 2\ncolor_mode = \"none\"\ninvert = false\n\
                    char_aspect = 2.0\nframe_count = 1\nfingerprint = \"x\"\n";
        let m = Manifest::from_toml(text).unwrap();
        assert!(m.delays_ms.is_empty());
        assert_eq!(m.color_mode, ColorMode::None);
    }

    #[test]
    fn test_fingerprint_depends_on_options() {
        let opts = GeneratorOptions::default();
        let a = Manifest::fingerprint(b"gif", &opts);
        assert_eq!(a, Manifest::fingerprint(b"gif", &opts));
        assert_eq!(a.len(), 64);

        let inverted = GeneratorOptions { invert: true, ..opts.clone() };
        assert_ne!(a, Manifest::fingerprint(b"gif", &inverted));
        assert_ne!(a, Manifest::fingerprint(b"png", &opts));
    }
}
