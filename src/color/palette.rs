//! xterm 256-color palette quantization.

use super::Rgb;

/// Canonical RGB values of the 16 system colors (xterm defaults).
#[rustfmt::skip]
const SYSTEM_PALETTE: [Rgb; 16] = [
    Rgb::new(0, 0, 0),       Rgb::new(205, 0, 0),     Rgb::new(0, 205, 0),     Rgb::new(205, 205, 0),
    Rgb::new(0, 0, 238),     Rgb::new(205, 0, 205),   Rgb::new(0, 205, 205),   Rgb::new(229, 229, 229),
    Rgb::new(127, 127, 127), Rgb::new(255, 0, 0),     Rgb::new(0, 255, 0),     Rgb::new(255, 255, 0),
    Rgb::new(92, 92, 255),   Rgb::new(255, 0, 255),   Rgb::new(0, 255, 255),   Rgb::new(255, 255, 255),
];

/// Levels of the 6×6×6 color cube.
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// Convert an RGB color to the nearest 256-color palette index.
///
/// Pure greys use the 24-step greyscale ramp (232–255), with cube black
/// and white at the extremes. Everything else lands in the color cube
/// (16–231). The system colors (0–15) are never produced since terminals
/// remap them freely.
pub fn rgb_to_256(rgb: Rgb) -> u8 {
    let Rgb { r, g, b } = rgb;
    if r == g && g == b {
        if r < 8 {
            return 16;
        }
        if r > 248 {
            return 231;
        }
        return 232 + ((r - 8) / 10).min(23);
    }

    16 + 36 * cube_index(r) + 6 * cube_index(g) + cube_index(b)
}

/// Nearest cube level for one channel.
///
/// Thresholds are the midpoints between the non-uniform cube levels
/// (48, 115, 155, 195, 235).
fn cube_index(v: u8) -> u8 {
    if v < 48 {
        0
    } else if v < 115 {
        1
    } else {
        (v - 35) / 40
    }
}

/// RGB representation of a 256-color palette index.
pub fn ansi256_to_rgb(index: u8) -> Rgb {
    if index < 16 {
        return SYSTEM_PALETTE[index as usize];
    }
    if index >= 232 {
        let gray = 8 + 10 * (index - 232);
        return Rgb::new(gray, gray, gray);
    }
    let idx = index - 16;
    Rgb::new(
        CUBE_LEVELS[(idx / 36) as usize],
        CUBE_LEVELS[((idx / 6) % 6) as usize],
        CUBE_LEVELS[(idx % 6) as usize],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primaries() {
        assert_eq!(rgb_to_256(Rgb::new(255, 0, 0)), 196);
        assert_eq!(rgb_to_256(Rgb::new(0, 255, 0)), 46);
        assert_eq!(rgb_to_256(Rgb::new(0, 0, 255)), 21);
    }

    #[test]
    fn test_greyscale_rules() {
        assert_eq!(rgb_to_256(Rgb::new(0, 0, 0)), 16);
        assert_eq!(rgb_to_256(Rgb::new(255, 255, 255)), 231);
        assert_eq!(rgb_to_256(Rgb::new(8, 8, 8)), 232);
        assert_eq!(rgb_to_256(Rgb::new(128, 128, 128)), 244);
        assert_eq!(rgb_to_256(Rgb::new(248, 248, 248)), 255);
    }

    #[test]
    fn test_cube_round_trip() {
        for index in 16..=231u8 {
            let rgb = ansi256_to_rgb(index);
            // Grey cube entries quantize onto the greyscale ramp instead.
            if rgb.r == rgb.g && rgb.g == rgb.b && index != 16 && index != 231 {
                continue;
            }
            assert_eq!(rgb_to_256(rgb), index, "index {index}");
        }
    }

    #[test]
    fn test_cube_corners() {
        assert_eq!(ansi256_to_rgb(16), Rgb::new(0, 0, 0));
        assert_eq!(ansi256_to_rgb(231), Rgb::new(255, 255, 255));
        assert_eq!(ansi256_to_rgb(232), Rgb::new(8, 8, 8));
        assert_eq!(ansi256_to_rgb(255), Rgb::new(238, 238, 238));
    }

    #[test]
    fn test_cube_index_midpoints() {
        assert_eq!(cube_index(47), 0);
        assert_eq!(cube_index(48), 1);
        assert_eq!(cube_index(114), 1);
        assert_eq!(cube_index(115), 2);
        assert_eq!(cube_index(235), 5);
        assert_eq!(cube_index(255), 5);
    }
}
