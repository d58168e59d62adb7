//! Background color read from terminal emulator configuration.
//!
//! Consulted when the terminal does not answer the OSC 11 query. Readers
//! cover kitty, Alacritty, Konsole, GNOME Terminal (through `dconf`) and
//! X resources. Every file is looked up below an explicit home directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::classify_background;
use crate::color::{Rgb, Theme};

/// Terminal emulators whose configuration can be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    Kitty,
    Alacritty,
    Konsole,
    Gnome,
    Xresources,
}

/// Readers tried after the running terminal's own, in order.
///
/// GNOME settings live in dconf rather than a file, so they are only read
/// when GNOME Terminal is the running terminal.
const FILE_READERS: [TerminalKind; 4] = [
    TerminalKind::Kitty,
    TerminalKind::Alacritty,
    TerminalKind::Konsole,
    TerminalKind::Xresources,
];

/// Variables a terminal exports into its child processes.
const TERMINAL_MARKERS: [(&str, TerminalKind); 4] = [
    ("KITTY_WINDOW_ID", TerminalKind::Kitty),
    ("ALACRITTY_WINDOW_ID", TerminalKind::Alacritty),
    ("KONSOLE_VERSION", TerminalKind::Konsole),
    ("GNOME_TERMINAL_SCREEN", TerminalKind::Gnome),
];

impl TerminalKind {
    /// Guess the running terminal from its exported markers, then
    /// `TERM_PROGRAM`, then `TERM`.
    pub fn detect(env: &dyn Fn(&str) -> Option<String>) -> Option<Self> {
        for (var, kind) in TERMINAL_MARKERS {
            if env(var).is_some() {
                return Some(kind);
            }
        }
        ["TERM_PROGRAM", "TERM"]
            .into_iter()
            .filter_map(|var| env(var))
            .find_map(|name| Self::from_name(&name))
    }

    /// Identify a terminal by program name (`kitty`, `xterm-256color`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        if name.contains("kitty") {
            Some(TerminalKind::Kitty)
        } else if name.contains("alacritty") {
            Some(TerminalKind::Alacritty)
        } else if name.contains("konsole") {
            Some(TerminalKind::Konsole)
        } else if name.contains("gnome") {
            Some(TerminalKind::Gnome)
        } else if name.contains("xterm") || name.contains("rxvt") {
            Some(TerminalKind::Xresources)
        } else {
            None
        }
    }
}

/// Background color found in a terminal's configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBackground {
    pub terminal: TerminalKind,
    pub rgb: Rgb,
    /// File or dconf key the color came from.
    pub source: String,
}

impl ConfigBackground {
    pub fn theme(&self) -> Theme {
        let Rgb { r, g, b } = self.rgb;
        classify_background(f64::from(r) / 255.0, f64::from(g) / 255.0, f64::from(b) / 255.0)
    }
}

type DconfRead = Box<dyn Fn(&[&str]) -> Option<String>>;

/// Reads terminal configuration below one home directory.
pub struct TerminalConfigs {
    home: PathBuf,
    dconf: DconfRead,
}

impl std::fmt::Debug for TerminalConfigs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalConfigs").field("home", &self.home).finish()
    }
}

impl TerminalConfigs {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            dconf: Box::new(run_dconf),
        }
    }

    /// Replace the `dconf` command. Receives the arguments and returns
    /// trimmed stdout, or `None` when the command failed.
    pub fn with_dconf(mut self, dconf: impl Fn(&[&str]) -> Option<String> + 'static) -> Self {
        self.dconf = Box::new(dconf);
        self
    }

    /// Background configured for `running`, otherwise the first one found
    /// among the file-configured terminals.
    pub fn background(&self, running: Option<TerminalKind>) -> Option<ConfigBackground> {
        running
            .into_iter()
            .chain(FILE_READERS.into_iter().filter(|kind| Some(*kind) != running))
            .find_map(|kind| self.read(kind))
    }

    /// Background configured for one terminal.
    pub fn read(&self, kind: TerminalKind) -> Option<ConfigBackground> {
        let (rgb, source) = match kind {
            TerminalKind::Kitty => self.kitty(),
            TerminalKind::Alacritty => self.alacritty(),
            TerminalKind::Konsole => self.konsole(),
            TerminalKind::Gnome => self.gnome(),
            TerminalKind::Xresources => self.xresources(),
        }?;
        Some(ConfigBackground {
            terminal: kind,
            rgb,
            source,
        })
    }

    fn kitty(&self) -> Option<(Rgb, String)> {
        let dir = self.home.join(".config").join("kitty");
        // Themes are included after kitty.conf, so later files win.
        ["kitty.conf", "theme.conf", "current-theme.conf"]
            .into_iter()
            .map(|name| dir.join(name))
            .filter_map(|path| Some((kitty_background(&fs::read_to_string(&path).ok()?)?, path)))
            .last()
            .map(|(rgb, path)| (rgb, path.display().to_string()))
    }

    fn alacritty(&self) -> Option<(Rgb, String)> {
        let dir = self.home.join(".config").join("alacritty");
        read_with(&dir.join("alacritty.toml"), alacritty_toml_background)
            .or_else(|| read_with(&dir.join("alacritty.yml"), alacritty_yaml_background))
    }

    fn konsole(&self) -> Option<(Rgb, String)> {
        let data = self.home.join(".local").join("share").join("konsole");

        let mut schemes: Vec<PathBuf> = fs::read_dir(&data)
            .ok()?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "colorscheme"))
            .collect();
        schemes.sort();
        if let Some(name) = self.konsole_default_scheme(&data) {
            schemes.insert(0, data.join(format!("{name}.colorscheme")));
        }

        schemes.iter().find_map(|path| read_with(path, konsole_background))
    }

    /// Color scheme named by the default profile in `konsolerc`.
    fn konsole_default_scheme(&self, data: &Path) -> Option<String> {
        let rc = fs::read_to_string(self.home.join(".config").join("konsolerc")).ok()?;
        let profile = ini_value(&rc, "Desktop Entry", "DefaultProfile")?;
        let text = fs::read_to_string(data.join(profile)).ok()?;
        ini_value(&text, "Appearance", "ColorScheme")
    }

    fn gnome(&self) -> Option<(Rgb, String)> {
        const PROFILES: &str = "/org/gnome/terminal/legacy/profiles:/";

        let default_key = format!("{PROFILES}default");
        let id = (self.dconf)(&["read", default_key.as_str()])
            .map(|value| unquote(&value).to_string())
            .filter(|id| !id.is_empty())
            .or_else(|| {
                let list = (self.dconf)(&["list", PROFILES])?;
                list.lines()
                    .find_map(|line| Some(line.trim().strip_prefix(':')?.strip_suffix('/')?.to_string()))
            })?;

        let themed_key = format!("{PROFILES}:{id}/use-theme-colors");
        if (self.dconf)(&["read", themed_key.as_str()]).as_deref() == Some("true") {
            return None;
        }

        let key = format!("{PROFILES}:{id}/background-color");
        let rgb = parse_gnome_color(&(self.dconf)(&["read", key.as_str()])?)?;
        Some((rgb, key))
    }

    fn xresources(&self) -> Option<(Rgb, String)> {
        let path = [".Xresources", ".Xdefaults"]
            .into_iter()
            .map(|name| self.home.join(name))
            .find(|path| path.is_file())?;
        read_with(&path, xresources_background)
    }
}

fn read_with(path: &Path, parse: fn(&str) -> Option<Rgb>) -> Option<(Rgb, String)> {
    let rgb = parse(&fs::read_to_string(path).ok()?)?;
    Some((rgb, path.display().to_string()))
}

fn run_dconf(args: &[&str]) -> Option<String> {
    let output = Command::new("dconf").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Parse `#rgb`, `#rrggbb` or `0xrrggbb`, optionally quoted. Anything after
/// the first whitespace is ignored.
pub(crate) fn parse_hex(value: &str) -> Option<Rgb> {
    let value = value.split_whitespace().next()?.trim_matches(|c| c == '\'' || c == '"');
    let digits = value
        .strip_prefix('#')
        .or_else(|| value.strip_prefix("0x"))
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };
    if !expanded.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

/// `r,g,b` decimal components. Extra components are ignored.
fn parse_triplet(value: &str) -> Option<Rgb> {
    let mut parts = value.split(',').map(|p| p.trim().parse::<u8>().ok());
    Some(Rgb::new(parts.next()??, parts.next()??, parts.next()??))
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches('\'')
}

/// `background #rrggbb` lines. The last one wins.
fn kitty_background(text: &str) -> Option<Rgb> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_once(char::is_whitespace)?;
            if key == "background" {
                parse_hex(value.trim())
            } else {
                None
            }
        })
        .last()
}

/// `colors.primary.background` in `alacritty.toml`.
fn alacritty_toml_background(text: &str) -> Option<Rgb> {
    let table: toml::Table = toml::from_str(text).ok()?;
    table.get("colors")?.get("primary")?.get("background")?.as_str().and_then(parse_hex)
}

/// First `background:` key in `alacritty.yml`; the primary colors come first.
fn alacritty_yaml_background(text: &str) -> Option<Rgb> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| parse_hex(line.strip_prefix("background:")?))
}

/// `Color=r,g,b` in the `[Background]` section of a Konsole color scheme.
fn konsole_background(text: &str) -> Option<Rgb> {
    parse_triplet(&ini_value(text, "Background", "Color")?)
}

/// dconf string holding `rgb(r,g,b)` or `#rrggbb`.
fn parse_gnome_color(value: &str) -> Option<Rgb> {
    let value = unquote(value);
    match value.strip_prefix("rgb(").and_then(|v| v.strip_suffix(')')) {
        Some(inner) => parse_triplet(inner),
        None => parse_hex(value),
    }
}

/// `*background: #rrggbb` and class-qualified variants. The last one wins.
fn xresources_background(text: &str) -> Option<Rgb> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('!') && !line.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            if key.trim().to_ascii_lowercase().ends_with("background") {
                parse_hex(value)
            } else {
                None
            }
        })
        .last()
}

/// Value of `key` inside `[section]` of an INI-style file.
fn ini_value(text: &str, section: &str, key: &str) -> Option<String> {
    let mut in_section = false;
    for line in text.lines().map(str::trim) {
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_section = name == section;
        } else if in_section {
            if let Some((k, v)) = line.split_once('=') {
                if k.trim() == key {
                    return Some(v.trim().to_string());
                }
            }
        }
    }
    None
}
