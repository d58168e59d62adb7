//! Built-in system information modules.
//!
//! Everything is read from files (`/etc/os-release`, `/proc`, `/sys`),
//! `uname(2)`, `statvfs(3)` and environment variables. A module whose
//! source is unavailable is skipped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{InfoBlock, InfoProvider};

/// One line of the info block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoModule {
    Title,
    Separator,
    Os,
    Host,
    Kernel,
    Uptime,
    Shell,
    Desktop,
    Terminal,
    Cpu,
    Memory,
    Swap,
    Disk,
    Battery,
    Locale,
    Colors,
}

impl InfoModule {
    /// Default module order.
    pub const ALL: [InfoModule; 16] = [
        InfoModule::Title,
        InfoModule::Separator,
        InfoModule::Os,
        InfoModule::Host,
        InfoModule::Kernel,
        InfoModule::Uptime,
        InfoModule::Shell,
        InfoModule::Desktop,
        InfoModule::Terminal,
        InfoModule::Cpu,
        InfoModule::Memory,
        InfoModule::Swap,
        InfoModule::Disk,
        InfoModule::Battery,
        InfoModule::Locale,
        InfoModule::Colors,
    ];

    fn label(&self) -> &'static str {
        match self {
            InfoModule::Title | InfoModule::Separator | InfoModule::Colors => "",
            InfoModule::Os => "OS",
            InfoModule::Host => "Host",
            InfoModule::Kernel => "Kernel",
            InfoModule::Uptime => "Uptime",
            InfoModule::Shell => "Shell",
            InfoModule::Desktop => "DE",
            InfoModule::Terminal => "Terminal",
            InfoModule::Cpu => "CPU",
            InfoModule::Memory => "Memory",
            InfoModule::Swap => "Swap",
            InfoModule::Disk => "Disk",
            InfoModule::Battery => "Battery",
            InfoModule::Locale => "Locale",
        }
    }
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String>>;

/// Collects information about the running machine.
pub struct SystemInfo {
    modules: Vec<InfoModule>,
    styled: bool,
    root: PathBuf,
    env: EnvLookup,
}

impl Default for SystemInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemInfo {
    pub fn new() -> Self {
        Self {
            modules: InfoModule::ALL.to_vec(),
            styled: true,
            root: PathBuf::from("/"),
            env: Box::new(|key| std::env::var(key).ok()),
        }
    }

    /// Bold labels and color swatches. Disable for uncolored output.
    pub fn styled(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    pub fn with_modules(mut self, modules: Vec<InfoModule>) -> Self {
        self.modules = modules;
        self
    }

    /// Read `/etc`, `/proc` and `/sys` below another root.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_env(mut self, env: impl Fn(&str) -> Option<String> + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    fn read(&self, rel: &str) -> Option<String> {
        std::fs::read_to_string(self.root.join(rel)).ok()
    }

    fn env(&self, key: &str) -> Option<String> {
        (self.env)(key).filter(|v| !v.is_empty())
    }

    fn value(&self, module: InfoModule) -> Option<String> {
        match module {
            InfoModule::Title => {
                let user = self.env("USER").unwrap_or_else(|| "user".to_string());
                let host = self.hostname().unwrap_or_else(|| "host".to_string());
                Some(format!("{user}@{host}"))
            }
            InfoModule::Separator => None,
            InfoModule::Os => self.read("etc/os-release").and_then(|s| parse_os_release(&s)),
            InfoModule::Host => self.hostname(),
            InfoModule::Kernel => uname().map(|u| u.release),
            InfoModule::Uptime => self
                .read("proc/uptime")
                .and_then(|s| s.split_whitespace().next()?.parse::<f64>().ok())
                .map(|secs| format_uptime(secs as u64)),
            InfoModule::Shell => self.env("SHELL"),
            InfoModule::Desktop => self.env("XDG_CURRENT_DESKTOP").or_else(|| self.env("DESKTOP_SESSION")),
            InfoModule::Terminal => self.env("TERM_PROGRAM").or_else(|| self.env("TERM")),
            InfoModule::Cpu => self.read("proc/cpuinfo").and_then(|s| parse_cpu_model(&s)),
            InfoModule::Memory => {
                let mem = parse_meminfo(&self.read("proc/meminfo")?);
                let total = *mem.get("MemTotal")?;
                let available = *mem.get("MemAvailable").or_else(|| mem.get("MemFree"))?;
                Some(format_usage(total.saturating_sub(available), total))
            }
            InfoModule::Swap => {
                let mem = parse_meminfo(&self.read("proc/meminfo")?);
                let total = *mem.get("SwapTotal")?;
                if total == 0 {
                    return None;
                }
                let free = mem.get("SwapFree").copied().unwrap_or(total);
                Some(format_usage(total.saturating_sub(free), total))
            }
            InfoModule::Disk => disk_usage(&self.root),
            InfoModule::Battery => self.battery(),
            InfoModule::Locale => self.env("LC_ALL").or_else(|| self.env("LANG")),
            InfoModule::Colors => Some(color_swatches()),
        }
    }

    fn hostname(&self) -> Option<String> {
        self.read("etc/hostname")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| uname().map(|u| u.nodename))
    }

    fn battery(&self) -> Option<String> {
        let dir = self.root.join("sys/class/power_supply");
        let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
            .ok()?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.to_ascii_uppercase().starts_with("BAT"))
            })
            .collect();
        entries.sort();

        let bat = entries.first()?;
        let capacity = std::fs::read_to_string(bat.join("capacity")).ok()?;
        let status = std::fs::read_to_string(bat.join("status")).unwrap_or_default();
        let status = status.trim();
        if status.is_empty() {
            Some(format!("{}%", capacity.trim()))
        } else {
            Some(format!("{}% ({})", capacity.trim(), status))
        }
    }
}

impl InfoProvider for SystemInfo {
    fn collect(&self) -> InfoBlock {
        let mut lines = Vec::with_capacity(self.modules.len());
        let mut title_width = 0;

        for &module in &self.modules {
            match module {
                InfoModule::Separator => {
                    let width = if title_width > 0 { title_width } else { 28 };
                    lines.push("─".repeat(width));
                }
                InfoModule::Colors if !self.styled => {}
                InfoModule::Title => {
                    if let Some(title) = self.value(module) {
                        title_width = title.chars().count();
                        lines.push(if self.styled { format!("\x1b[1m{title}\x1b[0m") } else { title });
                    }
                }
                InfoModule::Colors => {
                    if let Some(swatches) = self.value(module) {
                        lines.push(swatches);
                    }
                }
                _ => match self.value(module) {
                    Some(value) if self.styled => lines.push(format!("\x1b[1m{}:\x1b[0m {}", module.label(), value)),
                    Some(value) => lines.push(format!("{}: {}", module.label(), value)),
                    None => log::debug!("Skipping unavailable info module {:?}", module),
                },
            }
        }

        InfoBlock::new(lines)
    }
}

/// `PRETTY_NAME`, falling back to `NAME`.
fn parse_os_release(text: &str) -> Option<String> {
    let field = |key: &str| {
        text.lines().find_map(|line| {
            let value = line.strip_prefix(key)?.strip_prefix('=')?;
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (!value.is_empty()).then(|| value.to_string())
        })
    };
    field("PRETTY_NAME").or_else(|| field("NAME"))
}

fn parse_cpu_model(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        let key = key.trim();
        if key == "model name" || key == "Hardware" || key == "cpu model" {
            let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
            (!value.is_empty()).then_some(value)
        } else {
            None
        }
    })
}

/// `/proc/meminfo` entries in KiB.
fn parse_meminfo(text: &str) -> HashMap<String, u64> {
    text.lines()
        .filter_map(|line| {
            let (key, rest) = line.split_once(':')?;
            let value = rest.split_whitespace().next()?.parse().ok()?;
            Some((key.trim().to_string(), value))
        })
        .collect()
}

fn format_uptime(secs: u64) -> String {
    let minutes = secs / 60;
    let (days, hours, mins) = (minutes / 1440, (minutes / 60) % 24, minutes % 60);
    if days > 0 {
        format!("{days}d {hours}h {mins}m")
    } else if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}

/// `used / total` with binary units, both given in KiB.
fn format_usage(used_kib: u64, total_kib: u64) -> String {
    format!("{} / {}", format_kib(used_kib), format_kib(total_kib))
}

fn format_kib(kib: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    let mut value = kib as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit >= 2 {
        format!("{:.1} {}", value, UNITS[unit])
    } else {
        format!("{:.0} {}", value, UNITS[unit])
    }
}

fn color_swatches() -> String {
    (0..8).map(|i| format!("\x1b[3{i}m██\x1b[0m")).collect::<Vec<_>>().join(" ")
}

struct Uname {
    nodename: String,
    release: String,
}

#[cfg(unix)]
fn uname() -> Option<Uname> {
    fn field(raw: &[libc::c_char]) -> String {
        let bytes: Vec<u8> = raw.iter().take_while(|&&c| c != 0).map(|&c| c as u8).collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    // SAFETY: utsname is plain data; uname fills it on success.
    let mut info: libc::utsname = unsafe { std::mem::zeroed() };
    if unsafe { libc::uname(&mut info) } != 0 {
        return None;
    }
    Some(Uname {
        nodename: field(&info.nodename),
        release: field(&info.release),
    })
}

#[cfg(not(unix))]
fn uname() -> Option<Uname> {
    None
}

#[cfg(unix)]
fn disk_usage(root: &Path) -> Option<String> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let path = CString::new(root.as_os_str().as_bytes()).ok()?;
    // SAFETY: statvfs is plain data and `path` is NUL-terminated.
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    if unsafe { libc::statvfs(path.as_ptr(), &mut stat) } != 0 {
        return None;
    }

    let block = stat.f_frsize as u64;
    let total = stat.f_blocks as u64 * block / 1024;
    let free = stat.f_bfree as u64 * block / 1024;
    if total == 0 {
        return None;
    }
    let used = total.saturating_sub(free);
    Some(format!("{} ({}%)", format_usage(used, total), used * 100 / total))
}

#[cfg(not(unix))]
fn disk_usage(_root: &Path) -> Option<String> {
    None
}
