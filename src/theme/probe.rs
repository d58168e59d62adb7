//! OSC 11 background-color query.
//!
//! Query:    `ESC ] 11 ; ? ESC \` followed by a DA1 request `ESC [ c`
//! Response: `ESC ] 11 ; rgb:RRRR/GGGG/BBBB` terminated by BEL or `ESC \`,
//!           then the DA1 report `ESC [ ? … c`
//!
//! Every terminal answers DA1, so its report marks the end of the exchange.
//! A terminal without OSC 11 support sends only the DA1 report. When the
//! exchange does not finish in time, pending input is discarded so a late
//! report cannot reach the shell.

use std::time::Duration;

use crate::color::Theme;

/// Errors from querying the terminal background.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The terminal did not answer in time
    #[error("terminal did not answer the background query within {0:?}")]
    Timeout(Duration),

    /// No controlling terminal to query
    #[error("no controlling terminal")]
    NoTerminal,

    /// The terminal answered with something other than a color report
    #[error("unrecognized background report '{0}'")]
    BadResponse(String),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Background queries are not implemented on this platform
    #[error("background query not supported on this platform")]
    Unsupported,
}

/// Source of the terminal's background classification.
pub trait BackgroundProbe {
    /// Ask the terminal for its background and classify it.
    fn query_background(&self, timeout: Duration) -> Result<Theme, ProbeError>;
}

/// Queries the controlling terminal (`/dev/tty`) directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct TtyProbe;

#[cfg(unix)]
const BG_COLOR_QUERY: &[u8] = b"\x1b]11;?\x1b\\";

/// Primary device attributes request.
#[cfg(unix)]
const DA1_QUERY: &[u8] = b"\x1b[c";

/// Upper bound on bytes read while waiting for a report.
#[cfg(unix)]
const MAX_RESPONSE_LEN: usize = 256;

#[cfg(unix)]
impl BackgroundProbe for TtyProbe {
    fn query_background(&self, timeout: Duration) -> Result<Theme, ProbeError> {
        use std::io::Write;
        use std::os::unix::io::AsRawFd;

        let mut tty = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open("/dev/tty")
            .map_err(|_| ProbeError::NoTerminal)?;

        // Raw mode keeps the report from being echoed or line-buffered.
        let _raw = crate::terminal::RawModeGuard::enter()?;

        tty.write_all(BG_COLOR_QUERY)?;
        tty.write_all(DA1_QUERY)?;
        tty.flush()?;

        let (response, complete) = read_response(&mut tty, timeout)?;
        if !complete {
            // SAFETY: the descriptor belongs to `tty`, which is open.
            unsafe {
                libc::tcflush(tty.as_raw_fd(), libc::TCIFLUSH);
            }
        }

        match parse_background_response(&response) {
            Some(theme) => Ok(theme),
            None if !complete => Err(ProbeError::Timeout(timeout)),
            None => Err(ProbeError::BadResponse(
                String::from_utf8_lossy(&response).escape_debug().to_string(),
            )),
        }
    }
}

#[cfg(not(unix))]
impl BackgroundProbe for TtyProbe {
    fn query_background(&self, _timeout: Duration) -> Result<Theme, ProbeError> {
        Err(ProbeError::Unsupported)
    }
}

/// Read until the DA1 report arrives or `timeout` elapses.
///
/// Returns the bytes read and whether the DA1 report was among them.
#[cfg(unix)]
fn read_response(tty: &mut std::fs::File, timeout: Duration) -> Result<(Vec<u8>, bool), ProbeError> {
    use std::io::Read;
    use std::os::unix::io::AsRawFd;
    use std::time::Instant;

    let deadline = Instant::now() + timeout;
    let mut response = Vec::with_capacity(64);
    let mut buf = [0u8; 64];

    while response.len() < MAX_RESPONSE_LEN {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok((response, false));
        }

        let mut fds = libc::pollfd {
            fd: tty.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        let millis = remaining.as_millis().clamp(1, i32::MAX as u128) as libc::c_int;
        // SAFETY: `fds` is a valid pollfd for the duration of the call.
        let ready = unsafe { libc::poll(&mut fds, 1, millis) };
        if ready < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err.into());
        }
        if ready == 0 {
            return Ok((response, false));
        }

        let n = tty.read(&mut buf)?;
        if n == 0 {
            break;
        }
        response.extend_from_slice(&buf[..n]);
        if contains_da1_reply(&response) {
            return Ok((response, true));
        }
    }

    Ok((response, false))
}

/// Check for a DA1 report (`ESC [ ? <digits and ;> c`) anywhere in `buf`.
pub(crate) fn contains_da1_reply(buf: &[u8]) -> bool {
    buf.windows(3).enumerate().any(|(i, w)| {
        if w != b"\x1b[?" {
            return false;
        }
        let params = &buf[i + 3..];
        let end = params.iter().position(|b| !(b.is_ascii_digit() || *b == b';'));
        matches!(end, Some(n) if n > 0 && params[n] == b'c')
    })
}

/// Classify an OSC 11 report by BT.601 luminance (`< 0.5` is dark).
///
/// Components may have 1 to 4 hex digits each, as in X11 color specs.
pub fn parse_background_response(bytes: &[u8]) -> Option<Theme> {
    let s = std::str::from_utf8(bytes).ok()?;
    let rgb_data = &s[s.find("rgb:")? + 4..];

    let parts: Vec<&str> = rgb_data
        .split('/')
        .take(3)
        .map(|p| {
            // Trim the terminator (ST, BEL) from the last component.
            let end = p.find(|c: char| !c.is_ascii_hexdigit()).unwrap_or(p.len());
            &p[..end]
        })
        .collect();
    if parts.len() < 3 {
        return None;
    }

    let mut norm = [0f64; 3];
    for (slot, part) in norm.iter_mut().zip(&parts) {
        if part.is_empty() || part.len() > 4 {
            return None;
        }
        let value = u16::from_str_radix(part, 16).ok()?;
        let max = (1u32 << (4 * part.len())) - 1;
        *slot = f64::from(value) / f64::from(max);
    }

    Some(super::classify_background(norm[0], norm[1], norm[2]))
}
