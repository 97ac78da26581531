#![forbid(unsafe_code)]

//! Device attribute and window geometry probes.
//!
//! Each probe writes a query to the terminal in raw mode and reads the reply
//! up to a terminator byte:
//!
//! | Probe | Query | Terminator |
//! |-------|-------|------------|
//! | [`device_attributes`] (DA1) | `ESC [ c` | `c` |
//! | [`terminal_geometry`] | `ESC [ 18 t` | `t` |
//! | [`terminal_pixel_geometry`] | `ESC [ 14 t` | `t` |
//!
//! # Failure model
//!
//! Probing fails soft. A missing terminal, an unsupported platform, a write or
//! read error, a reply longer than [`MAX_RESPONSE_LEN`], and a timeout all
//! produce an empty result. The only error is [`RestoreError`]: raw mode was
//! entered but the saved mode could not be put back.
//!
//! Raw mode is held by a [`RawModeGuard`] for the duration of one exchange and
//! is released on every path out of it.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::raw_mode::{ProbeDevice, RawModeError, RawModeGuard};
use crate::term_db::DetectInputs;

pub use crate::raw_mode::RestoreError;

/// DA1 query.
pub const DA1_QUERY: &[u8] = b"\x1b[c";
/// DA1 reply terminator.
pub const DA1_TERMINATOR: u8 = b'c';
/// Text area size in character cells.
pub const CELL_SIZE_QUERY: &[u8] = b"\x1b[18t";
/// Text area size in pixels.
pub const PIXEL_SIZE_QUERY: &[u8] = b"\x1b[14t";
/// Window-op reply terminator.
pub const WINDOW_OP_TERMINATOR: u8 = b't';

/// Longest reply accepted before the exchange is abandoned.
pub const MAX_RESPONSE_LEN: usize = 256;

/// Overall read deadline used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Length of the fixed preamble dropped from every reply.
const PREAMBLE_LEN: usize = 3;

/// DA1 attribute advertising sixel graphics.
pub const SIXEL_ATTRIBUTE: u32 = 4;

/// When [`detect_capabilities`](crate::resolve::detect_capabilities) may touch
/// the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbePolicy {
    /// Probe only when `TERM` names an xterm-family terminal on Linux.
    #[default]
    XtermOnly,
    /// Always probe (still fails soft without a terminal).
    Always,
    /// Never probe; resolve from the sequence table alone.
    Never,
}

impl ProbePolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::XtermOnly => "xterm",
            Self::Always => "always",
            Self::Never => "never",
        }
    }

    /// Whether a DA1 query should be sent for this environment.
    #[must_use]
    pub fn should_probe(self, inputs: &DetectInputs) -> bool {
        match self {
            Self::XtermOnly => cfg!(target_os = "linux") && inputs.term.contains("xterm"),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

impl fmt::Display for ProbePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized probe policy name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePolicyError {
    input: String,
}

impl fmt::Display for ParsePolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown probe policy {:?} (expected always, never or xterm)",
            self.input
        )
    }
}

impl std::error::Error for ParsePolicyError {}

impl FromStr for ProbePolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xterm" | "xterm-only" | "auto" => Ok(Self::XtermOnly),
            "always" | "1" | "on" => Ok(Self::Always),
            "never" | "0" | "off" => Ok(Self::Never),
            _ => Err(ParsePolicyError {
                input: s.to_string(),
            }),
        }
    }
}

/// Probe settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Overall deadline for reading one reply.
    pub timeout: Duration,
    pub policy: ProbePolicy,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            policy: ProbePolicy::default(),
        }
    }
}

impl ProbeConfig {
    /// Environment variable holding the timeout in milliseconds.
    pub const TIMEOUT_VAR: &'static str = "TERMPIX_PROBE_TIMEOUT_MS";
    /// Environment variable holding the probe policy.
    pub const POLICY_VAR: &'static str = "TERMPIX_PROBE";

    /// Defaults overridden by `TERMPIX_PROBE_TIMEOUT_MS` and `TERMPIX_PROBE`.
    ///
    /// Unparseable values are ignored with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup(Self::TIMEOUT_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config.timeout = Duration::from_millis(ms),
                Err(_) => {
                    crate::warn!(value = %raw, "ignoring invalid {}", Self::TIMEOUT_VAR);
                }
            }
        }
        if let Some(raw) = lookup(Self::POLICY_VAR) {
            match raw.parse::<ProbePolicy>() {
                Ok(policy) => config.policy = policy,
                Err(_err) => {
                    crate::warn!(error = %_err, "ignoring {}", Self::POLICY_VAR);
                }
            }
        }
        config
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ProbePolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Parsed DA1 reply: the terminal's self-reported attribute codes.
///
/// Empty when the terminal could not be queried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceAttributes(Vec<u32>);

impl DeviceAttributes {
    #[must_use]
    pub fn new(codes: Vec<u32>) -> Self {
        Self(codes)
    }

    /// Parse raw reply bytes (terminator excluded).
    #[must_use]
    pub fn from_response(response: &[u8]) -> Self {
        Self(parse_response(response))
    }

    #[must_use]
    pub fn contains(&self, code: u32) -> bool {
        self.0.contains(&code)
    }

    /// Whether attribute 4 (sixel graphics) is reported.
    #[must_use]
    pub fn supports_sixel(&self) -> bool {
        self.contains(SIXEL_ATTRIBUTE)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<u32> {
        self.0
    }
}

impl From<Vec<u32>> for DeviceAttributes {
    fn from(codes: Vec<u32>) -> Self {
        Self(codes)
    }
}

/// Text area size in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalGeometry {
    pub rows: u32,
    pub cols: u32,
}

/// Text area size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelGeometry {
    pub height: u32,
    pub width: u32,
}

/// Size of one character cell in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellGeometry {
    pub height: u32,
    pub width: u32,
}

impl CellGeometry {
    /// Divide pixel size by cell count.
    ///
    /// `None` if any component of either input is zero.
    #[must_use]
    pub fn from_parts(pixels: PixelGeometry, cells: TerminalGeometry) -> Option<Self> {
        if pixels.height == 0 || pixels.width == 0 {
            return None;
        }
        Some(Self {
            height: pixels.height.checked_div(cells.rows)?,
            width: pixels.width.checked_div(cells.cols)?,
        })
    }
}

/// Split a reply into its numeric fields.
///
/// Replies shorter than four bytes yield nothing. Otherwise the three-byte
/// preamble is dropped, the rest is split on `;` and every field that parses
/// as a decimal `u32` is kept, in order.
#[must_use]
pub fn parse_response(response: &[u8]) -> Vec<u32> {
    if response.len() <= PREAMBLE_LEN {
        return Vec::new();
    }
    response[PREAMBLE_LEN..]
        .split(|&b| b == b';')
        .filter_map(|field| std::str::from_utf8(field).ok()?.parse().ok())
        .collect()
}

/// One query/reply exchange in raw mode.
///
/// Returns the bytes read before `terminator` (excluded), or an empty vector
/// if raw mode was unavailable, the write or a read failed, the reply exceeded
/// [`MAX_RESPONSE_LEN`], or `timeout` elapsed first.
///
/// # Errors
///
/// [`RestoreError`] if the device's saved mode could not be reapplied.
pub fn exchange<D: ProbeDevice>(
    device: &mut D,
    query: &[u8],
    terminator: u8,
    timeout: Duration,
) -> Result<Vec<u8>, RestoreError> {
    let mut guard = match RawModeGuard::enter(device) {
        Ok(guard) => guard,
        Err(RawModeError::Unavailable(_err)) => {
            crate::debug!(error = %_err, "raw mode unavailable; probe skipped");
            return Ok(Vec::new());
        }
        Err(RawModeError::Restore(err)) => return Err(err),
    };
    let reply = read_reply(guard.device(), query, terminator, timeout);
    guard.finish()?;
    Ok(reply.unwrap_or_default())
}

fn read_reply<D: ProbeDevice>(
    device: &mut D,
    query: &[u8],
    terminator: u8,
    timeout: Duration,
) -> Option<Vec<u8>> {
    if let Err(_err) = device.write_query(query) {
        crate::debug!(error = %_err, "probe query write failed");
        return None;
    }

    let deadline = Instant::now() + timeout;
    let mut reply = Vec::new();
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            crate::debug!(read = reply.len(), "probe timed out");
            return None;
        }
        match device.read_byte(remaining) {
            Ok(Some(byte)) if byte == terminator => return Some(reply),
            Ok(Some(byte)) => {
                if reply.len() >= MAX_RESPONSE_LEN {
                    crate::debug!("probe reply too long; abandoned");
                    return None;
                }
                reply.push(byte);
            }
            Ok(None) => {
                crate::debug!(read = reply.len(), "probe timed out");
                return None;
            }
            Err(_err) => {
                crate::debug!(error = %_err, "probe read failed");
                return None;
            }
        }
    }
}

/// DA1 over `device`.
///
/// # Errors
///
/// See [`exchange`].
pub fn device_attributes_with<D: ProbeDevice>(
    device: &mut D,
    config: &ProbeConfig,
) -> Result<DeviceAttributes, RestoreError> {
    let reply = exchange(device, DA1_QUERY, DA1_TERMINATOR, config.timeout)?;
    let attrs = DeviceAttributes::from_response(&reply);
    crate::debug!(attributes = ?attrs.as_slice(), "device attributes");
    Ok(attrs)
}

/// Text area size in cells over `device`.
///
/// # Errors
///
/// See [`exchange`].
pub fn terminal_geometry_with<D: ProbeDevice>(
    device: &mut D,
    config: &ProbeConfig,
) -> Result<Option<TerminalGeometry>, RestoreError> {
    let reply = exchange(device, CELL_SIZE_QUERY, WINDOW_OP_TERMINATOR, config.timeout)?;
    Ok(match parse_response(&reply)[..] {
        [rows, cols, ..] => Some(TerminalGeometry { rows, cols }),
        _ => None,
    })
}

/// Text area size in pixels over `device`.
///
/// # Errors
///
/// See [`exchange`].
pub fn terminal_pixel_geometry_with<D: ProbeDevice>(
    device: &mut D,
    config: &ProbeConfig,
) -> Result<Option<PixelGeometry>, RestoreError> {
    let reply = exchange(device, PIXEL_SIZE_QUERY, WINDOW_OP_TERMINATOR, config.timeout)?;
    Ok(match parse_response(&reply)[..] {
        [height, width, ..] => Some(PixelGeometry { height, width }),
        _ => None,
    })
}

/// Cell size in pixels over `device`: pixel geometry divided by cell geometry.
///
/// # Errors
///
/// See [`exchange`].
pub fn cell_geometry_with<D: ProbeDevice>(
    device: &mut D,
    config: &ProbeConfig,
) -> Result<Option<CellGeometry>, RestoreError> {
    let Some(pixels) = terminal_pixel_geometry_with(device, config)? else {
        return Ok(None);
    };
    let Some(cells) = terminal_geometry_with(device, config)? else {
        return Ok(None);
    };
    Ok(CellGeometry::from_parts(pixels, cells))
}

#[cfg(unix)]
fn with_tty<T: Default>(
    probe: impl FnOnce(&mut crate::raw_mode::TtyDevice) -> Result<T, RestoreError>,
) -> Result<T, RestoreError> {
    match crate::raw_mode::TtyDevice::open() {
        Some(mut tty) => probe(&mut tty),
        None => Ok(T::default()),
    }
}

#[cfg(not(unix))]
fn with_tty<T: Default>(
    _probe: impl FnOnce(&mut NoDevice) -> Result<T, RestoreError>,
) -> Result<T, RestoreError> {
    crate::debug!("terminal probing unsupported on this platform");
    Ok(T::default())
}

#[cfg(not(unix))]
struct NoDevice;

#[cfg(not(unix))]
impl ProbeDevice for NoDevice {
    type Mode = ();

    fn capture_mode(&mut self) -> std::io::Result<()> {
        Err(std::io::Error::from(std::io::ErrorKind::Unsupported))
    }

    fn apply_raw(&mut self, _saved: &()) -> std::io::Result<()> {
        Ok(())
    }

    fn restore_mode(&mut self, _saved: &()) -> std::io::Result<()> {
        Ok(())
    }

    fn write_query(&mut self, _query: &[u8]) -> std::io::Result<()> {
        Ok(())
    }

    fn read_byte(&mut self, _timeout: Duration) -> std::io::Result<Option<u8>> {
        Ok(None)
    }
}

/// Query the controlling terminal's device attributes (DA1).
///
/// Empty when stdin is not a terminal, on unsupported platforms, or on
/// timeout.
///
/// # Errors
///
/// [`RestoreError`] if the terminal mode could not be restored.
pub fn device_attributes(config: &ProbeConfig) -> Result<DeviceAttributes, RestoreError> {
    with_tty(|tty| device_attributes_with(tty, config))
}

/// Query the text area size in character cells.
///
/// # Errors
///
/// [`RestoreError`] if the terminal mode could not be restored.
pub fn terminal_geometry(config: &ProbeConfig) -> Result<Option<TerminalGeometry>, RestoreError> {
    with_tty(|tty| terminal_geometry_with(tty, config))
}

/// Query the text area size in pixels.
///
/// # Errors
///
/// [`RestoreError`] if the terminal mode could not be restored.
pub fn terminal_pixel_geometry(
    config: &ProbeConfig,
) -> Result<Option<PixelGeometry>, RestoreError> {
    with_tty(|tty| terminal_pixel_geometry_with(tty, config))
}

/// Query the size of one character cell in pixels.
///
/// # Errors
///
/// [`RestoreError`] if the terminal mode could not be restored.
pub fn cell_geometry(config: &ProbeConfig) -> Result<Option<CellGeometry>, RestoreError> {
    with_tty(|tty| cell_geometry_with(tty, config))
}
