// ── Core error types ──
//
// Request-style operations (scan, activate) surface these to callers.
// Background paths (bootstrap, signal handling, BSS updates) log them
// and keep going; none of them terminates the mutation loop.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::{ApPath, BssPath};

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Transport ────────────────────────────────────────────────────
    /// Bus failure passed through untouched.
    #[error(transparent)]
    Transport(#[from] airsync_api::Error),

    #[error("Scan request failed: {source}")]
    ScanRequest {
        #[source]
        source: airsync_api::Error,
    },

    // ── Correlation ──────────────────────────────────────────────────
    /// A patch targeted a path the registry does not hold: the identity
    /// index and the registry have desynchronized.
    #[error("Access point not in registry: {path}")]
    UnknownAccessPoint { path: ApPath },

    #[error("BSS {path} reported a {len}-byte BSSID (expected 6)")]
    InvalidHardwareAddress { path: BssPath, len: usize },

    // ── Uptime ───────────────────────────────────────────────────────
    #[error("Cannot read uptime from {}: {source}", path.display())]
    Uptime {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unparseable uptime in {}: {contents:?}", path.display())]
    UptimeParse { path: PathBuf, contents: String },

    #[error("Reading uptime from {} timed out after {timeout_ms}ms", path.display())]
    UptimeTimeout { path: PathBuf, timeout_ms: u64 },

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Device has not been started")]
    NotStarted,

    #[error("Device already started")]
    AlreadyStarted,

    /// The mutation loop went away while a caller was feeding it.
    #[error("Mutation loop stopped")]
    Stopped,

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Returns `true` for correlation misses that are expected during
    /// startup and shutdown races.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::UnknownAccessPoint { .. } => true,
            Self::Transport(e) => e.is_gone(),
            _ => false,
        }
    }
}
