// ── System uptime ──
//
// BSS ages are relative; the registry stores absolute seconds since boot.
// The read happens once per property-change event, off the mutation loop,
// and is bounded by a timeout.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;

/// Reader for a `/proc/uptime`-format file.
#[derive(Debug, Clone)]
pub struct Uptime {
    path: PathBuf,
    timeout: Duration,
}

impl Uptime {
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }

    /// Whole seconds since boot.
    pub async fn seconds(&self) -> Result<u64, CoreError> {
        let contents = tokio::time::timeout(self.timeout, tokio::fs::read_to_string(&self.path))
            .await
            .map_err(|_| CoreError::UptimeTimeout {
                path: self.path.clone(),
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            })?
            .map_err(|source| CoreError::Uptime {
                path: self.path.clone(),
                source,
            })?;

        parse(&contents).ok_or_else(|| CoreError::UptimeParse {
            path: self.path.clone(),
            contents: contents.trim().to_owned(),
        })
    }
}

/// First field, integer part: `"12345.67 54321.00\n"` → `12345`.
fn parse(contents: &str) -> Option<u64> {
    let first = contents.split_whitespace().next()?;
    let whole = first.split('.').next()?;
    whole.parse().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::StalledFile;
    use std::io::Write;

    #[test]
    fn parse_takes_integer_part_of_first_field() {
        assert_eq!(parse("100.93 380.12\n"), Some(100));
        assert_eq!(parse("42"), Some(42));
        assert_eq!(parse(""), None);
        assert_eq!(parse("abc 1.0"), None);
    }

    #[tokio::test]
    async fn reads_uptime_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "100.00 250.00").unwrap();

        let uptime = Uptime::new(file.path(), Duration::from_secs(1));
        assert_eq!(uptime.seconds().await.unwrap(), 100);
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let uptime = Uptime::new(dir.path().join("uptime"), Duration::from_secs(1));
        assert!(matches!(uptime.seconds().await, Err(CoreError::Uptime { .. })));
    }

    #[tokio::test]
    async fn stalled_read_times_out() {
        let stalled = StalledFile::new();
        let uptime = Uptime::new(stalled.path(), Duration::from_millis(50));

        let err = uptime.seconds().await.unwrap_err();
        assert!(matches!(err, CoreError::UptimeTimeout { timeout_ms: 50, .. }));
    }

    #[tokio::test]
    async fn garbage_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not-a-number").unwrap();

        let uptime = Uptime::new(file.path(), Duration::from_secs(1));
        assert!(matches!(uptime.seconds().await, Err(CoreError::UptimeParse { .. })));
    }
}
