use thiserror::Error;

/// Top-level error type for the `airsync-api` crate.
///
/// Covers every failure mode at the bus boundary: connection setup,
/// method calls, property reads, and object path validation.
/// `airsync-core` either wraps these with context or passes them through.
#[derive(Debug, Error)]
pub enum Error {
    // ── Bus ─────────────────────────────────────────────────────────
    /// Connection, method call, or signal subscription failure.
    #[error("D-Bus error: {0}")]
    Dbus(#[from] zbus::Error),

    /// Error reply from a standard `org.freedesktop.DBus.*` interface.
    #[error("D-Bus error reply: {0}")]
    Fdo(#[from] zbus::fdo::Error),

    // ── Addressing ──────────────────────────────────────────────────
    /// A string could not be used as a D-Bus object path.
    #[error("Invalid object path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// NetworkManager has no device bound to the requested interface.
    #[error("No NetworkManager device for interface '{interface}'")]
    DeviceNotFound { interface: String },
}

impl Error {
    /// Returns `true` if the remote object no longer exists.
    ///
    /// Objects routinely vanish between a lifecycle signal and the
    /// follow-up property read; callers treat this as a skip.
    pub fn is_gone(&self) -> bool {
        matches!(
            self.fdo(),
            Some(zbus::fdo::Error::UnknownObject(_) | zbus::fdo::Error::UnknownMethod(_))
        )
    }

    /// Returns `true` if the bus policy refused the call.
    pub fn is_access_denied(&self) -> bool {
        matches!(
            self.fdo(),
            Some(zbus::fdo::Error::AccessDenied(_) | zbus::fdo::Error::AuthFailed(_))
        )
    }

    fn fdo(&self) -> Option<&zbus::fdo::Error> {
        match self {
            Self::Fdo(e) => Some(e),
            Self::Dbus(zbus::Error::FDO(inner)) => Some(&**inner),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_object_is_gone() {
        let err = Error::Fdo(zbus::fdo::Error::UnknownObject("/ap/1".into()));
        assert!(err.is_gone());
    }

    #[test]
    fn wrapped_fdo_errors_are_classified() {
        let err = Error::Dbus(zbus::Error::FDO(Box::new(zbus::fdo::Error::AccessDenied(
            "not authorized".into(),
        ))));
        assert!(err.is_access_denied());
        assert!(!err.is_gone());
    }

    #[test]
    fn device_lookup_is_not_gone() {
        let err = Error::DeviceNotFound {
            interface: "wlan0".into(),
        };
        assert!(!err.is_gone());
        assert_eq!(err.to_string(), "No NetworkManager device for interface 'wlan0'");
    }
}
