use std::fmt;

/// Status returned by every call into a model.
///
/// Variants are ordered by severity, so `status > Status::Warning` is the test
/// for a call whose result must not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// The call succeeded.
    Ok,

    /// The call succeeded, but something worth reporting happened.
    Warning,

    /// The result of this particular call cannot be used.
    Discard,

    /// The call failed; the instance must be terminated.
    Error,

    /// The instance is unusable from now on.
    Fatal,

    /// An asynchronous call has not completed yet.
    Pending,
}

impl Status {
    /// Returns `true` if the result of the call may be used.
    #[must_use]
    pub fn is_usable(self) -> bool {
        self <= Self::Warning
    }

    /// Returns the conventional name of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warning => "Warning",
            Self::Discard => "Discard",
            Self::Error => "Error",
            Self::Fatal => "Fatal",
            Self::Pending => "Pending",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_order() {
        let ordered = [
            Status::Ok,
            Status::Warning,
            Status::Discard,
            Status::Error,
            Status::Fatal,
            Status::Pending,
        ];

        for pair in ordered.windows(2) {
            assert!(pair[0] < pair[1], "{} should be below {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn only_ok_and_warning_are_usable() {
        assert!(Status::Ok.is_usable());
        assert!(Status::Warning.is_usable());
        assert!(!Status::Discard.is_usable());
        assert!(!Status::Error.is_usable());
        assert!(!Status::Fatal.is_usable());
        assert!(!Status::Pending.is_usable());
    }

    #[test]
    fn displays_conventional_names() {
        assert_eq!(Status::Ok.to_string(), "OK");
        assert_eq!(Status::Pending.to_string(), "Pending");
    }
}
