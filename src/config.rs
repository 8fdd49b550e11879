//! Receive-side limits.

use crate::error::Error;

/// Configuration shared by the deframer and the `std::io` adapters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Upper bound on logical bytes collected for one frame, checksum trailer
    /// included. `None` accepts frames of any length.
    pub max_frame_len: Option<usize>,
}

impl Config {
    pub fn with_max_frame_len(max_frame_len: usize) -> Self {
        Self {
            max_frame_len: Some(max_frame_len),
        }
    }

    /// Check the limit against the trailer size of the checksum in use.
    pub fn validate(&self, trailer: usize) -> Result<(), Error> {
        match self.max_frame_len {
            Some(max) if max < trailer => Err(Error::FrameLimitTooSmall { max, trailer }),
            _ => Ok(()),
        }
    }

    /// Largest message that still fits under the limit.
    pub fn max_message_len(&self, trailer: usize) -> Option<usize> {
        self.max_frame_len.map(|max| max.saturating_sub(trailer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_by_default() {
        let cfg = Config::default();
        assert!(cfg.validate(4).is_ok());
        assert_eq!(cfg.max_message_len(4), None);
    }

    #[test]
    fn rejects_limit_below_trailer() {
        let err = Config::with_max_frame_len(1).validate(2).unwrap_err();
        assert!(matches!(err, Error::FrameLimitTooSmall { max: 1, trailer: 2 }));
        assert!(Config::with_max_frame_len(2).validate(2).is_ok());
    }

    #[test]
    fn message_budget_excludes_trailer() {
        assert_eq!(Config::with_max_frame_len(129).max_message_len(2), Some(127));
    }
}
