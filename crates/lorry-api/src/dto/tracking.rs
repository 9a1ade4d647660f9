//! Tracking DTOs

use serde::Deserialize;

/// Tracking lookup request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackRequest {
    pub lr_no: Option<String>,
}

impl TrackRequest {
    /// The queried number, trimmed; `None` when absent or blank
    pub fn number(&self) -> Option<&str> {
        self.lr_no.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_number_is_none() {
        assert!(TrackRequest { lr_no: None }.number().is_none());
        assert!(TrackRequest {
            lr_no: Some("  ".to_string())
        }
        .number()
        .is_none());
    }

    #[test]
    fn test_number_is_trimmed() {
        let req = TrackRequest {
            lr_no: Some(" 42 ".to_string()),
        };
        assert_eq!(req.number(), Some("42"));
    }
}
