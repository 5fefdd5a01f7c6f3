//! Validation of untrusted domain input.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static DOMAIN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z0-9.-]+$").expect("valid domain pattern"));

/// A domain name restricted to ASCII letters, digits, dots and hyphens.
///
/// Once constructed the value is safe to splice into DNS query names and
/// `https://<domain>/...` URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Domain(String);

impl Domain {
    /// Validate raw input. Returns `None` for absent or disallowed input.
    ///
    /// The whole string must match; a trailing newline is rejected.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let raw = raw?;
        if DOMAIN_PATTERN.is_match(raw) {
            Some(Self(raw.to_owned()))
        } else {
            None
        }
    }

    /// The validated domain as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_domains() {
        for ok in ["example.com", "EXAMPLE.org", "xmpp-1.example.co.uk", "localhost"] {
            let domain = Domain::parse(Some(ok)).expect(ok);
            assert_eq!(domain.as_str(), ok);
        }
    }

    #[test]
    fn rejects_absent_and_empty() {
        assert!(Domain::parse(None).is_none());
        assert!(Domain::parse(Some("")).is_none());
    }

    #[test]
    fn rejects_disallowed_characters() {
        for bad in [
            "exa mple.com",
            "../etc",
            "example.com/",
            "example.com\n",
            "\nexample.com",
            "exämple.com",
            "user@example.com",
            "example.com:443",
            "_xmpp.example.com",
        ] {
            assert!(Domain::parse(Some(bad)).is_none(), "{bad:?} should be rejected");
        }
    }
}
