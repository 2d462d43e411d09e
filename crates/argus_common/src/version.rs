//! Host platform API versions with parsing, display, and ordering.

use std::fmt;
use std::str::FromStr;

/// A `major.minor` version of the host platform API.
///
/// The analyzer compares the version reported by the host against the
/// minimum it supports before enabling optional capabilities such as the
/// analysis cache. Ordering is lexicographic on `(major, minor)`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    major: u16,
    minor: u16,
}

impl ApiVersion {
    /// Creates a version from its major and minor components.
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Returns the major component.
    pub fn major(self) -> u16 {
        self.major
    }

    /// Returns the minor component.
    pub fn minor(self) -> u16 {
        self.minor
    }

    /// Returns `true` if this version is greater than or equal to `other`.
    pub fn is_at_least(self, other: ApiVersion) -> bool {
        self >= other
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl fmt::Debug for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiVersion({self})")
    }
}

/// Error type for parsing API version strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseApiVersionError {
    /// The input string that failed to parse.
    pub input: String,
}

impl fmt::Display for ParseApiVersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid API version: '{}'", self.input)
    }
}

impl std::error::Error for ParseApiVersionError {}

impl FromStr for ApiVersion {
    type Err = ParseApiVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseApiVersionError {
            input: s.to_string(),
        };

        let (major, minor) = s.split_once('.').ok_or_else(err)?;
        let major: u16 = major.parse().map_err(|_| err())?;
        let minor: u16 = minor.parse().map_err(|_| err())?;
        Ok(Self { major, minor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering() {
        assert!(ApiVersion::new(2, 1) > ApiVersion::new(2, 0));
        assert!(ApiVersion::new(3, 0) > ApiVersion::new(2, 9));
        assert_eq!(ApiVersion::new(1, 4), ApiVersion::new(1, 4));
    }

    #[test]
    fn is_at_least() {
        let min = ApiVersion::new(2, 1);
        assert!(ApiVersion::new(2, 1).is_at_least(min));
        assert!(ApiVersion::new(2, 5).is_at_least(min));
        assert!(ApiVersion::new(3, 0).is_at_least(min));
        assert!(!ApiVersion::new(2, 0).is_at_least(min));
        assert!(!ApiVersion::new(1, 9).is_at_least(min));
    }

    #[test]
    fn parse_valid() {
        let v: ApiVersion = "2.1".parse().unwrap();
        assert_eq!(v, ApiVersion::new(2, 1));
        assert_eq!(v.major(), 2);
        assert_eq!(v.minor(), 1);
    }

    #[test]
    fn parse_with_whitespace() {
        let v: ApiVersion = " 10.42 ".parse().unwrap();
        assert_eq!(v, ApiVersion::new(10, 42));
    }

    #[test]
    fn parse_invalid() {
        assert!("".parse::<ApiVersion>().is_err());
        assert!("2".parse::<ApiVersion>().is_err());
        assert!("2.x".parse::<ApiVersion>().is_err());
        assert!("a.1".parse::<ApiVersion>().is_err());
        assert!("-1.2".parse::<ApiVersion>().is_err());
    }

    #[test]
    fn display_roundtrip() {
        let v = ApiVersion::new(9, 4);
        assert_eq!(format!("{v}"), "9.4");
        assert_eq!("9.4".parse::<ApiVersion>().unwrap(), v);
    }
}
