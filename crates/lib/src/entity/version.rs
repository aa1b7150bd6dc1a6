use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A dotted product version with one to four numeric fields.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version(Vec<u32>);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid version `{0}`: expected one to four dot separated numbers")]
pub struct VersionError(String);

impl Version {
  pub fn new(parts: &[u32]) -> Self {
    Self(parts.to_vec())
  }

  pub fn parts(&self) -> &[u32] {
    &self.0
  }
}

impl Default for Version {
  fn default() -> Self {
    Self(vec![1, 0, 0, 0])
  }
}

impl FromStr for Version {
  type Err = VersionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let parts = s
      .trim()
      .split('.')
      .map(|p| p.parse::<u32>())
      .collect::<Result<Vec<_>, _>>()
      .map_err(|_| VersionError(s.to_string()))?;

    if parts.is_empty() || parts.len() > 4 {
      return Err(VersionError(s.to_string()));
    }
    Ok(Self(parts))
  }
}

impl TryFrom<String> for Version {
  type Error = VersionError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<Version> for String {
  fn from(value: Version) -> Self {
    value.to_string()
  }
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for part in &self.0 {
      if !first {
        f.write_str(".")?;
      }
      write!(f, "{}", part)?;
      first = false;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_and_displays_dotted_versions() {
    let v: Version = "2.10.0.7".parse().unwrap();
    assert_eq!(v.parts(), &[2, 10, 0, 7]);
    assert_eq!(v.to_string(), "2.10.0.7");
  }

  #[test]
  fn rejects_garbage() {
    assert!("".parse::<Version>().is_err());
    assert!("1.x".parse::<Version>().is_err());
    assert!("1.2.3.4.5".parse::<Version>().is_err());
  }

  #[test]
  fn orders_numerically() {
    let a: Version = "1.9".parse().unwrap();
    let b: Version = "1.10".parse().unwrap();
    assert!(a < b);
  }

  #[test]
  fn deserializes_from_string() {
    let v: Version = serde_json::from_str("\"3.1\"").unwrap();
    assert_eq!(v, Version::new(&[3, 1]));
  }
}
