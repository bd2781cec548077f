//! Target enumeration.
//!
//! A batch is described by a base prefix of three IPv4 octets and an
//! inclusive interval over the last octet. Enumeration is pure and
//! deterministic.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Result, RotationError};

/// One host subject to the batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Target {
    address: String,
}

impl Target {
    /// Create a target from an address.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    /// Get the host address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

/// A base prefix plus an inclusive interval over the final octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetRange {
    prefix: [u8; 3],
    start: u8,
    end: u8,
}

impl TargetRange {
    /// Create a validated range.
    ///
    /// `base_prefix` is three dotted octets such as `192.168.1`; a trailing
    /// dot is accepted. `start` and `end` must be valid octets with
    /// `start <= end`.
    pub fn new(base_prefix: &str, start: i64, end: i64) -> Result<Self> {
        let prefix = parse_prefix(base_prefix)?;
        let start = octet(start, "start")?;
        let end = octet(end, "end")?;
        if start > end {
            return Err(RotationError::invalid_range(format!(
                "start {start} is greater than end {end}"
            )));
        }
        Ok(Self { prefix, start, end })
    }

    /// First value of the interval.
    #[must_use]
    pub const fn start(&self) -> u8 {
        self.start
    }

    /// Last value of the interval.
    #[must_use]
    pub const fn end(&self) -> u8 {
        self.end
    }

    /// Number of targets in the range.
    #[must_use]
    pub const fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    /// A validated range is never empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// The base prefix in dotted form, without a trailing dot.
    #[must_use]
    pub fn prefix(&self) -> String {
        let [a, b, c] = self.prefix;
        format!("{a}.{b}.{c}")
    }

    /// Iterate over the addresses in ascending order.
    pub fn addresses(&self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        let [a, b, c] = self.prefix;
        (self.start..=self.end).map(move |d| Ipv4Addr::new(a, b, c, d))
    }

    /// Expand the range into concrete targets.
    #[must_use]
    pub fn targets(&self) -> Vec<Target> {
        self.addresses()
            .map(|addr| Target::new(addr.to_string()))
            .collect()
    }
}

impl fmt::Display for TargetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}-{}", self.prefix(), self.start, self.end)
    }
}

impl FromStr for TargetRange {
    type Err = RotationError;

    /// Parse `a.b.c.d` or `a.b.c.start-end`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (prefix, interval) = s
            .rsplit_once('.')
            .ok_or_else(|| RotationError::invalid_range(format!("'{s}' has no final octet")))?;

        let (start, end) = match interval.split_once('-') {
            Some((start, end)) => (parse_number(start)?, parse_number(end)?),
            None => {
                let single = parse_number(interval)?;
                (single, single)
            }
        };

        Self::new(prefix, start, end)
    }
}

/// Expand `base_prefix` and `[start, end]` into an ordered target list.
pub fn enumerate(base_prefix: &str, start: i64, end: i64) -> Result<Vec<Target>> {
    Ok(TargetRange::new(base_prefix, start, end)?.targets())
}

fn octet(value: i64, name: &str) -> Result<u8> {
    u8::try_from(value).map_err(|_| {
        RotationError::invalid_range(format!("{name} {value} is outside the octet range 0-255"))
    })
}

fn parse_number(text: &str) -> Result<i64> {
    text.trim()
        .parse()
        .map_err(|_| RotationError::invalid_range(format!("'{text}' is not a number")))
}

fn parse_prefix(base_prefix: &str) -> Result<[u8; 3]> {
    let trimmed = base_prefix.trim().trim_end_matches('.');
    let parts: Vec<&str> = trimmed.split('.').collect();
    if parts.len() != 3 {
        return Err(RotationError::invalid_range(format!(
            "base prefix '{base_prefix}' must have exactly three octets"
        )));
    }

    let mut prefix = [0u8; 3];
    for (slot, part) in prefix.iter_mut().zip(parts) {
        *slot = part.parse().map_err(|_| {
            RotationError::invalid_range(format!(
                "base prefix '{base_prefix}' has invalid octet '{part}'"
            ))
        })?;
    }
    Ok(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerate_basic() {
        let targets = enumerate("192.168.1", 1, 3).unwrap();
        let addrs: Vec<&str> = targets.iter().map(Target::address).collect();
        assert_eq!(addrs, ["192.168.1.1", "192.168.1.2", "192.168.1.3"]);
    }

    #[test]
    fn enumerate_single() {
        let targets = enumerate("10.0.0", 7, 7).unwrap();
        assert_eq!(targets, vec![Target::new("10.0.0.7")]);
    }

    #[test]
    fn enumerate_trailing_dot() {
        let targets = enumerate("10.0.0.", 254, 255).unwrap();
        assert_eq!(targets[0].address(), "10.0.0.254");
        assert_eq!(targets[1].address(), "10.0.0.255");
    }

    #[test]
    fn enumerate_reversed_fails() {
        let err = enumerate("10.0.0", 5, 4).unwrap_err();
        assert!(matches!(err, RotationError::InvalidRange { .. }));
    }

    #[test]
    fn enumerate_out_of_range_fails() {
        assert!(enumerate("10.0.0", -1, 4).is_err());
        assert!(enumerate("10.0.0", 0, 256).is_err());
    }

    #[test]
    fn bad_prefix_fails() {
        assert!(enumerate("10.0", 1, 2).is_err());
        assert!(enumerate("10.0.0.0", 1, 2).is_err());
        assert!(enumerate("10.x.0", 1, 2).is_err());
        assert!(enumerate("10.0.300", 1, 2).is_err());
    }

    #[test]
    fn range_from_str() {
        let range: TargetRange = "192.168.1.10-20".parse().unwrap();
        assert_eq!(range.prefix(), "192.168.1");
        assert_eq!(range.start(), 10);
        assert_eq!(range.end(), 20);
        assert_eq!(range.len(), 11);
        assert_eq!(range.to_string(), "192.168.1.10-20");

        let single: TargetRange = "172.16.0.9".parse().unwrap();
        assert_eq!(single.len(), 1);

        assert!("172.16.0.9-".parse::<TargetRange>().is_err());
        assert!("hostname".parse::<TargetRange>().is_err());
    }
}
