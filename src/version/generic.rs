//! version::generic
//!
//! Dotted versions compared segment by segment.
//!
//! `1.2.3`, `1.2`, `1.0.0.beta1` and `2.0.0-rc.1` all parse. Segments are
//! split on `.` and `-`, and again wherever digits meet letters, so
//! `1.0.0beta1` is `[1, 0, 0, "beta", 1]`. A version with any letter segment
//! is a prerelease. Build metadata after `+` is ignored.
//!
//! # Ordering
//!
//! Segments compare pairwise, padding the shorter version with `0`. Numbers
//! compare numerically, letters lexically, and a letter segment sorts below
//! any number, so `1.0.0.beta < 1.0.0 == 1.0`.

use std::cmp::Ordering;
use std::fmt;

use super::{SchemeVersion, VersionError, VersionScheme};

/// Rubygems-like scheme used by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericScheme;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Number(u64),
    Text(String),
}

impl Segment {
    fn cmp_segment(&self, other: &Segment) -> Ordering {
        match (self, other) {
            (Segment::Number(a), Segment::Number(b)) => a.cmp(b),
            (Segment::Text(a), Segment::Text(b)) => a.cmp(b),
            (Segment::Number(_), Segment::Text(_)) => Ordering::Greater,
            (Segment::Text(_), Segment::Number(_)) => Ordering::Less,
        }
    }
}

const ZERO: Segment = Segment::Number(0);

/// A parsed generic version. Keeps its original spelling for display.
#[derive(Debug, Clone)]
pub struct GenericVersion {
    raw: String,
    segments: Vec<Segment>,
}

impl GenericVersion {
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let raw = input.trim();
        let core = raw.split('+').next().unwrap_or_default();

        let valid = core.starts_with(|c: char| c.is_ascii_digit())
            && core
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        if !valid {
            return Err(VersionError::InvalidVersion(input.to_string()));
        }

        let mut segments = Vec::new();
        for part in core.split(['.', '-']) {
            if part.is_empty() {
                return Err(VersionError::InvalidVersion(input.to_string()));
            }
            segments.extend(split_alnum(part)?);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Version for `~>`: drop prerelease and last segment, bump the new last.
    fn bump(&self) -> GenericVersion {
        let mut numbers: Vec<u64> = self
            .segments
            .iter()
            .take_while(|s| matches!(s, Segment::Number(_)))
            .map(|s| match s {
                Segment::Number(n) => *n,
                Segment::Text(_) => 0,
            })
            .collect();
        if numbers.len() > 1 {
            numbers.pop();
        }
        if let Some(last) = numbers.last_mut() {
            *last += 1;
        }

        let raw = numbers
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".");
        GenericVersion {
            raw,
            segments: numbers.into_iter().map(Segment::Number).collect(),
        }
    }
}

fn split_alnum(part: &str) -> Result<Vec<Segment>, VersionError> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut digits = false;

    for c in part.chars() {
        let is_digit = c.is_ascii_digit();
        if !current.is_empty() && is_digit != digits {
            out.push(to_segment(&current, digits)?);
            current.clear();
        }
        digits = is_digit;
        current.push(c);
    }
    if !current.is_empty() {
        out.push(to_segment(&current, digits)?);
    }
    Ok(out)
}

fn to_segment(text: &str, digits: bool) -> Result<Segment, VersionError> {
    if digits {
        text.parse()
            .map(Segment::Number)
            .map_err(|_| VersionError::InvalidVersion(text.to_string()))
    } else {
        Ok(Segment::Text(text.to_lowercase()))
    }
}

impl Ord for GenericVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).unwrap_or(&ZERO);
            let b = other.segments.get(i).unwrap_or(&ZERO);
            match a.cmp_segment(b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for GenericVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GenericVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GenericVersion {}

impl fmt::Display for GenericVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl SchemeVersion for GenericVersion {
    fn is_prerelease(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Text(_)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Eq,
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
    Pessimistic,
}

impl Operator {
    /// Longest operators first so `>=` is not read as `>`.
    const ALL: [(&'static str, Operator); 7] = [
        ("~>", Operator::Pessimistic),
        (">=", Operator::GtEq),
        ("<=", Operator::LtEq),
        ("!=", Operator::NotEq),
        ("=", Operator::Eq),
        (">", Operator::Gt),
        ("<", Operator::Lt),
    ];
}

/// A conjunction of comparators, e.g. `>= 1.0, < 2.0`.
#[derive(Debug, Clone)]
pub struct GenericRequirement {
    comparators: Vec<(Operator, GenericVersion)>,
}

impl GenericRequirement {
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidRequirement(input.to_string());

        let mut comparators = Vec::new();
        for clause in input.split(',') {
            let clause = clause.trim();
            if clause.is_empty() {
                return Err(invalid());
            }
            let (op, rest) = Operator::ALL
                .iter()
                .find_map(|(token, op)| clause.strip_prefix(token).map(|rest| (*op, rest)))
                .unwrap_or((Operator::Eq, clause));
            let version = GenericVersion::parse(rest.trim()).map_err(|_| invalid())?;
            comparators.push((op, version));
        }
        Ok(Self { comparators })
    }

    pub fn is_satisfied_by(&self, version: &GenericVersion) -> bool {
        self.comparators.iter().all(|(op, bound)| match op {
            Operator::Eq => version == bound,
            Operator::NotEq => version != bound,
            Operator::Gt => version > bound,
            Operator::GtEq => version >= bound,
            Operator::Lt => version < bound,
            Operator::LtEq => version <= bound,
            Operator::Pessimistic => version >= bound && *version < bound.bump(),
        })
    }
}

impl VersionScheme for GenericScheme {
    type Version = GenericVersion;
    type Requirement = GenericRequirement;

    fn parse_version(&self, input: &str) -> Result<GenericVersion, VersionError> {
        GenericVersion::parse(input)
    }

    fn parse_requirement(&self, input: &str) -> Result<GenericRequirement, VersionError> {
        GenericRequirement::parse(input)
    }

    fn satisfied_by(&self, requirement: &GenericRequirement, version: &GenericVersion) -> bool {
        requirement.is_satisfied_by(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> GenericVersion {
        GenericVersion::parse(s).unwrap()
    }

    fn req(s: &str) -> GenericRequirement {
        GenericRequirement::parse(s).unwrap()
    }

    mod parsing {
        use super::*;

        #[test]
        fn accepts_dotted_versions() {
            for input in ["1", "1.2", "1.2.3", "1.2.3.4", "2.0.0-rc.1", "1.0.0beta1"] {
                assert!(GenericVersion::parse(input).is_ok(), "{}", input);
            }
        }

        #[test]
        fn rejects_non_versions() {
            for input in ["", "v1.0", "abc", "1..2", "1.0_1", "master"] {
                assert!(GenericVersion::parse(input).is_err(), "{}", input);
            }
        }

        #[test]
        fn display_keeps_spelling() {
            assert_eq!(v("1.2.0-RC1").to_string(), "1.2.0-RC1");
        }

        #[test]
        fn build_metadata_ignored() {
            assert_eq!(v("1.0.0+build.5"), v("1.0.0"));
        }
    }

    mod ordering {
        use super::*;

        #[test]
        fn numeric_segments() {
            assert!(v("1.10.0") > v("1.9.0"));
            assert!(v("2") > v("1.99.99"));
        }

        #[test]
        fn padding_makes_equal() {
            assert_eq!(v("1.0"), v("1.0.0"));
            assert_eq!(v("1"), v("1.0.0.0"));
        }

        #[test]
        fn prerelease_below_release() {
            assert!(v("1.0.0.beta1") < v("1.0.0"));
            assert!(v("1.0.0-rc.1") < v("1.0.0"));
            assert!(v("1.0.0.alpha") < v("1.0.0.beta"));
            assert!(v("1.0.0-rc.1") > v("0.9.9"));
        }

        #[test]
        fn prerelease_detection() {
            assert!(v("1.0.0-beta").is_prerelease());
            assert!(v("1.0.0rc1").is_prerelease());
            assert!(!v("1.0.0").is_prerelease());
        }
    }

    mod requirements {
        use super::*;

        #[test]
        fn operators() {
            assert!(req("> 1.0.0").is_satisfied_by(&v("1.1.0")));
            assert!(!req("> 1.0.0").is_satisfied_by(&v("1.0.0")));
            assert!(req(">= 1.0.0").is_satisfied_by(&v("1.0")));
            assert!(req("< 2").is_satisfied_by(&v("1.9")));
            assert!(req("<= 2").is_satisfied_by(&v("2.0.0")));
            assert!(req("!= 1.5").is_satisfied_by(&v("1.6")));
            assert!(req("1.5").is_satisfied_by(&v("1.5.0")));
            assert!(req("=1.5").is_satisfied_by(&v("1.5")));
        }

        #[test]
        fn pessimistic() {
            let r = req("~> 1.2.3");
            assert!(r.is_satisfied_by(&v("1.2.9")));
            assert!(!r.is_satisfied_by(&v("1.3.0")));
            assert!(!r.is_satisfied_by(&v("1.2.2")));

            let r = req("~> 1.2");
            assert!(r.is_satisfied_by(&v("1.9")));
            assert!(!r.is_satisfied_by(&v("2.0")));

            let r = req("~> 1");
            assert!(r.is_satisfied_by(&v("1.5")));
            assert!(!r.is_satisfied_by(&v("2.0")));
        }

        #[test]
        fn conjunction() {
            let r = req(">= 1.0, < 2.0");
            assert!(r.is_satisfied_by(&v("1.5")));
            assert!(!r.is_satisfied_by(&v("2.0")));
            assert!(!r.is_satisfied_by(&v("0.9")));
        }

        #[test]
        fn rejects_garbage() {
            assert!(GenericRequirement::parse("").is_err());
            assert!(GenericRequirement::parse(">= ").is_err());
            assert!(GenericRequirement::parse("~> x.y").is_err());
            assert!(GenericRequirement::parse(">= 1.0,").is_err());
        }
    }
}
