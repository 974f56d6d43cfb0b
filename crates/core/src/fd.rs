//! Functional dependencies and decomposed schemas as reported by the
//! backend.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Delimiter between attribute names on one side of a dependency.
pub const ATTRIBUTE_DELIMITER: &str = ", ";

/// Shown by the FD viewer when no dependency was detected.
pub const EMPTY_FDS_MESSAGE: &str = "No Functional Dependencies found.";

/// One side of a functional dependency.
///
/// The backend writes both sides as lists, but a single bare name is
/// accepted too. The original shape is kept so the dependencies can be
/// posted back unchanged for the dependency-preservation check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Attributes {
    One(String),
    Many(Vec<String>),
}

impl Attributes {
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::One(name) => vec![name.as_str()],
            Self::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(name) => name.is_empty(),
            Self::Many(names) => names.is_empty(),
        }
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(ATTRIBUTE_DELIMITER))
    }
}

/// `lhs` determines `rhs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionalDependency {
    pub lhs: Attributes,
    pub rhs: Attributes,
}

impl FunctionalDependency {
    pub fn new(lhs: &[&str], rhs: &str) -> Self {
        Self {
            lhs: Attributes::Many(lhs.iter().map(|s| s.to_string()).collect()),
            rhs: Attributes::One(rhs.to_string()),
        }
    }
}

impl fmt::Display for FunctionalDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.lhs, self.rhs)
    }
}

/// Attribute names of one relation produced by normalization.
pub type DecomposedSchema = Vec<String>;

/// Lines shown by the FD viewer: one per dependency, or the empty-state
/// message.
pub fn fd_lines(fds: &[FunctionalDependency]) -> Vec<String> {
    if fds.is_empty() {
        return vec![EMPTY_FDS_MESSAGE.to_string()];
    }
    fds.iter().map(ToString::to_string).collect()
}
