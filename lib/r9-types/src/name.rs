/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NodeNameError {
    #[error("empty name")]
    Empty,
    #[error("invalid character {1:?} at offset {0}")]
    InvalidCharacter(usize, char),
}

/// A validated cluster or policy identifier.
///
/// Non-empty, restricted to alphanumerics and `- _ . /`, matched case
/// sensitively wherever it is looked up.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeName(String);

impl NodeName {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for NodeName {
    type Err = NodeNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(NodeNameError::Empty);
        }
        for (i, c) in s.char_indices() {
            if !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/')) {
                return Err(NodeNameError::InvalidCharacter(i, c));
            }
        }
        Ok(NodeName(s.to_string()))
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NodeName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
