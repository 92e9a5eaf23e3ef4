use serde::{Deserialize, Serialize};
use std::fmt;

/// A building-block identifier such as `I12`: one category letter followed
/// by a number picking the concrete compound within that category.
///
/// Construction goes through [`ReagentCode::parse`], which guarantees the
/// code is non-empty and trimmed. Whether the category letter is actually
/// configured is checked later, during matching.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ReagentCode(String);

impl ReagentCode {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("Empty reagent code".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Category letter, the first character of the code.
    pub fn category(&self) -> char {
        self.0.chars().next().unwrap_or(' ')
    }

    /// Numeric suffix after the category letter. Codes without a numeric
    /// suffix sort before all numbered codes of their category.
    pub fn index(&self) -> u32 {
        let mut chars = self.0.chars();
        chars.next();
        chars.as_str().parse().unwrap_or(0)
    }

    /// Sort key used wherever reagents need a deterministic order:
    /// numeric suffix first, category letter as tiebreak.
    pub fn sort_key(&self) -> (u32, char) {
        (self.index(), self.category())
    }
}

impl fmt::Display for ReagentCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ReagentCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ReagentCode({})", self.0)
    }
}

/// The two pipetting passes of a run. Early categories are dispensed in the
/// first pass, late categories in the second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    First,
    Second,
}
