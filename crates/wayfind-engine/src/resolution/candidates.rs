use crate::error::CheckError;
use serde::{Deserialize, Serialize};
use wayfind_common::protocol::Selector;

/// Alternative selectors for one logical element, most preferred first.
///
/// Never empty. Resolution takes the first selector that matches anything;
/// there is no scoring between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Selector>", into = "Vec<Selector>")]
pub struct Candidates(Vec<Selector>);

impl Candidates {
    pub fn new(selectors: Vec<Selector>) -> Result<Self, CheckError> {
        if selectors.is_empty() {
            return Err(CheckError::InvalidCandidates);
        }
        Ok(Self(selectors))
    }

    /// Build from textual selectors (`"#login"`, `"xpath=//button"`).
    pub fn parse<S: AsRef<str>>(selectors: &[S]) -> Result<Self, CheckError> {
        let parsed = selectors
            .iter()
            .map(|s| s.as_ref().parse::<Selector>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| CheckError::InvalidCandidates)?;
        Self::new(parsed)
    }

    pub fn single(selector: Selector) -> Self {
        Self(vec![selector])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Selector> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn describe(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl From<Selector> for Candidates {
    fn from(selector: Selector) -> Self {
        Self::single(selector)
    }
}

impl TryFrom<Vec<Selector>> for Candidates {
    type Error = CheckError;

    fn try_from(selectors: Vec<Selector>) -> Result<Self, Self::Error> {
        Self::new(selectors)
    }
}

impl From<Candidates> for Vec<Selector> {
    fn from(candidates: Candidates) -> Self {
        candidates.0
    }
}
