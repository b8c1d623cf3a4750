//! The set of named conditions present when a roll is made.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::powers::normalize_key;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Scenario {
    conditions: BTreeSet<String>,
}

impl Scenario {
    /// No conditions: only unconditional effects apply.
    pub fn unconditional() -> Self {
        Self::default()
    }

    pub fn with_conditions<I, S>(conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut scenario = Self::default();
        for condition in conditions {
            scenario.insert(condition.as_ref());
        }
        scenario
    }

    pub fn insert(&mut self, condition: &str) {
        let key = normalize_key(condition);
        if !key.is_empty() {
            self.conditions.insert(key);
        }
    }

    pub fn with(mut self, condition: &str) -> Self {
        self.insert(condition);
        self
    }

    /// `condition` must already be normalized (as stored in a [`crate::powers::Scope`]).
    pub fn has(&self, condition: &str) -> bool {
        self.conditions.contains(condition)
    }

    pub fn conditions(&self) -> impl Iterator<Item = &str> {
        self.conditions.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for Scenario {
    fn from(conditions: Vec<String>) -> Self {
        Self::with_conditions(conditions)
    }
}

impl From<Scenario> for Vec<String> {
    fn from(scenario: Scenario) -> Self {
        scenario.conditions.into_iter().collect()
    }
}
