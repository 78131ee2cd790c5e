//! Conditional independence assertions.
//!
//! `IndependenceAssertion` represents `event1 ⟂ event2 | event3`. The
//! relation is symmetric, so `(A ⟂ B | C)` and `(B ⟂ A | C)` compare equal
//! and hash alike.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{EstimatorError, Result};

/// `event1 ⟂ event2 | event3` over variable names.
#[derive(Debug, Clone, Eq)]
pub struct IndependenceAssertion {
    event1: BTreeSet<String>,
    event2: BTreeSet<String>,
    event3: BTreeSet<String>,
}

impl IndependenceAssertion {
    /// Builds an assertion; `event1` and `event2` must be non-empty.
    pub fn new<I1, I2, I3, S>(event1: I1, event2: I2, event3: I3) -> Result<Self>
    where
        I1: IntoIterator<Item = S>,
        I2: IntoIterator<Item = S>,
        I3: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let event1: BTreeSet<String> = event1.into_iter().map(Into::into).collect();
        let event2: BTreeSet<String> = event2.into_iter().map(Into::into).collect();
        let event3: BTreeSet<String> = event3.into_iter().map(Into::into).collect();
        if event1.is_empty() || event2.is_empty() {
            return Err(EstimatorError::InvalidAssertion(
                "event1 and event2 must both name at least one variable".to_string(),
            ));
        }
        Ok(Self {
            event1,
            event2,
            event3,
        })
    }

    /// `x ⟂ y | z` for single variables `x` and `y`.
    pub fn single(x: &str, y: &str, z: &[&str]) -> Self {
        let set = |vars: &[&str]| vars.iter().map(|v| v.to_string()).collect::<BTreeSet<_>>();
        Self {
            event1: set(&[x]),
            event2: set(&[y]),
            event3: set(z),
        }
    }

    pub fn event1(&self) -> &BTreeSet<String> {
        &self.event1
    }

    pub fn event2(&self) -> &BTreeSet<String> {
        &self.event2
    }

    pub fn event3(&self) -> &BTreeSet<String> {
        &self.event3
    }

    /// Whether the assertion has a conditioning set.
    pub fn is_conditional(&self) -> bool {
        !self.event3.is_empty()
    }

    /// Every variable the assertion mentions.
    pub fn variables(&self) -> BTreeSet<&str> {
        self.event1
            .iter()
            .chain(&self.event2)
            .chain(&self.event3)
            .map(String::as_str)
            .collect()
    }

    fn unordered_pair(&self) -> (&BTreeSet<String>, &BTreeSet<String>) {
        if self.event1 <= self.event2 {
            (&self.event1, &self.event2)
        } else {
            (&self.event2, &self.event1)
        }
    }
}

impl PartialEq for IndependenceAssertion {
    fn eq(&self, other: &Self) -> bool {
        self.unordered_pair() == other.unordered_pair() && self.event3 == other.event3
    }
}

impl Hash for IndependenceAssertion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.unordered_pair().hash(state);
        self.event3.hash(state);
    }
}

impl fmt::Display for IndependenceAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |set: &BTreeSet<String>| set.iter().cloned().collect::<Vec<_>>().join(", ");
        write!(f, "({} \u{27C2} {}", join(&self.event1), join(&self.event2))?;
        if self.is_conditional() {
            write!(f, " | {}", join(&self.event3))?;
        }
        write!(f, ")")
    }
}

/// A collection of independence assertions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Independencies {
    assertions: Vec<IndependenceAssertion>,
}

impl Independencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assertion unless an equal one is already present.
    pub fn add_assertion(&mut self, assertion: IndependenceAssertion) {
        if !self.contains(&assertion) {
            self.assertions.push(assertion);
        }
    }

    pub fn contains(&self, assertion: &IndependenceAssertion) -> bool {
        self.assertions.iter().any(|a| a == assertion)
    }

    pub fn assertions(&self) -> &[IndependenceAssertion] {
        &self.assertions
    }

    pub fn len(&self) -> usize {
        self.assertions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assertions.is_empty()
    }
}

impl FromIterator<IndependenceAssertion> for Independencies {
    fn from_iter<T: IntoIterator<Item = IndependenceAssertion>>(iter: T) -> Self {
        let mut independencies = Self::new();
        for assertion in iter {
            independencies.add_assertion(assertion);
        }
        independencies
    }
}

/// Looks `x ⟂ y | z` up in known `independencies`.
///
/// Gives structure learning the same interface whether independence is
/// tested on data or read from a known model.
pub fn independence_match(x: &str, y: &str, z: &[&str], independencies: &Independencies) -> bool {
    independencies.contains(&IndependenceAssertion::single(x, y, z))
}
