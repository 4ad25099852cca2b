use std::iter::FromIterator;
use std::slice;

/// Handle of a variable inside its `Network`; the index of its registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(pub(crate) usize);

impl VariableId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle of a value inside its variable's domain, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub(crate) usize);

impl ValueId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single `variable = value` fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Observation {
    pub variable: VariableId,
    pub value: ValueId,
}

impl Observation {
    pub fn new(variable: VariableId, value: ValueId) -> Self {
        Observation { variable, value }
    }
}

/// A conjunction of observations, kept sorted by (variable, value) so that two
/// conjunctions built in different orders compare and hash the same.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ObservationCondition {
    observations: Vec<Observation>,
}

impl ObservationCondition {
    pub fn new(mut observations: Vec<Observation>) -> Self {
        observations.sort_unstable();
        observations.dedup();
        ObservationCondition { observations }
    }

    pub fn empty() -> Self {
        ObservationCondition::default()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    pub fn variables(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.observations.iter().map(|o| o.variable)
    }

    /// The value bound to `variable`, if this conjunction mentions it
    pub fn value_of(&self, variable: VariableId) -> Option<ValueId> {
        self.observations
            .binary_search_by_key(&variable, |o| o.variable)
            .ok()
            .map(|i| self.observations[i].value)
    }

    pub fn mentions(&self, variable: VariableId) -> bool {
        self.value_of(variable).is_some()
    }

    pub fn contains_observation(&self, observation: Observation) -> bool {
        self.observations.binary_search(&observation).is_ok()
    }

    /// True if every observation of `other` also holds here
    pub fn contains(&self, other: &ObservationCondition) -> bool {
        // both sides are sorted, so a single merge walk suffices
        let mut mine = self.observations.iter();
        'outer: for wanted in &other.observations {
            for candidate in mine.by_ref() {
                if candidate == wanted {
                    continue 'outer;
                }
                if candidate > wanted {
                    return false;
                }
            }
            return false;
        }
        true
    }

    /// Keep only the observations over the given variables
    pub fn restrict(&self, variables: &[VariableId]) -> ObservationCondition {
        ObservationCondition {
            observations: self
                .observations
                .iter()
                .filter(|o| variables.contains(&o.variable))
                .cloned()
                .collect(),
        }
    }

    pub fn without(&self, variable: VariableId) -> ObservationCondition {
        ObservationCondition {
            observations: self
                .observations
                .iter()
                .filter(|o| o.variable != variable)
                .cloned()
                .collect(),
        }
    }

    pub fn with(&self, observation: Observation) -> ObservationCondition {
        let mut observations = self.observations.clone();
        observations.push(observation);
        ObservationCondition::new(observations)
    }
}

impl From<Observation> for ObservationCondition {
    fn from(observation: Observation) -> Self {
        ObservationCondition {
            observations: vec![observation],
        }
    }
}

impl FromIterator<Observation> for ObservationCondition {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        ObservationCondition::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ObservationCondition {
    type Item = &'a Observation;
    type IntoIter = slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
