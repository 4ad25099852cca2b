use indexmap::IndexMap;

use crate::error::InvariantViolation;
use crate::inference::network::Network;
use crate::inference::observation::{ObservationCondition, VariableId};

/// A table over the joint assignments of a set of variables.
///
/// Factors are dense: every assignment of `variables` has an entry, kept in
/// `Network::assignments` order so sums always run in the same order.
#[derive(Debug, Clone)]
pub struct Factor {
    variables: Vec<VariableId>,
    table: IndexMap<ObservationCondition, f64>,
}

impl Factor {
    /// Build the factor of `variable`'s CPT restricted to `evidence`.
    /// Evidence variables inside the CPT's scope are selected away, so they
    /// never appear as dimensions of the result.
    pub fn new(
        network: &Network,
        variable: VariableId,
        evidence: &ObservationCondition,
    ) -> Result<Self, InvariantViolation> {
        let node = network.variable(variable);
        let mut factor = Factor {
            variables: node.scope(),
            table: node.cpt().map(|(c, p)| (c.clone(), p)).collect(),
        };
        for observation in evidence {
            if factor.variables.contains(&observation.variable) {
                factor
                    .table
                    .retain(|condition, _| condition.contains_observation(*observation));
                factor.eliminate(network, observation.variable)?;
            }
        }
        Ok(factor)
    }

    pub fn variables(&self) -> &[VariableId] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn get(&self, condition: &ObservationCondition) -> Option<f64> {
        self.table.get(condition).copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&ObservationCondition, f64)> {
        self.table.iter().map(|(c, p)| (c, *p))
    }

    /// Entry matching the projection of a (larger) joint assignment
    fn value_at(&self, joint: &ObservationCondition) -> f64 {
        self.get(&joint.restrict(&self.variables)).unwrap_or(0.0)
    }

    /// Sum `variable` out of the factor
    pub fn eliminate(
        &mut self,
        network: &Network,
        variable: VariableId,
    ) -> Result<(), InvariantViolation> {
        let position = self
            .variables
            .iter()
            .position(|v| *v == variable)
            .ok_or_else(|| {
                InvariantViolation::MissingDimension(network.variable(variable).name().to_string())
            })?;
        self.variables.remove(position);
        let mut table: IndexMap<ObservationCondition, f64> = network
            .assignments(&self.variables)
            .into_iter()
            .map(|c| (c, 0.0))
            .collect();
        for (condition, p) in &self.table {
            if let Some(slot) = table.get_mut(&condition.without(variable)) {
                *slot += p;
            }
        }
        self.table = table;
        Ok(())
    }

    /// Pointwise product over the union of both variable sets
    pub fn join(&self, network: &Network, other: &Factor) -> Factor {
        let mut variables = self.variables.clone();
        for v in &other.variables {
            if !variables.contains(v) {
                variables.push(*v);
            }
        }
        let table = network
            .assignments(&variables)
            .into_iter()
            .map(|joint| {
                let p = self.value_at(&joint) * other.value_at(&joint);
                (joint, p)
            })
            .collect();
        Factor { variables, table }
    }

    /// Scale entries so they sum to one
    pub fn normalise(&mut self) -> Result<(), InvariantViolation> {
        let total: f64 = self.table.values().sum();
        if !(total > 0.0 && total.is_finite()) {
            return Err(InvariantViolation::ImpossibleEvidence);
        }
        for p in self.table.values_mut() {
            *p /= total;
        }
        Ok(())
    }
}

/// Join all factors into one; `None` if there are none
pub fn product<I>(network: &Network, factors: I) -> Option<Factor>
where
    I: IntoIterator<Item = Factor>,
{
    let mut factors = factors.into_iter();
    let first = factors.next()?;
    Some(factors.fold(first, |acc, f| acc.join(network, &f)))
}
