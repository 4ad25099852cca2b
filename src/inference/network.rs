use indexmap::IndexMap;
use tracing::debug;

use crate::error::{ConfigError, InvariantViolation, QueryError, Result};
use crate::inference::observation::{Observation, ObservationCondition, ValueId, VariableId};

/// Rows of a CPT for one parent assignment may drift this far from 1
pub const NORMALIZATION_TOLERANCE: f64 = 1e-6;

/// A named outcome of one variable
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DomainValue {
    name: String,
    variable: VariableId,
}

impl DomainValue {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variable(&self) -> VariableId {
        self.variable
    }
}

#[derive(Debug, Clone)]
pub struct RandomVariable {
    id: VariableId,
    name: String,
    /// values in declaration order; `ValueId(i)` is `domain[i]`
    domain: Vec<DomainValue>,
    parents: Vec<VariableId>,
    /// back-references only, filled in once a child is registered
    children: Vec<VariableId>,
    /// P(self | parents), keyed by full assignments over parents and self
    /// rows in `Network::assignments` order over the scope
    cpt: IndexMap<ObservationCondition, f64>,
}

impl RandomVariable {
    fn new(id: VariableId, name: &str) -> Self {
        RandomVariable {
            id,
            name: name.to_string(),
            domain: Vec::new(),
            parents: Vec::new(),
            children: Vec::new(),
            cpt: IndexMap::new(),
        }
    }

    pub fn id(&self) -> VariableId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &[DomainValue] {
        &self.domain
    }

    pub fn n_values(&self) -> usize {
        self.domain.len()
    }

    pub fn values(&self) -> impl Iterator<Item = ValueId> {
        (0..self.domain.len()).map(ValueId)
    }

    pub fn value_named(&self, name: &str) -> Option<ValueId> {
        self.domain.iter().position(|v| v.name == name).map(ValueId)
    }

    pub fn value_name(&self, value: ValueId) -> &str {
        &self.domain[value.0].name
    }

    pub fn parents(&self) -> &[VariableId] {
        &self.parents
    }

    pub fn children(&self) -> &[VariableId] {
        &self.children
    }

    /// The variables a CPT row ranges over: parents in declaration order, then self
    pub fn scope(&self) -> Vec<VariableId> {
        let mut scope = self.parents.clone();
        scope.push(self.id);
        scope
    }

    pub fn cpt(&self) -> impl Iterator<Item = (&ObservationCondition, f64)> {
        self.cpt.iter().map(|(c, p)| (c, *p))
    }

    /// Direct CPT lookup; `None` unless `condition` is a full assignment of the scope
    pub fn probability(&self, condition: &ObservationCondition) -> Option<f64> {
        self.cpt.get(condition).copied()
    }

    fn add_value(&mut self, name: &str) -> Result<(), ConfigError> {
        if self.value_named(name).is_some() {
            return Err(ConfigError::DuplicateValue {
                variable: self.name.clone(),
                value: name.to_string(),
            });
        }
        self.domain.push(DomainValue {
            name: name.to_string(),
            variable: self.id,
        });
        Ok(())
    }
}

/// Registry of random variables. Insertion order is topological since a
/// node's parents must be registered before it.
#[derive(Debug, Clone, Default)]
pub struct Network {
    nodes: IndexMap<String, RandomVariable>,
}

impl Network {
    pub fn new() -> Self {
        Network {
            nodes: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn variable(&self, id: VariableId) -> &RandomVariable {
        &self.nodes[id.0]
    }

    pub fn variable_named(&self, name: &str) -> Option<&RandomVariable> {
        self.nodes.get(name)
    }

    pub fn id_of(&self, name: &str) -> Option<VariableId> {
        self.nodes.get_index_of(name).map(VariableId)
    }

    /// Variables in registration order
    pub fn variables(&self) -> impl Iterator<Item = &RandomVariable> {
        self.nodes.values()
    }

    /// Register a node from its textual description.
    ///
    /// Each row has the form `"VAR=val, PARENT=val, ...: probability"` and must
    /// assign exactly the node and all of its parents. If any step fails the
    /// node is removed again and the network is left as it was.
    pub fn add_node(
        &mut self,
        name: &str,
        parents: &[&str],
        values: &[&str],
        rows: &[&str],
    ) -> Result<VariableId> {
        if self.nodes.contains_key(name) {
            return Err(ConfigError::DuplicateVariable(name.to_string()).into());
        }
        let id = VariableId(self.nodes.len());
        self.nodes
            .insert(name.to_string(), RandomVariable::new(id, name));
        if let Err(e) = self.build_node(id, parents, values, rows) {
            self.nodes.pop();
            return Err(e);
        }
        let own_parents = self.nodes[id.0].parents.clone();
        for parent in own_parents {
            self.nodes[parent.0].children.push(id);
        }
        debug!(
            node = name,
            parents = ?parents,
            values = ?values,
            "registered node"
        );
        Ok(id)
    }

    fn build_node(
        &mut self,
        id: VariableId,
        parents: &[&str],
        values: &[&str],
        rows: &[&str],
    ) -> Result<()> {
        for value in values {
            self.nodes[id.0].add_value(value)?;
        }
        if self.nodes[id.0].domain.is_empty() {
            return Err(ConfigError::EmptyDomain(self.nodes[id.0].name.clone()).into());
        }
        for parent in parents {
            let parent_id = self
                .id_of(parent)
                .filter(|p| *p != id)
                .ok_or_else(|| ConfigError::UnknownParent {
                    variable: self.nodes[id.0].name.clone(),
                    parent: parent.to_string(),
                })?;
            let node = &mut self.nodes[id.0];
            if node.parents.contains(&parent_id) {
                return Err(ConfigError::DuplicateParent {
                    variable: node.name.clone(),
                    parent: parent.to_string(),
                }
                .into());
            }
            node.parents.push(parent_id);
        }

        let scope = self.nodes[id.0].scope();
        let mut cpt: IndexMap<ObservationCondition, f64> = self
            .assignments(&scope)
            .into_iter()
            .map(|c| (c, 0.0))
            .collect();
        let mut seen = vec![false; cpt.len()];
        for row in rows {
            let (condition, probability) = self.parse_row(id, row)?;
            let index = cpt.get_index_of(&condition).ok_or_else(|| {
                self.malformed_row(id, row, "condition must assign the node and each parent")
            })?;
            if seen[index] {
                return Err(self.malformed_row(id, row, "duplicate row").into());
            }
            seen[index] = true;
            cpt[index] = probability;
        }
        self.nodes[id.0].cpt = cpt;
        self.check_normalized(id)?;
        Ok(())
    }

    fn malformed_row(&self, id: VariableId, row: &str, reason: &str) -> ConfigError {
        ConfigError::MalformedRow {
            variable: self.nodes[id.0].name.clone(),
            row: row.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse_row(&self, id: VariableId, row: &str) -> Result<(ObservationCondition, f64)> {
        let compact = strip_whitespace(row);
        let parts: Vec<&str> = compact.split(':').collect();
        if parts.len() != 2 {
            return Err(self
                .malformed_row(id, row, "expected exactly one ':' between condition and probability")
                .into());
        }
        let probability: f64 = parts[1]
            .parse()
            .map_err(|_| self.malformed_row(id, row, "probability is not a number"))?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(self
                .malformed_row(id, row, "probability must lie in [0, 1]")
                .into());
        }
        let condition = self
            .parse_condition(parts[0])
            .map_err(|e| self.malformed_row(id, row, &e.to_string()))?;
        Ok((condition, probability))
    }

    fn check_normalized(&self, id: VariableId) -> Result<(), InvariantViolation> {
        let node = &self.nodes[id.0];
        for assignment in self.assignments(&node.parents) {
            let total: f64 = node
                .values()
                .map(|v| {
                    node.probability(&assignment.with(Observation::new(id, v)))
                        .unwrap_or(0.0)
                })
                .sum();
            if (total - 1.0).abs() > NORMALIZATION_TOLERANCE {
                return Err(InvariantViolation::UnnormalizedCpt {
                    variable: node.name.clone(),
                    assignment: self.describe(&assignment),
                    total,
                });
            }
        }
        Ok(())
    }

    /// Parse `"NAME=value"`; whitespace is ignored
    pub fn parse_observation(&self, text: &str) -> Result<Observation, QueryError> {
        let compact = strip_whitespace(text);
        let parts: Vec<&str> = compact.split('=').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            return Err(QueryError::MalformedQuery {
                query: text.to_string(),
                reason: "expected \"variable=value\"".to_string(),
            });
        }
        let node = self
            .variable_named(parts[0])
            .ok_or_else(|| QueryError::UnknownVariable(parts[0].to_string()))?;
        let value = node
            .value_named(parts[1])
            .ok_or_else(|| QueryError::UnknownValue {
                variable: parts[0].to_string(),
                value: parts[1].to_string(),
            })?;
        Ok(Observation::new(node.id, value))
    }

    /// Parse a comma-separated conjunction such as `"CO=F, DAY=T"`
    pub fn parse_condition(&self, text: &str) -> Result<ObservationCondition, QueryError> {
        strip_whitespace(text)
            .split(',')
            .filter(|event| !event.is_empty())
            .map(|event| self.parse_observation(event))
            .collect()
    }

    /// Look up `P(name | ...)` straight from the CPT of `name`.
    ///
    /// Returns `Ok(None)` when the condition does not span exactly the node
    /// and its parents, meaning the answer needs full inference.
    pub fn query(&self, name: &str, condition: &str) -> Result<Option<f64>, QueryError> {
        let node = self
            .variable_named(name)
            .ok_or_else(|| QueryError::UnknownVariable(name.to_string()))?;
        let condition = self.parse_condition(condition)?;
        Ok(self.lookup(node.id, &condition))
    }

    /// `P(variable | ...)` straight from the CPT of `variable`; `None` on a miss
    pub fn lookup(&self, variable: VariableId, condition: &ObservationCondition) -> Option<f64> {
        self.variable(variable).probability(condition)
    }

    /// Every joint assignment of `variables`. The first variable varies
    /// slowest and each domain is walked in declaration order.
    pub fn assignments(&self, variables: &[VariableId]) -> Vec<ObservationCondition> {
        let sizes: Vec<usize> = variables
            .iter()
            .map(|v| self.variable(*v).n_values())
            .collect();
        if sizes.contains(&0) {
            return Vec::new();
        }
        let total: usize = sizes.iter().product();
        let mut counters = vec![0usize; variables.len()];
        let mut result = Vec::with_capacity(total);
        for _ in 0..total {
            result.push(
                variables
                    .iter()
                    .zip(counters.iter())
                    .map(|(v, c)| Observation::new(*v, ValueId(*c)))
                    .collect(),
            );
            for digit in (0..counters.len()).rev() {
                counters[digit] += 1;
                if counters[digit] < sizes[digit] {
                    break;
                }
                counters[digit] = 0;
            }
        }
        result
    }

    /// Registration order reversed: every child comes before its parents
    pub fn elimination_order(&self) -> Vec<VariableId> {
        (0..self.nodes.len()).rev().map(VariableId).collect()
    }

    /// Check that `order` names every variable once and puts each variable
    /// before all of its parents.
    pub fn check_elimination_order(&self, order: &[VariableId]) -> Result<(), InvariantViolation> {
        let mut position = vec![None; self.nodes.len()];
        for (i, v) in order.iter().enumerate() {
            match position.get_mut(v.0) {
                Some(slot) if slot.is_none() => *slot = Some(i),
                _ => return Err(InvariantViolation::IncompleteOrder),
            }
        }
        if position.iter().any(Option::is_none) {
            return Err(InvariantViolation::IncompleteOrder);
        }
        for node in self.variables() {
            for parent in &node.parents {
                if position[parent.0] < position[node.id.0] {
                    return Err(InvariantViolation::NotTopological {
                        variable: node.name.clone(),
                        parent: self.variable(*parent).name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn describe_observation(&self, observation: Observation) -> String {
        let node = self.variable(observation.variable);
        format!("{}={}", node.name, node.value_name(observation.value))
    }

    /// Render a conjunction as `"A=T, B=F"`
    pub fn describe(&self, condition: &ObservationCondition) -> String {
        condition
            .iter()
            .map(|o| self.describe_observation(*o))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn fire_smoke() -> Network {
        let mut net = Network::new();
        net.add_node("FIRE", &[], &["T", "F"], &["FIRE = T: 0.01", "FIRE = F: 0.99"])
            .unwrap();
        net.add_node(
            "SMOKE",
            &["FIRE"],
            &["T", "F"],
            &[
                "SMOKE = T, FIRE = T: 0.9",
                "SMOKE = F, FIRE = T: 0.1",
                "SMOKE = T, FIRE = F: 0.01",
                "SMOKE = F, FIRE = F: 0.99",
            ],
        )
        .unwrap();
        net
    }

    #[test]
    fn test_structure() {
        let net = fire_smoke();
        let fire = net.id_of("FIRE").unwrap();
        let smoke = net.id_of("SMOKE").unwrap();
        assert_eq!(net.len(), 2);
        assert_eq!(net.variable(smoke).parents(), &[fire]);
        assert_eq!(net.variable(fire).children(), &[smoke]);
        assert_eq!(net.variable(fire).value_named("F"), Some(ValueId(1)));
        assert_eq!(net.variable(fire).value_name(ValueId(0)), "T");
    }

    #[test]
    fn test_direct_lookup() {
        let net = fire_smoke();
        assert_eq!(net.query("SMOKE", "SMOKE=T, FIRE=F").unwrap(), Some(0.01));
        assert_eq!(net.query("SMOKE", "FIRE = T ,SMOKE = F").unwrap(), Some(0.1));
        assert_eq!(net.query("FIRE", "FIRE=T").unwrap(), Some(0.01));
        // not a full row: needs inference
        assert_eq!(net.query("SMOKE", "SMOKE=T").unwrap(), None);
        assert_eq!(net.query("FIRE", "FIRE=T, SMOKE=T").unwrap(), None);
        assert_eq!(
            net.query("ALARM", "ALARM=T"),
            Err(QueryError::UnknownVariable("ALARM".to_string()))
        );
        assert!(matches!(
            net.query("SMOKE", "SMOKE=maybe"),
            Err(QueryError::UnknownValue { .. })
        ));
    }

    #[test]
    fn test_parse_observation_errors() {
        let net = fire_smoke();
        assert!(matches!(
            net.parse_observation("FIRE"),
            Err(QueryError::MalformedQuery { .. })
        ));
        assert!(matches!(
            net.parse_observation("FIRE=T=F"),
            Err(QueryError::MalformedQuery { .. })
        ));
        assert!(matches!(
            net.parse_observation("=T"),
            Err(QueryError::MalformedQuery { .. })
        ));
        // values are case sensitive
        assert!(matches!(
            net.parse_observation("FIRE=t"),
            Err(QueryError::UnknownValue { .. })
        ));
    }

    #[test]
    fn test_failed_node_is_retracted() {
        let mut net = fire_smoke();
        let err = net
            .add_node(
                "ALARM",
                &["FIRE"],
                &["T", "F"],
                &["ALARM = T, FIRE = T: 0.5", "ALARM = T: 0.5"],
            )
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::MalformedRow { .. })));
        assert_eq!(net.len(), 2);
        assert!(net.id_of("ALARM").is_none());
        let fire = net.id_of("FIRE").unwrap();
        assert_eq!(net.variable(fire).children().len(), 1);
    }

    #[test]
    fn test_construction_errors() {
        let mut net = fire_smoke();
        assert!(matches!(
            net.add_node("X", &[], &["T", "T"], &[]),
            Err(Error::Config(ConfigError::DuplicateValue { .. }))
        ));
        assert!(matches!(
            net.add_node("X", &["NOPE"], &["T", "F"], &[]),
            Err(Error::Config(ConfigError::UnknownParent { .. }))
        ));
        assert!(matches!(
            net.add_node("X", &["X"], &["T", "F"], &[]),
            Err(Error::Config(ConfigError::UnknownParent { .. }))
        ));
        assert!(matches!(
            net.add_node("X", &["FIRE", "FIRE"], &["T", "F"], &[]),
            Err(Error::Config(ConfigError::DuplicateParent { .. }))
        ));
        assert!(matches!(
            net.add_node("X", &[], &[], &[]),
            Err(Error::Config(ConfigError::EmptyDomain(_)))
        ));
        assert!(matches!(
            net.add_node("FIRE", &[], &["T", "F"], &["FIRE=T: 0.5", "FIRE=F: 0.5"]),
            Err(Error::Config(ConfigError::DuplicateVariable(_)))
        ));
        assert!(matches!(
            net.add_node("X", &[], &["T", "F"], &["X=T: 0.5: 0.5"]),
            Err(Error::Config(ConfigError::MalformedRow { .. }))
        ));
        assert!(matches!(
            net.add_node("X", &[], &["T", "F"], &["X=T: lots"]),
            Err(Error::Config(ConfigError::MalformedRow { .. }))
        ));
        assert!(matches!(
            net.add_node("X", &[], &["T", "F"], &["X=T: 1.5", "X=F: -0.5"]),
            Err(Error::Config(ConfigError::MalformedRow { .. }))
        ));
        assert!(matches!(
            net.add_node("X", &[], &["T", "F"], &["X=T: 0.5", "Y=F: 0.5"]),
            Err(Error::Config(ConfigError::MalformedRow { .. }))
        ));
        assert_eq!(net.len(), 2);
    }

    #[test]
    fn test_duplicate_row_is_rejected() {
        let mut net = fire_smoke();
        let err = net
            .add_node("X", &[], &["T", "F"], &["X=T: 0.4", "X=T: 0.5", "X=F: 0.5"])
            .unwrap_err();
        match err {
            Error::Config(ConfigError::MalformedRow { row, reason, .. }) => {
                assert_eq!(row, "X=T: 0.5");
                assert_eq!(reason, "duplicate row");
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(net.id_of("X").is_none());
    }

    #[test]
    fn test_lookup_by_id() {
        let net = fire_smoke();
        let smoke = net.id_of("SMOKE").unwrap();
        let row = net.parse_condition("FIRE=T, SMOKE=F").unwrap();
        assert_eq!(net.lookup(smoke, &row), Some(0.1));
        let partial = net.parse_condition("SMOKE=F").unwrap();
        assert_eq!(net.lookup(smoke, &partial), None);
    }

    #[test]
    fn test_cpt_rows_in_enumeration_order() {
        let net = fire_smoke();
        let smoke = net.variable_named("SMOKE").unwrap();
        let rows: Vec<String> = smoke.cpt().map(|(c, _)| net.describe(c)).collect();
        let expected: Vec<String> = net
            .assignments(&smoke.scope())
            .iter()
            .map(|c| net.describe(c))
            .collect();
        assert_eq!(rows, expected);
    }

    #[test]
    fn test_unnormalized_cpt_is_rejected() {
        let mut net = fire_smoke();
        let err = net
            .add_node(
                "ALARM",
                &["FIRE"],
                &["T", "F"],
                &[
                    "ALARM = T, FIRE = T: 0.5",
                    "ALARM = F, FIRE = T: 0.5",
                    "ALARM = T, FIRE = F: 0.85",
                ],
            )
            .unwrap_err();
        match err {
            Error::Invariant(InvariantViolation::UnnormalizedCpt {
                variable,
                assignment,
                total,
            }) => {
                assert_eq!(variable, "ALARM");
                assert_eq!(assignment, "FIRE=F");
                assert!((total - 0.85).abs() < 1e-12);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(net.id_of("ALARM").is_none());
    }

    #[test]
    fn test_assignments_enumeration() {
        let net = fire_smoke();
        let fire = net.id_of("FIRE").unwrap();
        let smoke = net.id_of("SMOKE").unwrap();
        let all = net.assignments(&[smoke, fire]);
        assert_eq!(all.len(), 4);
        let described: Vec<String> = all.iter().map(|c| net.describe(c)).collect();
        assert_eq!(
            described,
            vec![
                "FIRE=T, SMOKE=T",
                "FIRE=F, SMOKE=T",
                "FIRE=T, SMOKE=F",
                "FIRE=F, SMOKE=F"
            ]
        );
        assert_eq!(net.assignments(&[]), vec![ObservationCondition::empty()]);
    }

    #[test]
    fn test_elimination_order_checks() {
        let net = fire_smoke();
        let fire = net.id_of("FIRE").unwrap();
        let smoke = net.id_of("SMOKE").unwrap();
        assert_eq!(net.elimination_order(), vec![smoke, fire]);
        assert!(net.check_elimination_order(&[smoke, fire]).is_ok());
        assert!(matches!(
            net.check_elimination_order(&[fire, smoke]),
            Err(InvariantViolation::NotTopological { .. })
        ));
        assert_eq!(
            net.check_elimination_order(&[smoke]),
            Err(InvariantViolation::IncompleteOrder)
        );
        assert_eq!(
            net.check_elimination_order(&[smoke, smoke]),
            Err(InvariantViolation::IncompleteOrder)
        );
    }
}
