use crate::error::QueryError;
use crate::inference::network::Network;
use crate::inference::observation::{Observation, ObservationCondition};

/// `P(target | evidence)`
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub target: Observation,
    pub evidence: ObservationCondition,
}

impl Query {
    /// Parse `"TARGET=value"` or `"TARGET=value | EV1=v1, EV2=v2"`.
    /// Whitespace is ignored and value names are case sensitive.
    pub fn parse(network: &Network, query: &str) -> Result<Self, QueryError> {
        let malformed = |reason: &str| QueryError::MalformedQuery {
            query: query.to_string(),
            reason: reason.to_string(),
        };
        let parts: Vec<&str> = query.split('|').collect();
        if parts.len() > 2 {
            return Err(malformed("more than one '|'"));
        }
        if parts[0].trim().is_empty() {
            return Err(malformed("missing target"));
        }
        if parts[0].contains(',') {
            return Err(malformed("exactly one target is allowed"));
        }
        let target = network.parse_observation(parts[0])?;

        let mut evidence: Vec<Observation> = Vec::new();
        if let Some(given) = parts.get(1) {
            for token in given.split(',').filter(|t| !t.trim().is_empty()) {
                let observation = network.parse_observation(token)?;
                let name = || network.variable(observation.variable).name().to_string();
                if observation.variable == target.variable {
                    return Err(QueryError::TargetInEvidence(name()));
                }
                if evidence
                    .iter()
                    .any(|e| e.variable == observation.variable && e.value != observation.value)
                {
                    return Err(QueryError::ConflictingEvidence(name()));
                }
                evidence.push(observation);
            }
        }
        Ok(Query {
            target,
            evidence: ObservationCondition::new(evidence),
        })
    }

    /// Target and evidence as one conjunction, the key of a direct CPT lookup
    pub fn joint_condition(&self) -> ObservationCondition {
        self.evidence.with(self.target)
    }
}

/// Render a probability the way answers are reported: six decimal places
pub fn format_probability(p: f64) -> String {
    format!("{:.6}", p)
}

const SHORTHAND_PREFIXES: &[&str] = &["P(", "p("];

/// Whether `query` is written in the `P(...)` shorthand
pub fn is_shorthand(query: &str) -> bool {
    let trimmed = query.trim_start();
    SHORTHAND_PREFIXES.iter().any(|prefix| trimmed.starts_with(*prefix))
}

/// Expand the shorthand `P(smoke|-fire, alarm)` into `SMOKE=T | FIRE=F, ALARM=T`.
///
/// Names are upper-cased; a leading `-` selects `F`, anything else `T`.
pub fn expand_shorthand(query: &str) -> Result<String, QueryError> {
    let malformed = |reason: &str| QueryError::MalformedQuery {
        query: query.to_string(),
        reason: reason.to_string(),
    };
    let trimmed = query.trim();
    let inner = SHORTHAND_PREFIXES
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(*prefix))
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| malformed("expected the form P(target|evidence)"))?;

    let literal = |token: &str| -> Result<String, QueryError> {
        let token = token.trim().to_uppercase();
        let (name, value) = match token.strip_prefix('-') {
            Some(name) => (name.trim().to_string(), "F"),
            None => (token, "T"),
        };
        if name.is_empty() {
            return Err(malformed("empty variable name"));
        }
        Ok(format!("{}={}", name, value))
    };

    let parts: Vec<&str> = inner.split('|').collect();
    if parts.len() > 2 {
        return Err(malformed("more than one '|'"));
    }
    let target = literal(parts[0])?;
    match parts.get(1) {
        Some(given) => {
            let evidence = given
                .split(',')
                .map(literal)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(format!("{} | {}", target, evidence.join(", ")))
        }
        None => Ok(target),
    }
}
