// Exact inference by variable elimination
use tracing::{debug, info, trace};

use crate::error::{InvariantViolation, Result};
use crate::inference::factor::{self, Factor};
use crate::inference::network::Network;
use crate::inference::observation::{ObservationCondition, VariableId};
use crate::inference::query::Query;
use crate::inference::Inference;

pub struct VariableElimination<'a> {
    network: &'a Network,
    /// custom elimination order, already checked against the network
    order: Option<Vec<VariableId>>,
}

impl<'a> VariableElimination<'a> {
    /// Eliminate in reverse registration order
    pub fn new(network: &'a Network) -> Self {
        VariableElimination {
            network,
            order: None,
        }
    }

    /// Eliminate in the given order, which must list every variable once,
    /// children before parents.
    pub fn with_order(
        network: &'a Network,
        order: Vec<VariableId>,
    ) -> Result<Self, InvariantViolation> {
        network.check_elimination_order(&order)?;
        Ok(VariableElimination {
            network,
            order: Some(order),
        })
    }

    pub fn order(&self) -> Vec<VariableId> {
        match &self.order {
            Some(order) => order.clone(),
            None => self.network.elimination_order(),
        }
    }
}

impl<'a> Inference for VariableElimination<'a> {
    fn network(&self) -> &Network {
        self.network
    }

    fn probability(&mut self, query: &Query) -> Result<f64> {
        let network = self.network;
        let target = query.target;
        let evidence = &query.evidence;

        let mut factors: Vec<Factor> = Vec::new();
        for v in self.order() {
            factors.push(Factor::new(network, v, evidence)?);
            if v == target.variable || evidence.mentions(v) {
                continue;
            }
            // hidden variable: collapse everything collected so far and sum it out
            let mut joined =
                factor::product(network, factors.drain(..)).ok_or(InvariantViolation::IncompleteOrder)?;
            joined.eliminate(network, v)?;
            debug!(
                variable = network.variable(v).name(),
                remaining = ?joined
                    .variables()
                    .iter()
                    .map(|id| network.variable(*id).name())
                    .collect::<Vec<_>>(),
                "eliminated hidden variable"
            );
            trace!(entries = joined.len(), "factor size after elimination");
            factors.push(joined);
        }

        let mut result =
            factor::product(network, factors).ok_or(InvariantViolation::IncompleteOrder)?;
        result.normalise()?;
        let p = result
            .get(&ObservationCondition::from(target))
            .ok_or_else(|| {
                InvariantViolation::MissingDimension(
                    network.variable(target.variable).name().to_string(),
                )
            })?;
        info!(
            query = %network.describe_observation(target),
            given = %network.describe(evidence),
            probability = p,
            "variable elimination answered query"
        );
        Ok(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::samples;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() < tol, "{} != {}", a, b);
    }

    #[test]
    fn test_prior_marginal() {
        let net = samples::fire_alarm().unwrap();
        let mut ve = VariableElimination::new(&net);
        assert_eq!(ve.answer("SMOKE=T").unwrap(), "0.018900");
        assert_eq!(ve.answer("FIRE=T").unwrap(), "0.010000");
    }

    #[test]
    fn test_posterior_by_bayes_rule() {
        let net = samples::fire_alarm().unwrap();
        let mut ve = VariableElimination::new(&net);
        assert_eq!(ve.answer("FIRE=T|SMOKE=T").unwrap(), "0.476190");
    }

    #[test]
    fn test_chain_product() {
        let net = samples::fire_alarm().unwrap();
        let mut ve = VariableElimination::new(&net);
        let query = Query::parse(&net, "REPORT=T|FIRE=T").unwrap();
        let p_leaving = 0.5 * 0.88 + 0.5 * 0.0;
        let expected = p_leaving * 0.75 + (1.0 - p_leaving) * 0.01;
        assert_close(ve.probability(&query).unwrap(), expected, 1e-12);
        assert_eq!(ve.answer("REPORT=T|FIRE=T").unwrap(), "0.335600");
    }

    #[test]
    fn test_complementary_answers_sum_to_one() {
        let net = samples::multiply_connected().unwrap();
        let mut ve = VariableElimination::new(&net);
        for evidence in &["", " | CO=T", " | CO=F, DAY=T", " | PT=T, CAR=F"] {
            let t = Query::parse(&net, &format!("TF=T{}", evidence)).unwrap();
            let f = Query::parse(&net, &format!("TF=F{}", evidence)).unwrap();
            let total = ve.probability(&t).unwrap() + ve.probability(&f).unwrap();
            assert_close(total, 1.0, 1e-12);
        }
    }

    #[test]
    fn test_custom_orders_agree() {
        let net = samples::multiply_connected().unwrap();
        let id = |name: &str| net.id_of(name).unwrap();
        let query = Query::parse(&net, "DAY=T | CO=T").unwrap();
        let default = VariableElimination::new(&net).probability(&query).unwrap();
        let swapped = vec![id("CO"), id("TF"), id("PT"), id("CAR"), id("DAY")];
        let mut ve = VariableElimination::with_order(&net, swapped).unwrap();
        assert_close(ve.probability(&query).unwrap(), default, 1e-12);
    }

    #[test]
    fn test_bad_orders_rejected() {
        let net = samples::fire_alarm().unwrap();
        let mut forward = net.elimination_order();
        forward.reverse();
        assert!(matches!(
            VariableElimination::with_order(&net, forward),
            Err(InvariantViolation::NotTopological { .. })
        ));
        let mut short = net.elimination_order();
        short.pop();
        assert!(matches!(
            VariableElimination::with_order(&net, short),
            Err(InvariantViolation::IncompleteOrder)
        ));
    }

    #[test]
    fn test_impossible_evidence() {
        let net = samples::fire_alarm().unwrap();
        let mut ve = VariableElimination::new(&net);
        let err = ve.answer("REPORT=T | LEAVING=T, ALARM=F").unwrap_err();
        assert_eq!(err, InvariantViolation::ImpossibleEvidence.into());
    }
}
