//! Defines a `BruteForceEngine` that answers queries by exhaustive enumeration of all joint
//! assignments.
//!
//! Exponential in the number of variables, so only usable on small graphs; it exists as the
//! reference implementation the property tests compare the exact engines against, and it makes
//! no assumption about the graph's structure (loopy graphs are fine).

use factor::Factor;
use inference::marginals::{MarginalSet, MaxMarginalSet};
use inference::{MarginalEngine, MaxMarginalEngine};
use model::FactorGraph;
use util::Result;
use variable::{all_assignments, Assignment, Variable};

use ndarray::prelude as nd;

/// Exact inference by enumerating every joint assignment.
pub struct BruteForceEngine;

impl BruteForceEngine {

    /// Construct a new `BruteForceEngine`
    pub fn new() -> BruteForceEngine {
        BruteForceEngine
    }

    /// Tabulate the joint unnormalized weight of every assignment to the conditioned graph.
    /// Returns a single factor over all unobserved variables (a scalar when everything is
    /// observed), which serves as the one "clique" of the result views.
    fn joint(graph: &FactorGraph, evidence: &Assignment) -> Result<Factor> {
        let reduced = graph.condition(evidence);

        let mut vars: Vec<Variable> = reduced.variables().into_iter().collect();
        vars.sort();

        if vars.is_empty() {
            // everything is observed; the joint collapses to a single weight
            let weight = reduced.unnormalized_weight(&Assignment::new())?;
            return Ok(Factor::scalar(weight));
        }

        let shape: Vec<usize> = vars.iter().map(|v| v.cardinality()).collect();
        let mut tbl = nd::Array::ones(shape).into_dyn();

        for assn in all_assignments(&vars) {
            // Unwrapping is safe: all_assignments yields complete assignments over vars
            let idx: Vec<usize> = vars.iter().map(|v| *assn.get(v).unwrap()).collect();
            tbl[nd::IxDyn(&idx)] = reduced.unnormalized_weight(&assn)?;
        }

        Factor::new(vars, tbl)
    }

}

impl MarginalEngine for BruteForceEngine {

    fn compute_marginals(&self, graph: &FactorGraph, evidence: &Assignment) -> Result<MarginalSet> {
        let conditioned = graph.conditioned_values().union(evidence);

        if graph.factors().is_empty() {
            return Ok(MarginalSet::new(vec![], 1.0, conditioned));
        }

        let joint = Self::joint(graph, evidence)?;
        let partition = joint.marginalize(&joint.scope()).scalar_weight()?;

        Ok(MarginalSet::new(vec![joint], partition, conditioned))
    }

}

impl MaxMarginalEngine for BruteForceEngine {

    fn compute_max_marginals(&self, graph: &FactorGraph, evidence: &Assignment) -> Result<MaxMarginalSet> {
        let conditioned = graph.conditioned_values().union(evidence);

        if graph.factors().is_empty() {
            return Ok(MaxMarginalSet::new(vec![], vec![], 1.0, conditioned));
        }

        let joint = Self::joint(graph, evidence)?;
        let best = joint.max_marginalize(&joint.scope()).scalar_weight()?;

        Ok(MaxMarginalSet::new(vec![joint], vec![vec![]], best, conditioned))
    }

}
