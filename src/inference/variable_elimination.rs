//! Defines a `VariableEliminationEngine` that uses exact inference by variable elimination to
//! answer conditional queries over a `FactorGraph`.
//!
//! Implementation of Koller & Friedman Algorithm 9.1 - Sum-Product-VE. This engine is
//! sum-product only; max-marginal queries fail explicitly with `ThicketError::Unsupported`.

use factor::Factor;
use inference::marginals::{MarginalSet, MaxMarginalSet};
use inference::{MarginalEngine, MaxMarginalEngine};
use model::FactorGraph;
use util::{ThicketError, Result};
use variable::{Assignment, Variable};

use std::collections::HashSet;
use std::collections::HashMap;

/// Exact sum-product inference by per-query variable elimination.
pub struct VariableEliminationEngine;

impl VariableEliminationEngine {

    /// Construct a new `VariableEliminationEngine`
    pub fn new() -> VariableEliminationEngine {
        VariableEliminationEngine
    }

    /// Infer the normalized conditional distribution ```P(variables | evidence)```
    ///
    /// # Errors
    /// * `ThicketError::InvalidScope` if a requested variable is not in the (conditioned) graph
    pub fn query(
        &self,
        graph: &FactorGraph,
        evidence: &Assignment,
        variables: &HashSet<Variable>
    ) -> Result<Factor> {
        let reduced = graph.condition(evidence);

        if variables.iter().any(|v| ! reduced.variables().contains(v)) {
            // a variable requested is not found in the (reduced) graph
            return Err(ThicketError::InvalidScope);
        }

        let phi_star = eliminate_onto(&reduced, variables)?;

        // now we have an unnormalized distribution; normalize to return a conditional
        phi_star.normalize()
    }

}


/// Eliminate every variable outside `keep` from the graph, returning the unnormalized factor
/// over `keep` (a scalar factor when `keep` is empty - the partition function).
fn eliminate_onto(graph: &FactorGraph, keep: &HashSet<Variable>) -> Result<Factor> {
    let order = max_cardinality_elimination_order(graph);

    let mut phis: Vec<Factor> = graph.factors().to_vec();
    for &var in order.iter() {
        if keep.contains(&var) {
            // the variable stays in the answer, so do not eliminate it
            continue;
        }

        // Otherwise, time to get rid of var
        let (phi_1prime, phi_2prime): (Vec<Factor>, Vec<Factor>) = phis
                                       .into_iter()
                                       .partition(|f| f.scope().contains(&var));

        // product step - multiply factors with var
        let psi = Factor::identity().product_all(&phi_1prime)?;

        // sum step - marginalize psi over var
        let tau = psi.marginalize(&[var]);

        phis = phi_2prime;
        phis.push(tau);
    }

    // multiply together remaining phis
    Factor::identity().product_all(&phis)
}


/// Compute the preferred elimination order by the max-cardinality heuristic
fn max_cardinality_elimination_order(graph: &FactorGraph) -> Vec<Variable> {
    // since we do not explicitly hold the graph structure, we need to determine the neighbors
    // of each variable
    let mut neighbors: HashMap<Variable, HashSet<Variable>> = graph.variables()
                                                                   .iter()
                                                                   .map(|v| (*v, HashSet::new()))
                                                                   .collect();

    for f in graph.factors().iter() {
        let scope = f.scope();
        for i in 0..scope.len() {
            for j in (i + 1)..scope.len() {
                neighbors.get_mut(&scope[i]).unwrap().insert(scope[j]);
                neighbors.get_mut(&scope[j]).unwrap().insert(scope[i]);
            }
        }
    }

    // sorted by id so the greedy selection below is deterministic
    let mut vars: Vec<Variable> = graph.variables().into_iter().collect();
    vars.sort();

    // set of marked variables
    let mut marked = HashSet::new();
    // the (reverse) elimination order
    let mut elimination = Vec::new();

    // for |vars| iterations
    for _ in 0..vars.len() {
        let mut idx = None;

        // loop over all variables
        for (vidx, v) in vars.iter().enumerate() {
            // if we have already marked this variable, it is already in the elimination order
            // so we don't process it again
            if marked.contains(v) {
                continue;
            }

            // otherwise, count the number of marked neighbors
            let ct = neighbors[v].iter().filter(|&n| marked.contains(n)).count();

            // if there are more neighbors, update the max index to this variable's index
            if let Some((_, max)) = idx {
                if ct > max {
                    idx = Some((vidx, ct));
                }
            } else {
                idx = Some((vidx, ct));
            }
        }

        // invariant: this will *always* be Some
        // add the selected variable to the elimination order and marked variable list
        if let Some((i, _)) = idx {
            elimination.push(vars[i]);
            marked.insert(vars[i]);
        } else {
            panic!("This should be unreachable");
        }
    }

    // we need to reverse the elimination order before returning
    elimination.reverse();
    elimination
}


impl MarginalEngine for VariableEliminationEngine {

    fn compute_marginals(&self, graph: &FactorGraph, evidence: &Assignment) -> Result<MarginalSet> {
        let conditioned = graph.conditioned_values().union(evidence);

        if graph.factors().is_empty() {
            return Ok(MarginalSet::new(vec![], 1.0, conditioned));
        }

        let reduced = graph.condition(evidence);

        // the partition function: eliminate everything
        let z = eliminate_onto(&reduced, &HashSet::new())?;
        let partition = z.marginalize(&z.scope()).scalar_weight()?;

        // one unnormalized marginal per (conditioned) factor scope
        let marginals: Result<Vec<Factor>> = reduced
            .factors()
            .iter()
            .map(|f| eliminate_onto(&reduced, &f.scope().into_iter().collect()))
            .collect();

        Ok(MarginalSet::new(marginals?, partition, conditioned))
    }

}

impl MaxMarginalEngine for VariableEliminationEngine {

    /// Variable elimination as implemented here is sum-product only; a max-marginal query is an
    /// unsupported operation and fails immediately rather than returning a degraded answer.
    fn compute_max_marginals(&self, _: &FactorGraph, _: &Assignment) -> Result<MaxMarginalSet> {
        Err(
            ThicketError::Unsupported(
                String::from("VariableEliminationEngine does not support max-marginal queries")
            )
        )
    }

}
