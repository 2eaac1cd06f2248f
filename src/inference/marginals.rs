//! Read-only result views over a finished inference run.
//!
//! A `MarginalSet` holds the per-clique (unnormalized) sum-product marginals and the partition
//! function; a `MaxMarginalSet` holds the per-clique max-product marginals, the best joint
//! weight, and enough of the clique adjacency skeleton to decode a single best assignment. Both
//! retain only what they need from the clique tree that produced them; the tree itself is
//! discarded when the query returns.

use factor::Factor;
use util::{Result, ThicketError};
use variable::{Assignment, Variable};

/// The sum-product result of an inference call: per-clique unnormalized marginal factors plus
/// the partition function.
#[derive(Debug)]
pub struct MarginalSet {

    /// Per clique, its potential multiplied by all inbound messages
    marginals: Vec<Factor>,

    /// The total unnormalized weight of the conditioned graph
    partition: f64,

    /// The evidence the graph was conditioned on, including values conditioned before the call
    conditioned: Assignment

}

impl MarginalSet {

    /// Assemble a `MarginalSet`; used by the inference engines
    pub fn new(marginals: Vec<Factor>, partition: f64, conditioned: Assignment) -> MarginalSet {
        MarginalSet { marginals, partition, conditioned }
    }

    /// The unnormalized marginal factor over the given `Variable`s.
    ///
    /// The requested variables must all fall within a single clique's scope; marginals across
    /// cliques are not assembled on demand. Divide by `partition()` to normalize.
    ///
    /// # Errors
    /// * `ThicketError::InvalidScope` if no single clique covers the requested variables
    pub fn marginal(&self, vars: &[Variable]) -> Result<Factor> {
        query(&self.marginals, vars, |m, extra| m.marginalize(extra))
    }

    /// The partition function: the total unnormalized weight of the conditioned graph
    pub fn partition(&self) -> f64 {
        self.partition
    }

    /// The per-clique unnormalized marginals, in clique order
    pub fn clique_marginals(&self) -> &[Factor] {
        &self.marginals
    }

    /// The evidence this result is conditioned on
    pub fn conditioned_values(&self) -> &Assignment {
        &self.conditioned
    }

}


/// The max-product result of an inference call: per-clique max-marginal factors, the best joint
/// weight, and the decoding skeleton.
#[derive(Debug)]
pub struct MaxMarginalSet {

    /// Per clique, its potential max-multiplied by all inbound messages
    marginals: Vec<Factor>,

    /// Per clique, the indices of its adjacent cliques - the skeleton the decoder traverses
    adjacency: Vec<Vec<usize>>,

    /// The weight of the best joint assignment
    best: f64,

    /// The evidence the graph was conditioned on
    conditioned: Assignment

}

impl MaxMarginalSet {

    /// Assemble a `MaxMarginalSet`; used by the inference engines
    pub fn new(
        marginals: Vec<Factor>,
        adjacency: Vec<Vec<usize>>,
        best: f64,
        conditioned: Assignment
    ) -> MaxMarginalSet {
        MaxMarginalSet { marginals, adjacency, best, conditioned }
    }

    /// The unnormalized max-marginal factor over the given `Variable`s
    ///
    /// # Errors
    /// * `ThicketError::InvalidScope` if no single clique covers the requested variables
    pub fn max_marginal(&self, vars: &[Variable]) -> Result<Factor> {
        query(&self.marginals, vars, |m, extra| m.max_marginalize(extra))
    }

    /// The unnormalized weight of the best joint assignment
    pub fn best_weight(&self) -> f64 {
        self.best
    }

    /// The per-clique max-marginals, in clique order
    pub fn clique_max_marginals(&self) -> &[Factor] {
        &self.marginals
    }

    /// The evidence this result is conditioned on
    pub fn conditioned_values(&self) -> &Assignment {
        &self.conditioned
    }

    /// Recover the `n`th best joint assignment.
    ///
    /// Only `n = 0` is supported. The assignment covers every variable of the graph, evidence
    /// included. Decoding walks the clique skeleton depth first with an explicit work stack: at
    /// each clique, the local max-marginal is reduced by the partial assignment accumulated so
    /// far and its single best assignment (deterministic tie-break) is unioned in. An empty
    /// graph yields exactly the evidence.
    ///
    /// This traversal relies on the clique-tree invariant (single-parent reachability); it is
    /// not valid on cyclic clique graphs.
    ///
    /// # Errors
    /// * `ThicketError::Unsupported` for `n > 0`
    /// * `ThicketError::ZeroProbability` if a clique's conditioned marginal has no
    ///   positive-weight assignment - the model/evidence combination is inconsistent, and a
    ///   partial answer is never returned
    pub fn nth_best_assignment(&self, n: usize) -> Result<Assignment> {
        if n > 0 {
            return Err(
                ThicketError::Unsupported(
                    String::from("Only the single best assignment (n = 0) is supported")
                )
            );
        }

        let mut assignment = self.conditioned.clone();
        let mut visited = vec![false; self.marginals.len()];
        let mut stack: Vec<usize> = Vec::new();

        for start in 0..self.marginals.len() {
            if visited[start] {
                continue;
            }
            stack.push(start);

            while let Some(c) = stack.pop() {
                if visited[c] {
                    continue;
                }
                visited[c] = true;

                let reduced = self.marginals[c].reduce(&assignment);
                let mut best = reduced.most_likely_assignments(1);
                if best.is_empty() {
                    return Err(ThicketError::ZeroProbability);
                }

                let (local, _) = best.remove(0);
                assignment = assignment.union(&local);

                for &neighbor in self.adjacency[c].iter() {
                    if ! visited[neighbor] {
                        stack.push(neighbor);
                    }
                }
            }
        }

        Ok(assignment)
    }

}


/// Covering-clique lookup shared by the two result views
fn query<F>(marginals: &[Factor], vars: &[Variable], eliminate: F) -> Result<Factor>
    where F: Fn(&Factor, &[Variable]) -> Factor
{
    if vars.is_empty() {
        return Err(ThicketError::InvalidScope);
    }

    for m in marginals.iter() {
        let scope = m.scope();
        if vars.iter().all(|v| scope.contains(v)) {
            let extra: Vec<Variable> = scope.iter()
                                            .cloned()
                                            .filter(|v| ! vars.contains(v))
                                            .collect();
            return Ok(eliminate(m, &extra));
        }
    }

    Err(ThicketError::InvalidScope)
}
