//! Defines the `JunctionTreeEngine`, the public entry point for exact clique-tree inference.
//!
//! Each query builds a private `CliqueTree` from the factor graph, conditions it on the
//! evidence, runs the fixed-point message passing to completion, and assembles an immutable
//! result view. Nothing is shared between calls; batch parallelism over many independent
//! queries belongs to the caller.

use inference::clique_tree::{CliqueTree, PassingMode};
use inference::marginals::{MarginalSet, MaxMarginalSet};
use inference::{MarginalEngine, MaxMarginalEngine};
use model::FactorGraph;
use util::Result;
use variable::Assignment;

/// Exact inference by clique-tree message passing.
///
/// Requires the graph's merged clique structure to form a tree; see the `clique_tree` module
/// docs for the precondition and `CliqueTree::validate_tree_structure` for the opt-in check.
pub struct JunctionTreeEngine;

impl JunctionTreeEngine {

    /// Construct a new `JunctionTreeEngine`
    pub fn new() -> JunctionTreeEngine {
        JunctionTreeEngine
    }

}

impl MarginalEngine for JunctionTreeEngine {

    fn compute_marginals(&self, graph: &FactorGraph, evidence: &Assignment) -> Result<MarginalSet> {
        let conditioned = graph.conditioned_values().union(evidence);

        // a graph with zero factors is legal: the partition function is 1
        if graph.factors().is_empty() {
            return Ok(MarginalSet::new(vec![], 1.0, conditioned));
        }

        let mut tree = CliqueTree::new(graph)?;
        tree.set_evidence(evidence);
        tree.pass_messages(PassingMode::Sum)?;

        let marginals = tree.local_marginals()?;

        // a non-empty clique list always designates a root during passing
        let root = tree.root().expect("message passing designated no root");
        let local = &marginals[root];
        let partition = local.marginalize(&local.scope()).scalar_weight()?;

        Ok(MarginalSet::new(marginals, partition, conditioned))
    }

}

impl MaxMarginalEngine for JunctionTreeEngine {

    fn compute_max_marginals(&self, graph: &FactorGraph, evidence: &Assignment) -> Result<MaxMarginalSet> {
        let conditioned = graph.conditioned_values().union(evidence);

        // with zero factors the only "assignment" is the evidence itself
        if graph.factors().is_empty() {
            return Ok(MaxMarginalSet::new(vec![], vec![], 1.0, conditioned));
        }

        let mut tree = CliqueTree::new(graph)?;
        tree.set_evidence(evidence);
        tree.pass_messages(PassingMode::Max)?;

        let marginals = tree.local_marginals()?;
        let adjacency = tree.adjacency();

        let root = tree.root().expect("message passing designated no root");
        let local = &marginals[root];
        let best = local.max_marginalize(&local.scope()).scalar_weight()?;

        Ok(MaxMarginalSet::new(marginals, adjacency, best, conditioned))
    }

}
