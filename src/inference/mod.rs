//! Defines the interface to inference engines
//!
//! The two query traits cover the two exact questions a factor graph answers: marginal
//! distributions with a partition function (`MarginalEngine`) and max-marginals with a best
//! joint assignment (`MaxMarginalEngine`). The `JunctionTreeEngine` implements both by
//! clique-tree message passing; `VariableEliminationEngine` implements sum-product only and
//! fails explicitly on max-marginal queries; `BruteForceEngine` implements both by enumeration
//! and serves as the reference the property tests compare against.

use model::FactorGraph;
use variable::Assignment;
use super::Result;

pub mod clique_tree;
pub mod marginals;

mod brute_force;
mod junction_tree;
mod variable_elimination;

pub use self::brute_force::BruteForceEngine;
pub use self::clique_tree::{CliqueTree, PassingMode};
pub use self::junction_tree::JunctionTreeEngine;
pub use self::marginals::{MarginalSet, MaxMarginalSet};
pub use self::variable_elimination::VariableEliminationEngine;


/// A `MarginalEngine` answers sum-product queries: the unnormalized marginal distribution of
/// (subsets of) each factor's variables, plus the partition function of the conditioned graph.
///
/// An empty `evidence` assignment asks the unconditional query. Every call is self-contained:
/// engines hold no state between queries, and concurrent calls must not share intermediate
/// structures.
pub trait MarginalEngine {

    /// Compute the marginals of the graph conditioned on the evidence
    fn compute_marginals(&self, graph: &FactorGraph, evidence: &Assignment) -> Result<MarginalSet>;

}


/// A `MaxMarginalEngine` answers max-product queries: per-clique max-marginals, the weight of
/// the best joint assignment, and the assignment itself (via
/// `MaxMarginalSet::nth_best_assignment`).
///
/// Engines that only support sum-product semantics implement this trait by failing with
/// `ThicketError::Unsupported` rather than returning a degraded answer.
pub trait MaxMarginalEngine {

    /// Compute the max-marginals of the graph conditioned on the evidence
    fn compute_max_marginals(&self, graph: &FactorGraph, evidence: &Assignment) -> Result<MaxMarginalSet>;

}
