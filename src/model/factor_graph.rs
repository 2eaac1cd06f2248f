//! Defines a `FactorGraph`, an immutable container of variables, factors and already-conditioned
//! values, which the inference engines consume.

use factor::Factor;
use init::Initialization;
use util::{Result, ThicketError};
use variable::{Assignment, Variable};

use bidir_map::BidirMap;
use indexmap::IndexMap;

use std::collections::HashSet;

/// An immutable factor graph: a set of `Variable`s and a set of non-negative weight functions
/// (`Factor`s) over subsets of those variables.
///
/// # Representation
/// The graph structure is not stored explicitly; a `FactorGraph` is a logical view of a
/// collection of `Factor`s, plus the adjacency index needed to answer "which factors mention this
/// variable". The joint unnormalized weight of a full assignment is the product of all factor
/// values at that assignment; the normalizing partition function is an inference result (see the
/// `inference` module), never computed at construction time.
#[derive(Debug)]
pub struct FactorGraph {

    /// The `Factor`s that comprise the `FactorGraph`
    factors: Vec<Factor>,

    /// The `Variable`s that comprise the `FactorGraph` and their names.
    variables: BidirMap<Variable, String>,

    /// Per variable, the indices of the factors whose scope contains it, in factor order.
    /// Insertion-ordered so that the documented arbitrary tie-breaks downstream stay stable.
    adjacency: IndexMap<Variable, Vec<usize>>,

    /// Values the graph has already been conditioned on
    conditioned: Assignment,

    /// Optional externally supplied elimination-order hint: one priority per factor, lower
    /// priorities eliminated first
    hint: Option<Vec<usize>>

}


impl FactorGraph {

    /// Get the `Factor`s of the graph
    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    /// Lookup a `Variable` in the `FactorGraph` based on the name
    pub fn lookup_variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get_by_second(&String::from(name))
    }

    /// Lookup a `Variable`'s name in the `FactorGraph`.
    pub fn lookup_name(&self, var: &Variable) -> Option<&String> {
        self.variables.get_by_first(var)
    }

    /// Get all `Variable`s in the graph.
    pub fn variables(&self) -> HashSet<Variable> {
        self.variables.first_col().cloned().collect()
    }

    /// Get the number of `Variable`s in the `FactorGraph`
    pub fn num_variables(&self) -> usize {
        self.variables.first_col().count()
    }

    /// The indices of the `Factor`s whose scope contains the given `Variable`
    pub fn factors_with_variable(&self, var: &Variable) -> &[usize] {
        self.adjacency.get(var).map(|idxs| idxs.as_slice()).unwrap_or(&[])
    }

    /// The indices of the `Factor`s sharing at least one `Variable` with the given factor
    pub fn adjacent_factors(&self, idx: usize) -> Vec<usize> {
        let mut adjacent = Vec::new();
        for v in self.factors[idx].scope() {
            for &other in self.factors_with_variable(&v) {
                if other != idx && ! adjacent.contains(&other) {
                    adjacent.push(other);
                }
            }
        }
        adjacent
    }

    /// The values this graph has already been conditioned on
    pub fn conditioned_values(&self) -> &Assignment {
        &self.conditioned
    }

    /// The externally supplied elimination-order hint, if any
    pub fn elimination_hint(&self) -> Option<&[usize]> {
        self.hint.as_ref().map(|h| h.as_slice())
    }

    /// Condition the `FactorGraph` on the given evidence.
    ///
    /// Every factor is reduced by the evidence, the observed `Variable`s leave the graph, and
    /// the evidence is folded into the conditioned values. Querying the returned graph without
    /// evidence gives the same results as querying `self` with `evidence`.
    ///
    /// # Args
    /// * `evidence`: a partial `Assignment` of the `Variable`s in this graph.
    pub fn condition(&self, evidence: &Assignment) -> FactorGraph {
        let factors: Vec<Factor> = self.factors.iter().map(|f| f.reduce(evidence)).collect();
        let variables: BidirMap<Variable, String> = self.variables
                                                        .iter()
                                                        .filter(|&(v, _)| evidence.get(v).is_none())
                                                        .map(|(&v, n)| (v, n.clone()))
                                                        .collect();

        let adjacency = build_adjacency(&factors);

        FactorGraph {
            factors,
            variables,
            adjacency,
            conditioned: self.conditioned.union(evidence),
            hint: self.hint.clone()
        }
    }

    /// Determine the unnormalized weight of a full `Assignment` to the `Variable`s in the graph:
    /// the product of every factor's value at that assignment.
    ///
    /// # Args
    /// * `assignment`: a full `Assignment` to the graph
    ///
    /// # Errors
    /// * `ThicketError::IncompleteAssignment` if any factor's scope is not fully assigned
    pub fn unnormalized_weight(&self, assignment: &Assignment) -> Result<f64> {
        // for every factor in the graph
        self.factors.iter()
                    // get the value of the assignment
                    .map(|f| f.value(assignment))
                    // and multiply those weights together
                    // but if there are any errors, just return the error
                    .fold(Ok(1.0), |acc, val| acc.and_then(|p| val.map(|v| p * v)))
    }

}


/// Utility function to index, per variable, the factors containing it.
fn build_adjacency(factors: &[Factor]) -> IndexMap<Variable, Vec<usize>> {
    let mut adjacency: IndexMap<Variable, Vec<usize>> = IndexMap::new();
    for (idx, f) in factors.iter().enumerate() {
        for v in f.scope() {
            adjacency.entry(v).or_insert_with(Vec::new).push(idx);
        }
    }
    adjacency
}


/// An implementation of the [builder pattern] for creating a `FactorGraph`.
///
/// [builder pattern]: https://en.wikipedia.org/wiki/Builder_pattern
pub struct FactorGraphBuilder {

    /// The `Factor`s added to the `FactorGraph`
    factors: Vec<Factor>,

    /// The name <-> variable mapping
    names: BidirMap<Variable, String>,

    /// The optional elimination-order hint
    hint: Option<Vec<usize>>,

    /// The error state of the builder, if any
    err: Option<ThicketError>

}

impl FactorGraphBuilder {

    /// Construct a new `FactorGraphBuilder`
    pub fn new() -> FactorGraphBuilder {
        FactorGraphBuilder {
            factors: Vec::new(),
            names: BidirMap::new(),
            hint: None,
            err: None
        }
    }


    /// Declare the name for a `Variable` in this `FactorGraph`.
    ///
    /// This is optional; `Variable`s added to the `FactorGraphBuilder` via `with_factor` that
    /// do not have a corresponding name will be assigned a default name.
    pub fn with_named_variable(mut self, var: &Variable, name: &str) -> Self {
        self.names.insert(*var, String::from(name));
        self
    }


    /// Add a `Factor` to the `FactorGraph`.
    ///
    /// # Arguments
    /// * `scope`: the `Variable`s in the scope of the `Factor`
    /// * `init`: the desired method of initializing the `Factor`
    pub fn with_factor(mut self, scope: HashSet<Variable>, init: Initialization) -> Self {
        if self.err.is_some() {
            return self;
        }

        match init.build_factor(scope) {
            Ok(f) => {
                self.factors.push(f)
            },
            Err(e) => {
                self.err = Some(e);
            }
        };

        self
    }


    /// Supply an elimination-order hint: one priority per factor, in the order the factors were
    /// added. Lower priorities are eliminated first. The hint influences which clique the
    /// junction-tree engine designates as root; it never affects the marginals themselves.
    pub fn with_elimination_hint(mut self, hint: Vec<usize>) -> Self {
        self.hint = Some(hint);
        self
    }


    /// Build the `FactorGraph`, ensuring consistency of the `Factor`s and `Variable`s
    ///
    /// # Errors
    /// * `ThicketError::InvalidScope` if there is a mismatch between the `Variable`s defined by
    ///   calls to `with_named_variable` and `with_factor`
    /// * `ThicketError::General` if the elimination hint does not have one entry per factor
    pub fn build(mut self) -> Result<FactorGraph> {
        if self.err.is_some() {
            return Err(self.err.unwrap());
        }

        // make sure there are no variables defined but not used in a factor
        for v in self.names.first_col() {
            if ! self.factors.iter().any(|f| f.scope().contains(v)) {
                return Err(ThicketError::InvalidScope);
            }
        }

        // for any unnamed variable in a factor, give it a name
        for f in self.factors.iter() {
            for v in f.scope().iter() {
                if ! self.names.contains_first_key(v) {
                    self.names.insert(*v, v.to_string());
                }
            }
        }

        if let Some(ref hint) = self.hint {
            if hint.len() != self.factors.len() {
                return Err(
                    ThicketError::General(
                        String::from("The elimination hint must have one entry per factor")
                    )
                );
            }
        }

        let adjacency = build_adjacency(&self.factors);

        Ok(FactorGraph {
            factors: self.factors,
            variables: self.names,
            adjacency,
            conditioned: Assignment::new(),
            hint: self.hint
        })
    }

}
