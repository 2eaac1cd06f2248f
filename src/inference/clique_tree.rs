//! Defines the `CliqueTree`, the core structure of exact junction-tree inference.
//!
//! A `CliqueTree` is derived once per inference call from a `FactorGraph`: factors sharing
//! enough structure are merged into cliques, adjacent cliques are connected through separators
//! (the variables they share), and messages are passed along the separators until a fixed point
//! is reached. The finished tree answers for each clique its (max-)marginal over the clique's
//! scope, and for the designated root the partition function or best joint weight.
//!
//! # Tree precondition
//! The clique adjacency graph is assumed to be a tree: a single connected, acyclic component.
//! This holds whenever the factor graph's dependency structure, once factors sharing variables
//! are merged, is itself tree shaped. The precondition is load-bearing and deliberately not
//! checked on the query path; on a cyclic clique graph the fixed point stalls or converges to
//! non-exact numbers. Callers who want the safety net can run `validate_tree_structure`
//! explicitly.

use factor::Factor;
use model::FactorGraph;
use util::{Result, ThicketError};
use variable::{Assignment, Variable};

use indexmap::IndexMap;

use std::collections::VecDeque;

/// The two message-computation modes: sum-product yields marginals, max-product yields
/// max-marginals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassingMode {
    Sum,
    Max
}


/// A merged group of factors. The clique's scope equals its anchor factor's scope, since a
/// factor only merges into a clique whose scope covers it.
struct Clique {

    /// The union of the merged factors' scopes
    scope: Vec<Variable>,

    /// Indices (into the source graph) of the merged factors
    factors: Vec<usize>,

    /// The maximum hint priority among the merged factors; determines scan order and thereby
    /// which clique ends up as root
    priority: usize,

    /// Indices into the separator arena, one per adjacent clique
    separators: Vec<usize>,

    /// Product of the merged factors' tables
    potential: Factor,

    /// `potential` reduced by the current evidence; replaced wholesale by `set_evidence`
    conditioned: Factor

}


/// An edge of the clique tree: the variables two adjacent cliques share, plus one directed
/// message slot per direction.
struct Separator {

    /// The intersection of the two cliques' scopes
    scope: Vec<Variable>,

    /// The two adjacent cliques
    cliques: [usize; 2],

    /// `messages[0]` flows `cliques[0] -> cliques[1]`; `messages[1]` the reverse. A message,
    /// once cached, is never recomputed.
    messages: [Option<Factor>; 2]

}


/// The clique tree of a `FactorGraph`.
///
/// Built fresh for every inference call; topology (cliques, separators) is immutable after
/// construction, only the conditioned potentials and the message cache mutate during a run. A
/// `CliqueTree` exclusively owns both for the duration of one call and must not be shared
/// between concurrent queries.
pub struct CliqueTree {
    cliques: Vec<Clique>,
    separators: Vec<Separator>,

    /// Clique indices in ascending elimination priority - the scan order of the fixed point
    scan_order: Vec<usize>,

    /// The designated root: the last clique in scan order that had no outbound message cached
    /// when visited. `None` before message passing (and on an empty tree).
    root: Option<usize>
}


impl CliqueTree {

    /// Build the clique tree of the given `FactorGraph`.
    ///
    /// Factors are processed in descending scope size (ties broken by the graph's elimination
    /// hint) so that larger factors become clique anchors. Each factor either merges into an
    /// existing clique containing its entire scope, or starts a new clique. When several
    /// cliques are equally eligible to absorb a factor the choice is arbitrary; this
    /// implementation takes the first in insertion order, but callers must not rely on that.
    pub fn new(graph: &FactorGraph) -> Result<CliqueTree> {
        let factors = graph.factors();

        // per-factor priority: the externally supplied hint, or the factor index
        let priorities: Vec<usize> = match graph.elimination_hint() {
            Some(hint) => hint.to_vec(),
            None => (0..factors.len()).collect()
        };

        let mut order: Vec<usize> = (0..factors.len()).collect();
        order.sort_by(|&i, &j| {
            factors[j].scope().len()
                      .cmp(&factors[i].scope().len())
                      .then(priorities[i].cmp(&priorities[j]))
        });

        let mut cliques: Vec<Clique> = Vec::new();
        let mut var_cliques: IndexMap<Variable, Vec<usize>> = IndexMap::new();

        for &fidx in order.iter() {
            let factor = &factors[fidx];
            let scope = factor.scope();

            // candidate cliques: those whose scope contains every variable of the factor
            let candidates: Vec<usize> = if scope.is_empty() {
                // a scalar factor has no variables; fold it into the first clique when one
                // exists so its weight still reaches the partition function
                if cliques.is_empty() { vec![] } else { vec![0] }
            } else {
                let mut common: Option<Vec<usize>> = None;
                for v in scope.iter() {
                    match var_cliques.get(v) {
                        None => {
                            common = Some(vec![]);
                            break;
                        },
                        Some(cs) => {
                            common = Some(match common {
                                None => cs.clone(),
                                Some(prev) => prev.into_iter()
                                                  .filter(|c| cs.contains(c))
                                                  .collect()
                            });
                        }
                    }
                }
                common.unwrap_or_default()
            };

            if let Some(&target) = candidates.first() {
                // merge into the first eligible clique (arbitrary tie-break)
                let clique = &mut cliques[target];
                clique.potential = clique.potential.product(factor)?;
                clique.conditioned = clique.potential.clone();
                clique.factors.push(fidx);
                if priorities[fidx] > clique.priority {
                    clique.priority = priorities[fidx];
                }
            } else {
                // anchor a new clique on this factor
                let idx = cliques.len();
                for v in scope.iter() {
                    var_cliques.entry(*v).or_insert_with(Vec::new).push(idx);
                }
                cliques.push(Clique {
                    scope,
                    factors: vec![fidx],
                    priority: priorities[fidx],
                    separators: Vec::new(),
                    potential: factor.clone(),
                    conditioned: factor.clone()
                });
            }
        }

        // adjacency: cliques sharing at least one variable; one separator per unordered pair
        let mut separators: Vec<Separator> = Vec::new();
        for i in 0..cliques.len() {
            for j in (i + 1)..cliques.len() {
                let shared: Vec<Variable> = cliques[i].scope
                                                      .iter()
                                                      .cloned()
                                                      .filter(|v| cliques[j].scope.contains(v))
                                                      .collect();
                if shared.is_empty() {
                    continue;
                }

                let sidx = separators.len();
                separators.push(Separator {
                    scope: shared,
                    cliques: [i, j],
                    messages: [None, None]
                });
                cliques[i].separators.push(sidx);
                cliques[j].separators.push(sidx);
            }
        }

        // scan order: ascending elimination priority, ties by clique index
        let mut scan_order: Vec<usize> = (0..cliques.len()).collect();
        scan_order.sort_by(|&i, &j| {
            cliques[i].priority.cmp(&cliques[j].priority).then(i.cmp(&j))
        });

        Ok(CliqueTree {
            cliques,
            separators,
            scan_order,
            root: None
        })
    }


    /// The number of cliques in the tree
    pub fn num_cliques(&self) -> usize {
        self.cliques.len()
    }


    /// The number of separators (edges) in the tree
    pub fn num_separators(&self) -> usize {
        self.separators.len()
    }


    /// The scope of the given clique
    pub fn clique_scope(&self, clique: usize) -> &[Variable] {
        &self.cliques[clique].scope
    }


    /// The scope of the given separator
    pub fn separator_scope(&self, separator: usize) -> &[Variable] {
        &self.separators[separator].scope
    }


    /// The designated root clique, set by `pass_messages`
    pub fn root(&self) -> Option<usize> {
        self.root
    }


    /// Per clique, the indices of its adjacent cliques. This is the skeleton the max-marginal
    /// decoder traverses.
    pub fn adjacency(&self) -> Vec<Vec<usize>> {
        self.cliques
            .iter()
            .enumerate()
            .map(|(c, clique)| {
                clique.separators
                      .iter()
                      .map(|&s| self.neighbor(c, s))
                      .collect()
            })
            .collect()
    }


    /// Condition every clique potential on the given evidence.
    ///
    /// Each conditioned potential is re-derived from the clique's original potential, and the
    /// entire message cache is cleared: a tree may be reset and re-conditioned, but messages
    /// from a prior evidence setting must never leak into a new run.
    pub fn set_evidence(&mut self, evidence: &Assignment) {
        for clique in self.cliques.iter_mut() {
            clique.conditioned = clique.potential.reduce(evidence);
        }
        for separator in self.separators.iter_mut() {
            separator.messages = [None, None];
        }
        self.root = None;
    }


    /// Run the fixed-point message-passing loop to completion.
    ///
    /// Repeatedly scans all cliques in elimination order; at each clique, every outbound message
    /// whose readiness rule is satisfied (all *other* inbound messages present) and which has
    /// not yet been sent is computed and cached. The loop ends when a full scan produces no new
    /// message. On a tree this caches exactly one message per direction per separator; the last
    /// clique observed with zero outbound messages becomes the root.
    pub fn pass_messages(&mut self, mode: PassingMode) -> Result<()> {
        loop {
            let mut progressed = false;

            for idx in 0..self.scan_order.len() {
                let c = self.scan_order[idx];

                // root bookkeeping happens before this visit's sends
                if self.outbound_count(c) == 0 {
                    self.root = Some(c);
                }

                for s in self.computable_outbound(c) {
                    let message = self.compute_message(c, s, mode)?;
                    let dir = if self.separators[s].cliques[0] == c { 0 } else { 1 };
                    self.separators[s].messages[dir] = Some(message);
                    progressed = true;
                }
            }

            if ! progressed {
                return Ok(());
            }
        }
    }


    /// The separators over which the given clique can now send a not-yet-sent message.
    ///
    /// Standard belief-propagation readiness rule: a message from `clique` over a separator is
    /// computable once the inbound message of every *other* incident separator is available.
    pub fn computable_outbound(&self, clique: usize) -> Vec<usize> {
        self.cliques[clique].separators
            .iter()
            .cloned()
            .filter(|&s| ! self.outbound_sent(clique, s))
            .filter(|&s| {
                self.cliques[clique].separators
                    .iter()
                    .all(|&other| other == s || self.inbound(clique, other).is_some())
            })
            .collect()
    }


    /// The (unnormalized) local marginal of the given clique: its evidence-conditioned
    /// potential multiplied by every inbound message. Only meaningful after `pass_messages`.
    pub fn local_marginal(&self, clique: usize) -> Result<Factor> {
        let inbound: Vec<&Factor> = self.cliques[clique].separators
                                        .iter()
                                        .filter_map(|&s| self.inbound(clique, s))
                                        .collect();
        self.cliques[clique].conditioned.product_all(inbound)
    }


    /// The local marginals of all cliques, in clique order
    pub fn local_marginals(&self) -> Result<Vec<Factor>> {
        (0..self.cliques.len()).map(|c| self.local_marginal(c)).collect()
    }


    /// Opt-in validation that the clique adjacency actually forms a tree.
    ///
    /// Never called by the query path; callers who need the safety net invoke it explicitly
    /// before querying. A disconnected adjacency (a forest) is reported as a violation too:
    /// per-component marginals would still be exact, but the partition function would cover the
    /// root's component only.
    ///
    /// # Errors
    /// * `ThicketError::General` describing the violation (cycle or disconnection)
    pub fn validate_tree_structure(&self) -> Result<()> {
        if self.cliques.is_empty() {
            return Ok(());
        }

        // breadth-first over the separators, tracking the edge we arrived through
        let mut visited = vec![false; self.cliques.len()];
        let mut queue: VecDeque<(usize, Option<usize>)> = VecDeque::new();
        queue.push_back((0, None));
        visited[0] = true;

        while let Some((c, via)) = queue.pop_front() {
            for &s in self.cliques[c].separators.iter() {
                if Some(s) == via {
                    continue;
                }

                let n = self.neighbor(c, s);
                if visited[n] {
                    return Err(
                        ThicketError::General(
                            String::from("The clique adjacency graph contains a cycle")
                        )
                    );
                }

                visited[n] = true;
                queue.push_back((n, Some(s)));
            }
        }

        if visited.iter().any(|&v| ! v) {
            return Err(
                ThicketError::General(
                    String::from("The clique adjacency graph is disconnected")
                )
            );
        }

        Ok(())
    }


    /// The clique on the other end of a separator
    fn neighbor(&self, clique: usize, separator: usize) -> usize {
        let ends = self.separators[separator].cliques;
        if ends[0] == clique { ends[1] } else { ends[0] }
    }


    /// The cached message flowing *toward* the given clique over the given separator
    fn inbound(&self, clique: usize, separator: usize) -> Option<&Factor> {
        let s = &self.separators[separator];
        let dir = if s.cliques[0] == clique { 1 } else { 0 };
        s.messages[dir].as_ref()
    }


    /// Whether the message *from* the given clique over the given separator is cached
    fn outbound_sent(&self, clique: usize, separator: usize) -> bool {
        let s = &self.separators[separator];
        let dir = if s.cliques[0] == clique { 0 } else { 1 };
        s.messages[dir].is_some()
    }


    /// The number of cached messages sent by the given clique
    fn outbound_count(&self, clique: usize) -> usize {
        self.cliques[clique].separators
            .iter()
            .filter(|&&s| self.outbound_sent(clique, s))
            .count()
    }


    /// Compute the message from `clique` over `separator`: the product of the clique's
    /// conditioned potential with all *other* inbound messages, (max-)marginalized down to the
    /// separator's variables.
    fn compute_message(&self, clique: usize, separator: usize, mode: PassingMode) -> Result<Factor> {
        let others: Vec<&Factor> = self.cliques[clique].separators
                                       .iter()
                                       .filter(|&&s| s != separator)
                                       .filter_map(|&s| self.inbound(clique, s))
                                       .collect();

        let joint = self.cliques[clique].conditioned.product_all(others)?;

        let keep = &self.separators[separator].scope;
        let eliminate: Vec<Variable> = joint.scope()
                                            .into_iter()
                                            .filter(|v| ! keep.contains(v))
                                            .collect();

        Ok(match mode {
            PassingMode::Sum => joint.marginalize(&eliminate),
            PassingMode::Max => joint.max_marginalize(&eliminate)
        })
    }

}


#[cfg(test)]
mod tests {
    use super::*;
    use init::Initialization;
    use model::FactorGraphBuilder;

    fn chain() -> ([Variable; 3], FactorGraph) {
        let x1 = Variable::binary();
        let x2 = Variable::binary();
        let x3 = Variable::binary();

        let f12 = Factor::new(vec![x1, x2], array![[2.0, 0.1], [0.1, 1.0]].into_dyn()).unwrap();
        let f23 = Factor::new(vec![x2, x3], array![[2.0, 0.1], [0.1, 1.0]].into_dyn()).unwrap();

        let graph = FactorGraphBuilder::new()
            .with_factor(vec![x1, x2].into_iter().collect(), Initialization::Table(f12))
            .with_factor(vec![x2, x3].into_iter().collect(), Initialization::Table(f23))
            .build()
            .unwrap();

        ([x1, x2, x3], graph)
    }

    #[test]
    fn chain_structure() {
        let ([_, x2, _], graph) = chain();

        let tree = CliqueTree::new(&graph).unwrap();
        assert_eq!(2, tree.num_cliques());
        assert_eq!(1, tree.num_separators());
        assert_eq!(vec![x2], tree.separator_scope(0).to_vec());

        assert!(tree.validate_tree_structure().is_ok());
    }

    #[test]
    /// A factor whose scope is covered by an existing clique merges instead of anchoring a new
    /// clique; the clique potential becomes the product of the merged factors
    fn merge_into_anchor() {
        let a = Variable::binary();
        let b = Variable::binary();
        let c = Variable::binary();

        let abc = Factor::new(
            vec![a, b, c],
            ::factor::Table::ones(vec![2, 2, 2])
        ).unwrap();
        let ab = Factor::new(vec![a, b], array![[1.0, 2.0], [3.0, 4.0]].into_dyn()).unwrap();

        let graph = FactorGraphBuilder::new()
            .with_factor(vec![a, b, c].into_iter().collect(), Initialization::Table(abc))
            .with_factor(vec![a, b].into_iter().collect(), Initialization::Table(ab))
            .build()
            .unwrap();

        let tree = CliqueTree::new(&graph).unwrap();
        assert_eq!(1, tree.num_cliques());
        assert_eq!(3, tree.clique_scope(0).len());
        assert_eq!(0, tree.num_separators());

        // the merged potential carries the pairwise factor's weights
        let mut assn = Assignment::new();
        assn.set(&a, 1);
        assn.set(&b, 1);
        assn.set(&c, 0);

        let marginal = tree.local_marginal(0).unwrap();
        assert_eq!(4.0, marginal.value(&assn).unwrap());
    }

    #[test]
    fn partition_from_root() {
        let (_, graph) = chain();

        let mut tree = CliqueTree::new(&graph).unwrap();
        tree.set_evidence(&Assignment::new());
        tree.pass_messages(PassingMode::Sum).unwrap();

        let root = tree.root().expect("no root designated");
        let marginal = tree.local_marginal(root).unwrap();
        let z = marginal.marginalize(&marginal.scope()).scalar_weight().unwrap();

        // hand-computed: sum over x2 of (sum_x1 f12)(x2) * (sum_x3 f23)(x2) = 2.1^2 + 1.1^2
        assert!((5.62 - z).abs() < 1e-10);
    }

    #[test]
    /// Max-product over the same chain extracts the best joint weight at the root
    fn best_weight_from_root() {
        let (_, graph) = chain();

        let mut tree = CliqueTree::new(&graph).unwrap();
        tree.set_evidence(&Assignment::new());
        tree.pass_messages(PassingMode::Max).unwrap();

        let root = tree.root().expect("no root designated");
        let marginal = tree.local_marginal(root).unwrap();
        let best = marginal.max_marginalize(&marginal.scope()).scalar_weight().unwrap();

        // the best joint assignment is all zeros: 2.0 * 2.0
        assert!((4.0 - best).abs() < 1e-10);
    }

    #[test]
    /// Re-conditioning clears the message cache; no state leaks between runs
    fn evidence_reset() {
        let ([x1, _, _], graph) = chain();

        let mut tree = CliqueTree::new(&graph).unwrap();
        tree.set_evidence(&Assignment::new());
        tree.pass_messages(PassingMode::Sum).unwrap();

        let root = tree.root().unwrap();
        let unconditioned = tree.local_marginal(root)
                                .unwrap()
                                .marginalize(&tree.clique_scope(root).to_vec())
                                .scalar_weight()
                                .unwrap();

        // condition on x1 = 0 and rerun on the same tree
        let mut evidence = Assignment::new();
        evidence.set(&x1, 0);
        tree.set_evidence(&evidence);
        assert!(tree.root().is_none());

        tree.pass_messages(PassingMode::Sum).unwrap();
        let root = tree.root().unwrap();
        let marginal = tree.local_marginal(root).unwrap();
        let conditioned = marginal.marginalize(&marginal.scope()).scalar_weight().unwrap();

        // hand-computed: sum over x2 of f12(0, x2) * (sum_x3 f23)(x2) = 2*2.1 + 0.1*1.1
        assert!((4.31 - conditioned).abs() < 1e-10);
        assert!(conditioned < unconditioned);
    }

    #[test]
    /// The four pairwise factors of the misconception network merge into four cliques whose
    /// adjacency is a cycle; validation reports it, the query path does not
    fn cycle_detected() {
        let a = Variable::binary();
        let b = Variable::binary();
        let c = Variable::binary();
        let d = Variable::binary();

        let builder = FactorGraphBuilder::new();
        let graph = builder
            .with_factor(
                vec![a, b].into_iter().collect(),
                Initialization::Table(Factor::new(vec![a, b], array![[30.0, 5.0], [1.0, 10.0]].into_dyn()).unwrap())
            )
            .with_factor(
                vec![b, c].into_iter().collect(),
                Initialization::Table(Factor::new(vec![b, c], array![[100.0, 1.0], [1.0, 100.0]].into_dyn()).unwrap())
            )
            .with_factor(
                vec![c, d].into_iter().collect(),
                Initialization::Table(Factor::new(vec![c, d], array![[1.0, 100.0], [100.0, 1.0]].into_dyn()).unwrap())
            )
            .with_factor(
                vec![d, a].into_iter().collect(),
                Initialization::Table(Factor::new(vec![d, a], array![[100.0, 1.0], [1.0, 100.0]].into_dyn()).unwrap())
            )
            .build()
            .unwrap();

        let tree = CliqueTree::new(&graph).unwrap();
        assert_eq!(4, tree.num_cliques());
        assert_eq!(4, tree.num_separators());
        assert!(tree.validate_tree_structure().is_err());
    }

    #[test]
    /// The elimination hint only moves the root; the partition function is unaffected
    fn hint_moves_root() {
        let x1 = Variable::binary();
        let x2 = Variable::binary();
        let x3 = Variable::binary();

        let f12 = Factor::new(vec![x1, x2], array![[2.0, 0.1], [0.1, 1.0]].into_dyn()).unwrap();
        let f23 = Factor::new(vec![x2, x3], array![[2.0, 0.1], [0.1, 1.0]].into_dyn()).unwrap();

        let graph = FactorGraphBuilder::new()
            .with_factor(vec![x1, x2].into_iter().collect(), Initialization::Table(f12))
            .with_factor(vec![x2, x3].into_iter().collect(), Initialization::Table(f23))
            .with_elimination_hint(vec![1, 0])
            .build()
            .unwrap();

        let mut tree = CliqueTree::new(&graph).unwrap();
        tree.set_evidence(&Assignment::new());
        tree.pass_messages(PassingMode::Sum).unwrap();

        let root = tree.root().unwrap();
        let marginal = tree.local_marginal(root).unwrap();
        let z = marginal.marginalize(&marginal.scope()).scalar_weight().unwrap();
        assert!((5.62 - z).abs() < 1e-10);
    }

}
