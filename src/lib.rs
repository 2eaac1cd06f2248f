//! `thicket` is a library for exact probabilistic inference over discrete factor graphs.
//!
//! A model is assembled with a `FactorGraphBuilder`, then queried through the inference
//! engines: `JunctionTreeEngine` (clique-tree message passing, sum- and max-product),
//! `VariableEliminationEngine` (sum-product only), and `BruteForceEngine` (enumeration, for
//! reference and testing).

extern crate bidir_map;
extern crate indexmap;
#[macro_use]
extern crate itertools;
#[macro_use]
extern crate ndarray;
extern crate ndarray_rand;
extern crate rand;

pub mod variable;
pub mod factor;
pub mod init;
pub mod model;
pub mod inference;
pub mod util;

pub use factor::Factor;
pub use inference::{
    BruteForceEngine,
    CliqueTree,
    JunctionTreeEngine,
    MarginalEngine,
    MarginalSet,
    MaxMarginalEngine,
    MaxMarginalSet,
    PassingMode,
    VariableEliminationEngine
};
pub use init::Initialization;
pub use model::{FactorGraph, FactorGraphBuilder};
pub use util::{Result, ThicketError};
pub use variable::{all_assignments, Assignment, Variable};
