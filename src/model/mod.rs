//! Defines a `FactorGraph`, a Markovian graphical model representing the factorization of an
//! unnormalized distribution as a collection of `Factor`s.

pub mod factor_graph;

pub use self::factor_graph::{FactorGraph, FactorGraphBuilder};
