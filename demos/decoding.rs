//! Provides an example of how to use thicket to decode the most likely joint assignment of a
//! factor graph with max-product message passing.

extern crate thicket;
#[macro_use]
extern crate ndarray;

use thicket as t;
use t::MaxMarginalEngine;

fn main() -> t::Result<()> {
    // a tiny tagging chain; each position is 0 = noun, 1 = verb
    let w1 = t::Variable::binary();
    let w2 = t::Variable::binary();
    let w3 = t::Variable::binary();

    /////////////////////////////////////////////////////
    // Step 1: Build the Model

    // verbs rarely follow verbs
    let transition = array![
        [1.0, 4.0],
        [5.0, 0.5]
    ].into_dyn();

    // per-position evidence potentials from a (fictional) tagger
    let e1 = t::Factor::new(vec![w1], array![ 4.0, 1.0 ].into_dyn())?;
    let e2 = t::Factor::new(vec![w2], array![ 1.0, 3.0 ].into_dyn())?;
    let e3 = t::Factor::new(vec![w3], array![ 2.0, 2.0 ].into_dyn())?;

    let f12 = t::Factor::new(vec![w1, w2], transition.clone())?;
    let f23 = t::Factor::new(vec![w2, w3], transition)?;

    let graph = t::FactorGraphBuilder::new()
        .with_named_variable(&w1, "W1")
        .with_named_variable(&w2, "W2")
        .with_named_variable(&w3, "W3")
        .with_factor(vec![w1, w2].into_iter().collect(), t::Initialization::Table(f12))
        .with_factor(vec![w2, w3].into_iter().collect(), t::Initialization::Table(f23))
        .with_factor(vec![w1].into_iter().collect(), t::Initialization::Table(e1))
        .with_factor(vec![w2].into_iter().collect(), t::Initialization::Table(e2))
        .with_factor(vec![w3].into_iter().collect(), t::Initialization::Table(e3))
        .build()?;

    /////////////////////////////////////////////////////
    // Step 2: Decode the best assignment

    let engine = t::JunctionTreeEngine::new();
    let result = engine.compute_max_marginals(&graph, &t::Assignment::new())?;

    println!("best weight = {:.4}", result.best_weight());

    let best = result.nth_best_assignment(0)?;
    for (var, val) in best.iter() {
        let name = graph.lookup_name(var).map(|n| n.as_str()).unwrap_or("?");
        let tag = if *val == 0 { "noun" } else { "verb" };
        println!("{} = {}", name, tag);
    }

    /////////////////////////////////////////////////////
    // Step 3: Decode again, forcing the middle position

    let mut evidence = t::Assignment::new();
    evidence.set(&w2, 0);

    let result = engine.compute_max_marginals(&graph, &evidence)?;
    println!("best weight given W2 = noun: {:.4}", result.best_weight());

    Ok(())
}
