//! Provides an example of how to use thicket to compute marginals and the partition function
//! of a small pairwise factor graph.

extern crate thicket;
#[macro_use]
extern crate ndarray;

use thicket as t;
use t::MarginalEngine;

fn main() -> t::Result<()> {
    // a three day weather chain; each day is 0 = sunny, 1 = rainy
    let day1 = t::Variable::binary();
    let day2 = t::Variable::binary();
    let day3 = t::Variable::binary();

    /////////////////////////////////////////////////////
    // Step 1: Build the Model

    // weather tends to persist from one day to the next
    let persistence = array![
        [3.0, 1.0],
        [1.0, 2.0]
    ].into_dyn();

    let f12 = t::Factor::new(vec![day1, day2], persistence.clone())?;
    let f23 = t::Factor::new(vec![day2, day3], persistence)?;

    let graph = t::FactorGraphBuilder::new()
        .with_named_variable(&day1, "Day1")
        .with_named_variable(&day2, "Day2")
        .with_named_variable(&day3, "Day3")
        .with_factor(vec![day1, day2].into_iter().collect(), t::Initialization::Table(f12))
        .with_factor(vec![day2, day3].into_iter().collect(), t::Initialization::Table(f23))
        .build()?;

    /////////////////////////////////////////////////////
    // Step 2: Run an unconditional query

    let engine = t::JunctionTreeEngine::new();
    let result = engine.compute_marginals(&graph, &t::Assignment::new())?;

    println!("Z = {:.4}", result.partition());

    let scope = vec![day2];
    let m = result.marginal(&scope)?;
    for (i, assignment) in t::all_assignments(&scope).enumerate() {
        println!("P(Day2 = {}) = {:.4}", i, m.value(&assignment)? / result.partition());
    }

    /////////////////////////////////////////////////////
    // Step 3: Run the same query conditioned on evidence

    let mut evidence = t::Assignment::new();
    evidence.set(&day1, 1);

    let result = engine.compute_marginals(&graph, &evidence)?;

    let m = result.marginal(&scope)?;
    for (i, assignment) in t::all_assignments(&scope).enumerate() {
        println!("P(Day2 = {} | Day1 = 1) = {:.4}", i, m.value(&assignment)? / result.partition());
    }

    Ok(())
}
