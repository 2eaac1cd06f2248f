//! Module containing initialization routines for the potentials of a factor graph.

use factor::Factor;
use util::{ThicketError, Result};
use variable::Variable;

use ndarray::prelude as nd;
use ndarray_rand::RandomExt;
use rand::distributions::Range;

use std::collections::HashSet;

/// Defines possible ways to initialize a `Factor`'s weight table.
pub enum Initialization {
    /// A uniform table over all joint assignments
    Uniform,

    /// Randomly initialize the weights of the table
    Random,

    /// User defined table
    Table(Factor)
}


impl Initialization {

    /// Construct a factor, initialized based on ```self```
    ///
    /// # Args
    /// * `scope`: a set of `Variable`s over which to build the `Factor`
    ///
    /// # Returns
    /// a `Factor`, initialized according to ```self```. The order of the `Variable`s in the
    /// resulting `Factor` is undefined.
    pub fn build_factor(self, scope: HashSet<Variable>) -> Result<Factor> {
        if scope.is_empty() {
            return Err(ThicketError::InvalidScope);
        }

        // if this is a user defined factor, it just needs to be verified and returned
        if let Initialization::Table(f) = self {
            let s = f.scope();
            if s.iter().all(|v| scope.contains(v)) && s.len() == scope.len() {
                return Ok(f);
            } else {
                return Err(ThicketError::InvalidInitialization);
            }
        }

        let scope: Vec<Variable> = scope.into_iter().collect();
        let shape: Vec<usize> = scope.iter().map(|v| v.cardinality()).collect();

        let tbl = match self {
            Initialization::Uniform => {
                // normalizing constant is just the number of elements
                let z: usize = shape.iter().product();
                let val = 1. / (z as f64);
                nd::Array::from_elem(shape, val).into_dyn()
            },
            Initialization::Random => {
                let mut tbl = nd::Array::random(shape, Range::new(1.0, 100.0));
                let z = tbl.scalar_sum();
                tbl.mapv_inplace(|e| e / z);
                tbl.into_dyn()
            },
            Initialization::Table(_) => panic!("unreachable")
        };

        Factor::new(scope, tbl)
    }
}
