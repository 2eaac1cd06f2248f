//! Definition of the factor module
//!
//! A `Factor` is a non-negative weight function over assignments to a fixed set of `Variable`s.
//! All operations are pure: they return new `Factor`s and never mutate their inputs.

use util::{Result, ThicketError};
use variable::{Variable, Assignment, all_assignments};

use ndarray::prelude as nd;
use itertools::Itertools;

/// Alias f64 ndarray::Array as Table
pub type Table = nd::ArrayD<f64>;


#[derive(Clone, Debug)]
pub enum Factor {
    /// The empty, identity `Factor` with no scope and no weight. This type exists for dealing
    /// with arithmetic operations of `Factor`s; it is the multiplicative unit.
    Identity,

    /// A `Factor` over some scope of variables, represented as a dense table as described in
    /// Koller & Friedman. A `Factor` with an empty scope is a scalar weight (0-dimensional
    /// table); this is how the partition function flows out of inference.
    Table {
        /// The scope of the `Factor`
        scope: Vec<Variable>,

        /// The values of the `Factor` table. Axes align with `scope`.
        table: Table
    }
}


impl Factor {

    /// Get the identity factor
    pub fn identity() -> Self {
        Factor::Identity
    }


    /// Create a degenerate `Factor` over zero variables that behaves as a scalar weight
    pub fn scalar(weight: f64) -> Self {
        Factor::Table {
            scope: vec![],
            table: nd::arr0(weight).into_dyn()
        }
    }


    /// Create a new `Factor`
    ///
    /// # Args
    /// * `scope`: the `Variable`s of the `Factor`, one per table axis
    /// * `table`: the non-negative weights, indexed by joint assignments to `scope`
    ///
    /// # Errors
    /// * `ThicketError::General` if the scope is empty or does not match the table shape
    /// * `ThicketError::DuplicateVariable` if a `Variable` appears twice in the scope
    /// * `ThicketError::NonPositiveWeight` if the table holds a negative value
    pub fn new(scope: Vec<Variable>, table: Table) -> Result<Self> {
        if scope.len() == 0 {
            return Err(
                ThicketError::General(
                    String::from("Invalid arguments. Scope may not be empty")
                )
            );
        } else if scope.len() != table.ndim() {
            return Err(
                ThicketError::General(
                    String::from("Invalid arguments. Cardinality of scope must match number of table dimensions")
                )
            );
        }

        if scope.iter().unique().count() != scope.len() {
            return Err(ThicketError::DuplicateVariable);
        }

        for (v, t) in scope.iter().map(|&v| v.cardinality()).zip(table.shape().iter()) {
            if v != *t {
                return Err(
                    ThicketError::General(
                        String::from("Invalid arguments. Dimensions do not match")
                    )
                );
            }
        }

        // factors may not have negative values
        if table.iter().any(|&v| v < 0.0) {
            return Err(ThicketError::NonPositiveWeight);
        }

        Ok(Factor::Table { scope, table })
    }


    /// Check if the `Factor` is the identity `Factor`
    pub fn is_identity(&self) -> bool {
        match self {
            &Factor::Identity => true,
            _ => false
        }
    }


    /// Check if the `Factor` is a scalar - a table factor over zero variables
    pub fn is_scalar(&self) -> bool {
        match self {
            &Factor::Identity => false,
            &Factor::Table { ref scope, .. } => scope.is_empty()
        }
    }


    /// Retrieve the scope of the `Factor`.
    ///
    /// # Note
    /// This method returns a clone of the `Factor`'s scope. `Variable`s are lightweight and
    /// therefore this is an acceptable overhead
    pub fn scope(&self) -> Vec<Variable> {
        match self {
            &Factor::Identity => vec![],
            &Factor::Table { ref scope, .. } => scope.clone()
        }
    }


    /// Retrieve the value for a complete assignment over the scope of this `Factor`
    ///
    /// This operation is defined only on non-identity `Factor`s.
    ///
    /// # Args
    /// * `assignment`: a full assignment to the scope of a `Factor`. The assignment's scope may
    ///                 be a superset of the `Factor`s scope.
    ///
    /// # Returns
    /// the value of the assignment, or an error.
    ///
    /// # Errors
    /// * `ThicketError::General` if the `Factor` is the identity
    /// * `ThicketError::IncompleteAssignment`, if assignment is not a complete assignment to the
    ///   scope of the `Factor`
    pub fn value(&self, assignment: &Assignment) -> Result<f64> {
        match self {
            &Factor::Identity => {
                Err(ThicketError::General(String::from("The identity factor has no value")))
            },
            &Factor::Table { ref scope, ref table } => {
                let idxs: Vec<Option<&usize>> = scope.iter().map(|v| assignment.get(v)).collect();
                if idxs.iter().any(|&v| v.is_none()) {
                    return Err(ThicketError::IncompleteAssignment);
                }

                let idxs: Vec<usize> = idxs.iter().map(|&v| *(v.unwrap())).collect();
                Ok(table[nd::IxDyn(&idxs)])
            }
        }
    }


    /// The weight of a degenerate `Factor` over zero variables.
    ///
    /// The identity `Factor` has weight 1.
    ///
    /// # Errors
    /// * `ThicketError::InvalidScope` if the `Factor` still has variables in scope
    pub fn scalar_weight(&self) -> Result<f64> {
        match self {
            &Factor::Identity => Ok(1.0),
            &Factor::Table { ref scope, ref table } => {
                if scope.is_empty() {
                    Ok(table[nd::IxDyn(&[])])
                } else {
                    Err(ThicketError::InvalidScope)
                }
            }
        }
    }


    /// Product of this `Factor` and another `Factor`.
    ///
    /// Defined in Koller & Friedman Section 4.2.1. The result's scope is the union of the two
    /// scopes, aligned on shared variables; disjoint scopes give the outer product, and a scalar
    /// operand scales the other side.
    ///
    /// # Args
    /// * `other`: the `Factor` to multiply with.
    ///
    /// # Returns
    /// A new `Factor` of scope union(self.scope(), other.scope())
    pub fn product(&self, other: &Self) -> Result<Self> {
        // Factor::Identity is the multiplicative identity
        if let &Factor::Identity = self {
            return Ok(other.clone());
        } else if let &Factor::Identity = other {
            return Ok(self.clone());
        }

        // If we get here, we have two non-trivial (i.e. non-identity) factors.
        // We are computing a new factor Psi(X, Y, Z) = phi1(X, Y) * phi2(Y, Z).
        // See Koller & Friedman Definition 4.2
        let my_scope = self.scope();

        // compute the set union(X, Y, Z)
        let new_scope: Vec<Variable> = my_scope.into_iter()
                                               .chain(other.scope())
                                               .unique()
                                               .collect();

        let new_shape: Vec<usize> = new_scope.iter().map(|&v| v.cardinality()).collect();

        // Allocate space for new table
        let mut tbl = nd::Array::ones(new_shape).into_dyn();

        for assn in all_assignments(&new_scope) {
            // For each assignment, multiply the values in each and store the result in the
            // new table
            //
            // Unwrapping here is safe because a failed lookup should be impossible if
            // invariants are maintained
            let phi1_val = self.value(&assn).unwrap();
            let phi2_val = other.value(&assn).unwrap();

            let idx: Vec<usize> = new_scope.iter().map(|v| *assn.get(&v).unwrap()).collect();
            tbl[nd::IxDyn(&idx)] = phi1_val * phi2_val;
        }

        Ok(Factor::Table { scope: new_scope, table: tbl })
    }


    /// Product of this `Factor` and a collection of other `Factor`s
    pub fn product_all<'a, I>(&self, others: I) -> Result<Self>
        where I: IntoIterator<Item = &'a Factor>
    {
        let mut acc = self.clone();
        for f in others {
            acc = acc.product(f)?;
        }
        Ok(acc)
    }


    /// Reduce the `Factor` over the given partial assignment
    ///
    /// Defined in Koller & Friedman 4.2.3. The result's scope is the unassigned variables; a
    /// complete assignment yields a scalar `Factor` carrying the selected entry's weight.
    ///
    /// # Args
    /// * `assignment`: a partial assignment to the `Factor`
    ///
    /// # Returns
    /// A new `Factor` reduced over the given assignment
    pub fn reduce(&self, assignment: &Assignment) -> Self {
        match self {
            &Factor::Identity => Factor::Identity,
            &Factor::Table { ref scope, ref table } => {
                // reduce table based on assignment
                let mut view = table.view();
                let mut new_shape: Vec<usize> = Vec::new();
                let mut new_scope: Vec<Variable> = Vec::new();

                for (i, &v) in scope.iter().enumerate() {
                    if let Some(&val) = assignment.get(&v) {
                        // collapses the axis to length one; the reshape below drops it
                        view.subview_inplace(nd::Axis(i), val);
                    } else {
                        new_shape.push(table.len_of(nd::Axis(i)));
                        new_scope.push(v);
                    }
                }

                if new_scope.len() == scope.len() {
                    // empty assignment (relative to scope)
                    self.clone()
                } else {
                    // a complete assignment leaves an empty shape: a scalar factor carrying
                    // the selected weight
                    Factor::Table {
                        scope: new_scope,
                        table: view.to_owned()
                                   .into_shape(new_shape)
                                   .expect("reduce produced a mismatched shape")
                    }
                }
            }
        }
    }


    /// Marginalize the `Factor` over the given `Variable`s - sum-product semantics
    ///
    /// Defined in Koller & Friedman 9.3.1
    ///
    /// # Args
    /// * `vars`: the `Variable`s to sum out. Variables outside the scope are ignored.
    ///
    /// # Returns
    /// another `Factor`, marginalized over the given `Variable`s. Summing out the last variable
    /// yields a scalar `Factor` holding the total weight.
    pub fn marginalize(&self, vars: &[Variable]) -> Self {
        self.eliminate(vars, |table, axis| table.sum_axis(axis))
    }


    /// Marginalize the `Factor` over the given `Variable`s - max-product semantics.
    ///
    /// Identical to `marginalize` in scope-reduction behavior, but takes the maximum over each
    /// eliminated variable instead of the sum.
    pub fn max_marginalize(&self, vars: &[Variable]) -> Self {
        self.eliminate(vars, |table, axis| {
            table.fold_axis(axis, ::std::f64::NEG_INFINITY, |&acc, &v| acc.max(v))
        })
    }


    /// Shared scope-reduction skeleton for `marginalize` / `max_marginalize`
    fn eliminate<F>(&self, vars: &[Variable], collapse: F) -> Self
        where F: Fn(&Table, nd::Axis) -> Table
    {
        match self {
            // the identity factor marginalized over anything is the identity
            &Factor::Identity => Factor::Identity,

            &Factor::Table { ref scope, ref table } => {
                let mut new_scope = scope.clone();
                let mut new_table = table.clone();

                for var in vars {
                    if let Some(idx) = new_scope.iter().position(|v| v == var) {
                        new_table = collapse(&new_table, nd::Axis(idx));
                        new_scope.remove(idx);
                    }
                }

                Factor::Table { scope: new_scope, table: new_table }
            }
        }
    }


    /// Retrieve up to `k` positive-weight assignments to this `Factor`'s scope, in descending
    /// weight order.
    ///
    /// Ties are broken deterministically by row-major table order. Zero-weight assignments are
    /// never returned; the result may therefore hold fewer than `k` entries, or none at all.
    pub fn most_likely_assignments(&self, k: usize) -> Vec<(Assignment, f64)> {
        match self {
            &Factor::Identity => vec![],
            &Factor::Table { ref scope, .. } => {
                // Unwrapping is safe: all_assignments yields complete assignments to the scope
                let mut entries: Vec<(Assignment, f64)> = all_assignments(scope)
                    .map(|assn| {
                        let weight = self.value(&assn).unwrap();
                        (assn, weight)
                    })
                    .filter(|&(_, weight)| weight > 0.0)
                    .collect();

                // stable sort preserves row-major order among equal weights
                entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
                entries.truncate(k);
                entries
            }
        }
    }


    /// Normalize the `Factor` so its weights sum to one
    ///
    /// # Errors
    /// * `ThicketError::DivideByZero` if the total weight is zero
    pub fn normalize(&self) -> Result<Self> {
        match self {
            &Factor::Identity => Ok(Factor::Identity),
            &Factor::Table { ref scope, ref table } => {
                let z = table.scalar_sum();
                if z <= 0.0 {
                    return Err(ThicketError::DivideByZero);
                }

                Ok(Factor::Table {
                    scope: scope.clone(),
                    table: table / z
                })
            }
        }
    }

}

// Unit tests
#[cfg(test)]
mod tests {
    use super::*;
    use std;

    #[test]
    fn identity() {
        let f = Factor::identity();

        assert!(f.is_identity());
        assert!(! f.is_scalar());
        assert_eq!(1.0, f.scalar_weight().unwrap());
    }

    #[test]
    fn scalar() {
        let f = Factor::scalar(2.5);

        assert!(! f.is_identity());
        assert!(f.is_scalar());
        assert!(f.scope().is_empty());
        assert_eq!(2.5, f.scalar_weight().unwrap());
    }

    #[test]
    fn table_factor() {
        let vars = vec![ Variable::binary(), Variable::discrete(5), Variable::discrete(3) ];
        let mut table = Table::ones(vec![2, 5, 3]);
        table[[1, 1, 1].as_ref()] = 5.;

        // assert table holds correct values
        let f = Factor::new(vars.clone(), table).unwrap();

        assert!(! f.is_identity());
        for (x, y, z) in iproduct!(0..2, 0..5, 0..3) {
            let mut assn = Assignment::new();
            assn.set(&vars[0], x);
            assn.set(&vars[1], y);
            assn.set(&vars[2], z);

            let val = f.value(&assn).unwrap();
            if x == 1 && y == 1 && z == 1 {
                assert_eq!(5., val);
            } else {
                assert_eq!(1., val);
            }
        }

        assert!(f.scalar_weight().is_err());
    }

    #[test]
    fn table_factor_errs() {
        // empty scope
        let vars = vec![];
        let table = Table::ones(vec![2, 5, 3]);
        let f = Factor::new(vars, table);
        assert!(f.is_err());
        match f.expect_err("missing error") {
            ThicketError::General(_) => assert!(true),
            _ => panic!("wrong error type")
        };

        // mismatched number of dimensions
        let vars = vec![ Variable::binary(), Variable::binary() ];
        let table = Table::ones(vec![2, 2, 2]);
        let f = Factor::new(vars.clone(), table);
        assert!(f.is_err());
        match f.expect_err("missing error") {
            ThicketError::General(_) => assert!(true),
            _ => panic!("wrong error type")
        };

        // wrong cardinality
        let table = Table::ones(vec![2, 3]);
        let f = Factor::new(vars.clone(), table);
        assert!(f.is_err());
        match f.expect_err("missing error") {
            ThicketError::General(_) => assert!(true),
            _ => panic!("wrong error type")
        };

        // duplicated variable
        let table = Table::ones(vec![2, 2]);
        let f = Factor::new(vec![ vars[0], vars[0] ], table);
        assert!(f.is_err());
        match f.expect_err("missing error") {
            ThicketError::DuplicateVariable => assert!(true),
            _ => panic!("wrong error type")
        };

        // negative weight
        let table = Table::ones(vec![2, 2]) * -1.0;
        let f = Factor::new(vars.clone(), table);
        assert!(f.is_err());
        match f.expect_err("missing error") {
            ThicketError::NonPositiveWeight => assert!(true),
            _ => panic!("wrong error type")
        };
    }

    #[test]
    fn value() {
        let vars = vec![ Variable::binary(), Variable::binary() ];
        let mut table = Table::ones(vec![2, 2]);

        for (i, (x, y)) in (0..2).zip(0..2).enumerate() {
            table[[x, y].as_ref()] = i as f64;
        }

        let f = Factor::new(vars.clone(), table).expect("Unexpected error");

        // verify behavior on precise assignment
        for (i, (x, y)) in (0..2).zip(0..2).enumerate() {
            let mut assn = Assignment::new();
            assn.set(&vars[0], x);
            assn.set(&vars[1], y);

            assert_eq!(i as f64, f.value(&assn).expect("unexpected error"));
        }

        // verify behavior on full assignment with out of scope values
        let v3 = Variable::binary();

        for (i, (x, y)) in (0..2).zip(0..2).enumerate() {
            let mut assn = Assignment::new();
            assn.set(&vars[0], x);
            assn.set(&vars[1], y);
            assn.set(&v3, 0);

            assert_eq!(i as f64, f.value(&assn).expect("unexpected error"));
        }

        // verify behavior on incomplete assignment
        let mut assn = Assignment::new();
        assn.set(&vars[0], 0);
        assn.set(&v3, 0);

        let res = f.value(&assn);
        assert!(res.is_err());
        match res.expect_err("") {
            ThicketError::IncompleteAssignment => assert!(true),
            _ => panic!("incorrect error")
        };
    }

    #[test]
    /// Example taken from Koller & Friedman Figure 4.3
    fn product() {
        let a = Variable::discrete(3);
        let b = Variable::binary();
        let c = Variable::binary();

        let tbl1 = nd::Array::from_shape_vec(
            (3, 2),
            vec![ 0.5, 0.8, 0.1, 0., 0.3, 0.9 ]
        ).expect("Unexpected error").into_dyn();
        let phi1 = Factor::new(vec![ a, b ], tbl1).expect("Unexpected error");

        let tbl2 = nd::Array::from_shape_vec(
            (2, 2),
            vec![ 0.5, 0.7, 0.1, 0.2 ]
        ).expect("Unexpected error").into_dyn();
        let phi2 = Factor::new(vec![ b, c ], tbl2).expect("Unexpected error");

        let phi = phi1.product(&phi2).expect("Unexpected error");

        let expected = nd::Array::from_shape_vec(
            (3, 2, 2),
            vec![ 0.25, 0.35, 0.08, 0.16, 0.05, 0.07, 0., 0., 0.15, 0.21, 0.09, 0.18 ]
        ).expect("Unexpected error").into_dyn();

        for (x, y, z) in iproduct!(0..3, 0..2, 0..2) {
            let mut assn = Assignment::new();
            assn.set(&a, x);
            assn.set(&b, y);
            assn.set(&c, z);

            let idx = vec![x, y, z];
            let val = expected[nd::IxDyn(&idx)];

            assert!(
                (val - phi.value(&assn).unwrap()).abs() < std::f64::EPSILON
            );
        }
    }

    #[test]
    fn prod_identity() {
        let a = Variable::discrete(3);
        let b = Variable::binary();

        let tbl1 = nd::Array::from_shape_vec(
            (3, 2),
            vec![ 0.5, 0.8, 0.1, 0., 0.3, 0.9 ]
        ).expect("Unexpected error").into_dyn();
        let phi1 = Factor::new(vec![ a, b ], tbl1.clone()).expect("Unexpected error");

        let phi2 = Factor::identity();
        let phi = phi1.product(&phi2).expect("Unexpected error");

        assert_eq!(phi1.scope(), phi.scope());

        for (x, y) in iproduct!(0..3, 0..2) {
            let mut assn = Assignment::new();
            assn.set(&a, x);
            assn.set(&b, y);

            let idx = vec![x, y];
            let val = tbl1[nd::IxDyn(&idx)];
            assert!(
                (val - phi.value(&assn).unwrap()).abs() < std::f64::EPSILON
            );
        }
    }

    #[test]
    /// Disjoint scopes give the outer product; a scalar operand scales the other side
    fn prod_disjoint_and_scalar() {
        let a = Variable::binary();
        let b = Variable::binary();

        let phi1 = Factor::new(vec![ a ], array![ 1., 2. ].into_dyn()).unwrap();
        let phi2 = Factor::new(vec![ b ], array![ 3., 4. ].into_dyn()).unwrap();

        let phi = phi1.product(&phi2).expect("Unexpected error");
        assert_eq!(vec![ a, b ], phi.scope());

        for (x, y) in iproduct!(0..2, 0..2) {
            let mut assn = Assignment::new();
            assn.set(&a, x);
            assn.set(&b, y);

            let expected = (1. + x as f64) * (3. + y as f64);
            assert!(
                (expected - phi.value(&assn).unwrap()).abs() < std::f64::EPSILON
            );
        }

        let scaled = phi1.product(&Factor::scalar(10.)).unwrap();
        assert_eq!(vec![ a ], scaled.scope());

        let mut assn = Assignment::new();
        assn.set(&a, 1);
        assert!(
            (20. - scaled.value(&assn).unwrap()).abs() < std::f64::EPSILON
        );
    }

    #[test]
    fn product_all() {
        let a = Variable::binary();
        let b = Variable::binary();
        let c = Variable::binary();

        let phi1 = Factor::new(vec![ a, b ], array![[ 1., 2. ], [ 3., 4. ]].into_dyn()).unwrap();
        let phi2 = Factor::new(vec![ b, c ], array![[ 1., 0. ], [ 0., 1. ]].into_dyn()).unwrap();
        let phi3 = Factor::scalar(2.);

        let phi = Factor::identity().product_all(vec![ &phi1, &phi2, &phi3 ]).unwrap();

        let mut assn = Assignment::new();
        assn.set(&a, 1);
        assn.set(&b, 1);
        assn.set(&c, 1);

        assert!(
            (8. - phi.value(&assn).unwrap()).abs() < std::f64::EPSILON
        );
    }

    #[test]
    /// Example taken from Koller & Friedman Figure 4.5
    fn reduce_simple() {
        let a = Variable::discrete(3);
        let b = Variable::binary();
        let c = Variable::binary();

        let table = nd::Array::from_shape_vec(
            (3, 2, 2),
            vec![ 0.25, 0.35, 0.08, 0.16, 0.05, 0.07, 0., 0., 0.15, 0.21, 0.09, 0.18 ]
        ).expect("Unexpected error").into_dyn();

        let phi = Factor::new(vec![a, b, c], table).expect("Unexpected error");

        let mut assn = Assignment::new();
        assn.set(&c, 0);

        let expected = nd::Array::from_shape_vec(
            (3, 2),
            vec![ 0.25, 0.08, 0.05, 0., 0.15, 0.09 ]
        ).expect("Unexpected error").into_dyn();

        let reduced = phi.reduce(&assn);
        assert_eq!(vec![a, b], reduced.scope());
        for (x, y) in (0..3).zip(0..2) {
            let mut assn = Assignment::new();
            assn.set(&a, x);
            assn.set(&b, y);

            let idx = [x, y];
            assert_eq!(expected[nd::IxDyn(&idx)], reduced.value(&assn).expect("unexpected error"));
        }
    }

    #[test]
    fn reduce_empty() {
        let a = Variable::binary();
        let b = Variable::binary();
        let c = Variable::binary();

        let table = array![[ 1., 0. ], [ 0., 1. ]].into_dyn();
        let phi = Factor::new(vec![a, b], table.clone()).expect("Unexpected error");

        let mut assn = Assignment::new();
        assn.set(&c, 1);

        let reduced = phi.reduce(&assn);
        assert_eq!(vec![a, b], reduced.scope());
        for (x, y) in (0..2).zip(0..2) {
            let mut asn = Assignment::new();
            asn.set(&a, x);
            asn.set(&b, y);

            let idx = [x, y];
            assert_eq!(table[nd::IxDyn(&idx)], reduced.value(&asn).expect("Unexpected error"));
        }
    }

    #[test]
    /// A complete assignment reduces to a scalar factor carrying the selected weight
    fn reduce_full() {
        let a = Variable::binary();
        let b = Variable::binary();
        let c = Variable::binary();

        let table = array![[ 1., 0. ], [ 0., 7. ]].into_dyn();
        let phi = Factor::new(vec![a, b], table.clone()).expect("Unexpected error");

        let mut assn = Assignment::new();
        assn.set(&a, 1);
        assn.set(&b, 1);
        assn.set(&c, 1);

        let reduced = phi.reduce(&assn);
        assert!(reduced.is_scalar());
        assert_eq!(7., reduced.scalar_weight().unwrap());
    }

    #[test]
    fn reduce_multiple() {
        let a = Variable::discrete(3);
        let b = Variable::binary();
        let c = Variable::binary();

        let table = nd::Array::from_shape_vec(
            (3, 2, 2),
            vec![ 0.25, 0.35, 0.08, 0.16, 0.05, 0.07, 0., 0., 0.15, 0.21, 0.09, 0.18 ]
        ).expect("Unexpected error").into_dyn();

        let phi = Factor::new(vec![a, b, c], table).expect("Unexpected error");

        let mut assn = Assignment::new();
        assn.set(&c, 0);
        assn.set(&a, 2);

        let expected = array![0.15, 0.09].into_dyn();

        let reduced = phi.reduce(&assn);
        assert_eq!(vec![b], reduced.scope());
        for x in 0..2 {
            let mut assn = Assignment::new();
            assn.set(&b, x);

            let idx = [x];
            assert_eq!(expected[nd::IxDyn(&idx)], reduced.value(&assn).expect("unexpected error"));
        }
    }

    #[test]
    /// Reducing a non-trailing variable drops its axis entirely; the result's table
    /// dimensionality matches its scope and stays usable downstream
    fn reduce_middle_variable() {
        let a = Variable::discrete(3);
        let b = Variable::binary();
        let c = Variable::binary();

        let table = nd::Array::from_shape_vec(
            (3, 2, 2),
            vec![ 0.25, 0.35, 0.08, 0.16, 0.05, 0.07, 0., 0., 0.15, 0.21, 0.09, 0.18 ]
        ).expect("Unexpected error").into_dyn();

        let phi = Factor::new(vec![a, b, c], table.clone()).expect("Unexpected error");

        let mut assn = Assignment::new();
        assn.set(&b, 1);

        let reduced = phi.reduce(&assn);
        assert_eq!(vec![a, c], reduced.scope());

        for (x, y) in iproduct!(0..3, 0..2) {
            let mut assn = Assignment::new();
            assn.set(&a, x);
            assn.set(&c, y);

            let idx = [x, 1, y];
            assert_eq!(table[nd::IxDyn(&idx)], reduced.value(&assn).expect("unexpected error"));
        }

        // the reduced factor participates in products without shape mismatches
        let other = Factor::new(vec![c], array![ 1., 2. ].into_dyn()).unwrap();
        let product = reduced.product(&other).unwrap();

        let mut assn = Assignment::new();
        assn.set(&a, 2);
        assn.set(&c, 1);
        assert!(
            (0.36 - product.value(&assn).unwrap()).abs() < std::f64::EPSILON
        );
    }

    #[test]
    /// Example taken from Koller & Friedman Figure 9.7
    fn marginalize() {
        let a = Variable::discrete(3);
        let b = Variable::binary();
        let c = Variable::binary();

        let table = nd::Array::from_shape_vec(
            (3, 2, 2),
            vec![ 0.25, 0.35, 0.08, 0.16, 0.05, 0.07, 0., 0., 0.15, 0.21, 0.09, 0.18 ]
        ).expect("Unexpected error").into_dyn();

        let phi = Factor::new(vec![a, b, c], table).expect("Unexpected error");

        let marginalized = phi.marginalize(&[b]);
        assert_eq!(vec![a, c], marginalized.scope());

        let expected = array![[0.33, 0.51], [0.05, 0.07], [0.24, 0.39]].into_dyn();
        for (x, y) in (0..3).zip(0..2) {
            let mut assn = Assignment::new();
            assn.set(&a, x);
            assn.set(&c, y);

            let idx = [ x, y ];
            let val = expected[nd::IxDyn(&idx)];
            assert!(
                (val - marginalized.value(&assn).unwrap()).abs() < std::f64::EPSILON
            );
        }
    }

    #[test]
    /// Marginalizing out the entire scope yields the total weight as a scalar factor
    fn marginalize_to_scalar() {
        let a = Variable::binary();
        let b = Variable::binary();

        let phi = Factor::new(vec![a, b], array![[ 1., 2. ], [ 3., 4. ]].into_dyn()).unwrap();

        let z = phi.marginalize(&[a, b]);
        assert!(z.is_scalar());
        assert!(
            (10. - z.scalar_weight().unwrap()).abs() < std::f64::EPSILON
        );
    }

    #[test]
    fn max_marginalize() {
        let a = Variable::binary();
        let b = Variable::binary();

        let phi = Factor::new(vec![a, b], array![[ 1., 2. ], [ 3., 4. ]].into_dyn()).unwrap();

        let m = phi.max_marginalize(&[b]);
        assert_eq!(vec![a], m.scope());

        let mut assn = Assignment::new();
        assn.set(&a, 0);
        assert_eq!(2., m.value(&assn).unwrap());

        let mut assn = Assignment::new();
        assn.set(&a, 1);
        assert_eq!(4., m.value(&assn).unwrap());

        // out of scope variables are ignored; full elimination yields the max weight
        let best = phi.max_marginalize(&[a, b, Variable::binary()]);
        assert!(best.is_scalar());
        assert_eq!(4., best.scalar_weight().unwrap());
    }

    #[test]
    fn most_likely_assignments() {
        let a = Variable::binary();
        let b = Variable::binary();

        let phi = Factor::new(vec![a, b], array![[ 1., 0. ], [ 3., 2. ]].into_dyn()).unwrap();

        let ranked = phi.most_likely_assignments(10);

        // the zero-weight assignment is never returned
        assert_eq!(3, ranked.len());

        assert_eq!(Some(&1), ranked[0].0.get(&a));
        assert_eq!(Some(&0), ranked[0].0.get(&b));
        assert_eq!(3., ranked[0].1);

        assert_eq!(2., ranked[1].1);
        assert_eq!(1., ranked[2].1);

        let top = phi.most_likely_assignments(1);
        assert_eq!(1, top.len());
        assert_eq!(3., top[0].1);
    }

    #[test]
    fn normalize() {
        let a = Variable::binary();

        let phi = Factor::new(vec![a], array![ 1., 3. ].into_dyn()).unwrap();
        let p = phi.normalize().unwrap();

        let mut assn = Assignment::new();
        assn.set(&a, 1);
        assert!(
            (0.75 - p.value(&assn).unwrap()).abs() < std::f64::EPSILON
        );

        let zero = Factor::new(vec![a], array![ 0., 0. ].into_dyn()).unwrap();
        match zero.normalize().expect_err("missing error") {
            ThicketError::DivideByZero => assert!(true),
            _ => panic!("wrong error type")
        };
    }
}
