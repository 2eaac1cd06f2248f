//! Definition of the variable module
//!
//! A `Variable` represents a discrete random variable in a factor graph, and an `Assignment`
//! represents a (possibly partial) assignment of values to a set of `Variable`s.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering, ATOMIC_USIZE_INIT};

/// Process-global id allocator. Two separately created `Variable`s never share an id, even
/// across threads.
static NEXT_ID: AtomicUsize = ATOMIC_USIZE_INIT;

/// A discrete random variable with a finite domain.
///
/// A `Variable` is an opaque identifier plus a cardinality; it carries no name (names live on the
/// model) and no value (values live in `Assignment`s). `Variable`s are `Copy` and are ordered and
/// hashed by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable {
    id: usize,
    cardinality: usize
}

impl Variable {

    /// Construct a new binary `Variable` - it can take the values `0` and `1`
    pub fn binary() -> Variable {
        Variable::discrete(2)
    }

    /// Construct a new discrete `Variable` with the given number of values. The values are the
    /// integers `0..cardinality`
    pub fn discrete(cardinality: usize) -> Variable {
        assert!(cardinality > 0, "a Variable must have at least one value");
        Variable {
            id: NEXT_ID.fetch_add(1, Ordering::SeqCst),
            cardinality
        }
    }

    /// The opaque identifier of the `Variable`
    pub fn id(&self) -> usize {
        self.id
    }

    /// The number of values the `Variable` can take
    pub fn cardinality(&self) -> usize {
        self.cardinality
    }

}

impl fmt::Display for Variable {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "X{}", self.id)
    }

}


/// A mapping from `Variable`s to values.
///
/// An `Assignment` always covers a well-defined, sorted set of variables (B-tree storage, sorted
/// by variable id). The empty `Assignment` is valid and serves as the "no evidence" value. The
/// set operations (`union`, `intersect`, `without`) are pure and return new `Assignment`s.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    values: BTreeMap<Variable, usize>
}

impl Assignment {

    /// Construct a new, empty `Assignment`
    pub fn new() -> Assignment {
        Assignment { values: BTreeMap::new() }
    }

    /// Set the value of a `Variable` in this `Assignment`, replacing any previous value.
    ///
    /// # Panics
    /// If `val` is not a valid value for `var`
    pub fn set(&mut self, var: &Variable, val: usize) {
        assert!(
            val < var.cardinality(),
            "invalid value ({}) for a Variable with cardinality ({})", val, var.cardinality()
        );
        self.values.insert(*var, val);
    }

    /// Get the value assigned to the given `Variable`, if any
    pub fn get(&self, var: &Variable) -> Option<&usize> {
        self.values.get(var)
    }

    /// Check if the given `Variable` is assigned a value
    pub fn contains(&self, var: &Variable) -> bool {
        self.values.contains_key(var)
    }

    /// The number of `Variable`s assigned a value
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if this `Assignment` assigns no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The `Variable`s assigned a value, in sorted order
    pub fn variables(&self) -> Vec<Variable> {
        self.values.keys().cloned().collect()
    }

    /// Iterate over the `(Variable, value)` pairs in sorted order
    pub fn iter(&self) -> btree_map::Iter<Variable, usize> {
        self.values.iter()
    }

    /// The union of this `Assignment` and another.
    ///
    /// Where both assign a value to the same `Variable`, the value from `other` wins.
    pub fn union(&self, other: &Assignment) -> Assignment {
        let mut values = self.values.clone();
        for (&v, &val) in other.iter() {
            values.insert(v, val);
        }
        Assignment { values }
    }

    /// Restrict this `Assignment` to the given `Variable`s
    pub fn intersect(&self, vars: &[Variable]) -> Assignment {
        let values = self.values
                         .iter()
                         .filter(|&(v, _)| vars.contains(v))
                         .map(|(&v, &val)| (v, val))
                         .collect();
        Assignment { values }
    }

    /// Remove the given `Variable`s from this `Assignment`
    pub fn without(&self, vars: &[Variable]) -> Assignment {
        let values = self.values
                         .iter()
                         .filter(|&(v, _)| ! vars.contains(v))
                         .map(|(&v, &val)| (v, val))
                         .collect();
        Assignment { values }
    }

}


/// Iterate over every complete `Assignment` to the given scope.
///
/// Assignments are yielded in row-major order (the last `Variable` in the scope varies fastest),
/// matching the layout of a `Factor`'s table. An empty scope yields exactly one empty
/// `Assignment`.
pub fn all_assignments(scope: &[Variable]) -> AssignmentIter {
    let total = scope.iter().map(|v| v.cardinality()).product();
    AssignmentIter {
        scope: scope.to_vec(),
        next: 0,
        total
    }
}

/// Iterator over all complete `Assignment`s to a scope. See `all_assignments`.
pub struct AssignmentIter {
    scope: Vec<Variable>,
    next: usize,
    total: usize
}

impl Iterator for AssignmentIter {

    type Item = Assignment;

    fn next(&mut self) -> Option<Assignment> {
        if self.next >= self.total {
            return None;
        }

        // unravel the flat index, last variable fastest
        let mut assn = Assignment::new();
        let mut rem = self.next;
        for v in self.scope.iter().rev() {
            assn.set(v, rem % v.cardinality());
            rem /= v.cardinality();
        }

        self.next += 1;
        Some(assn)
    }

}
