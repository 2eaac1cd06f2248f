//! Defines the `Error` type for the thicket library

use std::error::Error;
use std::fmt;
use std::result;

pub type Result<T> = result::Result<T, ThicketError>;

#[derive(Clone, Debug)]
pub enum ThicketError {

    /// Represents an incomplete assignment where a complete assignment was required.
    IncompleteAssignment,

    /// Represents an error where a certain constraint on a scope was not satisfied
    InvalidScope,

    /// Exactly what it sounds like
    DivideByZero,

    /// Represents a variable that was present multiple times in a situation where it should only
    /// have been present once
    DuplicateVariable,

    /// Represents an attempt to initialize a factor with an incompatible Initialization
    InvalidInitialization,

    /// Represents a situation in which there was a negative weight provided
    NonPositiveWeight,

    /// Conditioning or decoding reached a configuration with no positive-weight outcome. This
    /// signals an inconsistent model/evidence combination; it is propagated directly to the
    /// caller and never retried internally.
    ZeroProbability,

    /// An operation the queried engine or result view does not support. Raised immediately and
    /// explicitly rather than returning a degraded answer.
    Unsupported(String),

    /// A general error with the given description
    General(String)

}

impl Error for ThicketError {

    fn description(&self) -> &str {
        match self {
            &ThicketError::IncompleteAssignment => "Missing assignments to the required Variables",
            &ThicketError::InvalidScope => "Provided scope did not satisfy constraints",
            &ThicketError::DivideByZero => "Encountered division by zero",
            &ThicketError::DuplicateVariable => "A variable was encountered twice",
            &ThicketError::InvalidInitialization => "An invalid initialization was provided",
            &ThicketError::NonPositiveWeight => "Encountered a negative weight",
            &ThicketError::ZeroProbability => "Reached a configuration with zero probability",
            &ThicketError::Unsupported(ref err) => err.as_str(),
            &ThicketError::General(ref err) => err.as_str()
        }
    }

    fn cause(&self) -> Option<&Error> {
        None
    }

}

impl fmt::Display for ThicketError {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.description())
    }

}
