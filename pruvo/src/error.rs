//! Common error types.

use crate::Expr;
use alloc::string::String;
use core::fmt::{self, Display};

/// Central error type.
#[derive(Clone, Debug)]
pub enum Error {
    Type(TypeError),
    Theory(TheoryError),
    Proof(ProofError),
}

/// Errors raised when constructing ill-typed expressions or definitions.
#[derive(Clone, Debug)]
pub enum TypeError {
    /// An expression of type `got` appeared where type `want` was required.
    Mismatch {
        got: Expr,
        want: Expr,
        at: Option<String>,
    },
    /// A function-shaped type was required, but `got` is not a lambda type.
    NotALambda { got: Expr },
    /// A lambda call supplied the wrong number of arguments.
    Arity { want: usize, got: usize },
}

impl TypeError {
    pub fn mismatch(got: Expr, want: Expr) -> Self {
        let at = None;
        Self::Mismatch { got, want, at }
    }

    pub fn mismatch_at(got: Expr, want: Expr, at: String) -> Self {
        let at = Some(at);
        Self::Mismatch { got, want, at }
    }
}

/// Errors concerning names and references in theories.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TheoryError {
    /// A named object was added to a theory that already contains the name.
    DuplicateName(String),
    /// Lexical lookup failed in the current theory and all its ancestors.
    NameNotFound(String),
    /// A textual reference could not be resolved.
    BadReference(String),
    /// A node definition was set twice.
    Redefinition(String),
}

/// Errors raised when building or checking proof steps.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProofError {
    /// A proof step supplied the wrong number of arguments for its rule.
    ArityMismatch { want: usize, got: usize },
    /// A lambda-call pattern whose callee is bound to a non-lambda.
    UnsupportedReduction,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Type(e) => e.fmt(f),
            Self::Theory(e) => e.fmt(f),
            Self::Proof(e) => e.fmt(f),
        }
    }
}

impl Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Mismatch { got, want, at } => {
                match at {
                    Some(at) => write!(f, "type mismatch in {}: ", at)?,
                    None => write!(f, "type mismatch: ")?,
                }
                write!(f, "got {}, want {}", got, want)
            }
            Self::NotALambda { got } => write!(f, "expected a lambda type, got {}", got),
            Self::Arity { want, got } => {
                write!(f, "expected {} arguments, got {}", want, got)
            }
        }
    }
}

impl Display for TheoryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::DuplicateName(name) => write!(f, "duplicate name {}", name),
            Self::NameNotFound(name) => write!(f, "undeclared identifier {}", name),
            Self::BadReference(desc) => write!(f, "invalid reference {}", desc),
            Self::Redefinition(name) => write!(f, "redefinition of {}", name),
        }
    }
}

impl Display for ProofError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ArityMismatch { want, got } => {
                write!(f, "rule takes {} arguments, step supplies {}", want, got)
            }
            Self::UnsupportedReduction => write!(f, "unsupported reduction of a lambda call"),
        }
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Self::Type(err)
    }
}

impl From<TheoryError> for Error {
    fn from(err: TheoryError) -> Self {
        Self::Theory(err)
    }
}

impl From<ProofError> for Error {
    fn from(err: ProofError) -> Self {
        Self::Proof(err)
    }
}
