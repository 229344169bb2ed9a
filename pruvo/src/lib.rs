#![no_std]
#![forbid(unsafe_code)]

//! Proof checking for a small higher-order logic.
//!
//! This is the library underlying the `prucheck` proof checker.
//!
//! # Usage
//!
//! A document declares types, constants, predicates, axioms, named inference
//! rules, and lemmas with proofs. Declarations become [`Node`]s, their
//! contents are [`Expr`]essions, and everything is collected in insertion
//! order inside a [`Theories`] arena. Verifying a theory means checking, for
//! every [`Statement`] that carries a [`Proof`], that the proof justifies the
//! statement: a [`ProofStep`] names a [`Rule`], supplies an argument for each
//! of the rule's parameters, and cites previously established statements by
//! [`Reference`]; the rule then matches its premise and conclusion patterns
//! under that substitution using [`Substitution`], with type equality decided
//! by [`TypeComparator`].
//!
//! The following example builds the modus ponens rule and uses it to prove a
//! lemma. (This example, just as the other code examples in this library,
//! can be executed by running `cargo test`.)
//!
//! ~~~
//! use std::rc::Rc;
//! use pruvo::{BuiltIn, Conn, Expr, Node, Object, ProofStep, Rule, Statement, Theories};
//! use pruvo::{Proof, Error};
//!
//! // ponens(a: statement, b: statement): [(impl a b), a] |- b
//! let a = Node::new("a", Expr::builtin(BuiltIn::Statement))?;
//! let b = Node::new("b", Expr::builtin(BuiltIn::Statement))?;
//! let ponens = Rc::new(Rule::deduction(
//!     "ponens",
//!     vec![a.clone(), b.clone()],
//!     vec![
//!         Expr::connective(Conn::Impl, Expr::atomic(a.clone()), Expr::atomic(b.clone()))?,
//!         Expr::atomic(a.clone()),
//!     ],
//!     Expr::atomic(b.clone()),
//! )?);
//!
//! // a theory with two axioms and a lemma proven by ponens
//! let mut thys = Theories::new();
//! let root = thys.create(None);
//!
//! let it = Node::new("it", Expr::builtin(BuiltIn::Statement))?;
//! let so = Node::new("so", Expr::builtin(BuiltIn::Statement))?;
//! thys.push(root, Object::Node(it.clone()))?;
//! thys.push(root, Object::Node(so.clone()))?;
//!
//! let implication =
//!     Expr::connective(Conn::Impl, Expr::atomic(it.clone()), Expr::atomic(so.clone()))?;
//! let premise = thys.push(root, Object::Statement(Statement::new("premise", implication)?))?;
//! let fact = thys.push(root, Object::Statement(Statement::new("it_holds", Expr::atomic(it.clone()))?))?;
//!
//! let step = ProofStep::new(
//!     ponens,
//!     vec![Expr::atomic(it), Expr::atomic(so.clone())],
//!     vec![premise, fact],
//! )?;
//! let mut lemma = Statement::new("so_holds", Expr::atomic(so))?;
//! lemma.add_proof(Proof::Step(step));
//! thys.push(root, Object::Statement(lemma))?;
//!
//! assert!(thys.verify(root));
//! # Ok::<_, Error>(())
//! ~~~
//!
//! # Organisation
//!
//! * [`expr`] and [`node`] define the typed abstract syntax tree,
//! * [`typing`] decides equality of type expressions,
//! * [`subst`] matches patterns against target expressions,
//! * [`theory`] keeps objects in scope and resolves references, and
//! * [`rule`] and [`proof`] validate rule applications.
//!
//! Parsing and printing of the S-expression surface syntax live in the
//! `pruvo-parse` crate.

extern crate alloc;
#[macro_use]
extern crate log;

pub mod error;
pub mod expr;
pub mod node;
pub mod proof;
pub mod rule;
pub mod subst;
pub mod theory;
pub mod typing;

pub use error::{Error, ProofError, TheoryError, TypeError};
pub use expr::{BuiltIn, Conn, Expr, ExprC, Lambda, Quant};
pub use node::Node;
pub use proof::{LongProof, Proof, ProofStep, Statement};
pub use rule::{Rule, RuleKind};
pub use subst::Substitution;
pub use theory::{Object, Reference, Theories, Theory, TheoryId};
pub use typing::{Context, TypeComparator};
