//! Named inference rules.

use crate::error::TypeError;
use crate::expr::{BuiltIn, Expr};
use crate::node::Node;
use crate::subst::Substitution;
use crate::theory::{Reference, Theories};
use crate::typing::{Context, TypeComparator};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// The three kinds of inference rules.
#[derive(Debug)]
pub enum RuleKind {
    /// A statement that is always true.
    Tautology(Expr),
    /// Two statements that may replace each other, in either direction.
    Equivalence(Expr, Expr),
    /// Premises that together justify a conclusion.
    Deduction {
        premises: Vec<Expr>,
        conclusion: Expr,
    },
}

/// A named inference schema with parameters.
///
/// Validating a rule application means matching the rule's statement
/// patterns, under the binding derived from the supplied arguments, against
/// the referenced premises and the claimed conclusion.
#[derive(Debug)]
pub struct Rule {
    node: Node,
    params: Vec<Node>,
    kind: RuleKind,
}

impl Rule {
    /// A rule stating that `tautology` always holds.
    pub fn tautology(
        name: impl Into<String>,
        params: Vec<Node>,
        tautology: Expr,
    ) -> Result<Self, TypeError> {
        check_statement(&tautology, "tautology")?;
        Self::make(name, params, RuleKind::Tautology(tautology))
    }

    /// A rule stating that `fst` and `snd` are interchangeable.
    pub fn equivalence(
        name: impl Into<String>,
        params: Vec<Node>,
        fst: Expr,
        snd: Expr,
    ) -> Result<Self, TypeError> {
        check_statement(&fst, "first statement")?;
        check_statement(&snd, "second statement")?;
        Self::make(name, params, RuleKind::Equivalence(fst, snd))
    }

    /// A rule stating that the premises together imply the conclusion.
    pub fn deduction(
        name: impl Into<String>,
        params: Vec<Node>,
        premises: Vec<Expr>,
        conclusion: Expr,
    ) -> Result<Self, TypeError> {
        for (i, premise) in premises.iter().enumerate() {
            check_statement(premise, &format!("premise {}", i + 1))?;
        }
        check_statement(&conclusion, "conclusion")?;
        Self::make(
            name,
            params,
            RuleKind::Deduction {
                premises,
                conclusion,
            },
        )
    }

    fn make(name: impl Into<String>, params: Vec<Node>, kind: RuleKind) -> Result<Self, TypeError> {
        let node = Node::new(name, Expr::builtin(BuiltIn::Rule))?;
        Ok(Self { node, params, kind })
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn name(&self) -> &str {
        self.node.name()
    }

    pub fn params(&self) -> &[Node] {
        &self.params
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    /// Validate the application of the rule.
    ///
    /// `binding` substitutes the rule's parameters, `refs` are the cited
    /// premise statements, and `claimed` is the statement to be justified.
    /// A wrong number of references makes the application invalid, not an
    /// error.
    pub fn validate(
        &self,
        binding: &Context,
        refs: &[Reference],
        claimed: &Expr,
        thys: &Theories,
    ) -> Result<bool, crate::Error> {
        // the matcher restores the binding after every check, so one working
        // copy serves all patterns of this application
        let mut binding = binding.clone();
        match &self.kind {
            RuleKind::Tautology(tautology) => {
                if !refs.is_empty() {
                    return Ok(false);
                }
                let mut subst = Substitution::new(tautology.clone());
                Ok(subst.check(claimed, &mut binding)?)
            }
            RuleKind::Equivalence(fst, snd) => {
                if refs.len() != 1 {
                    return Ok(false);
                }
                let other = match thys.statement_def(refs[0]) {
                    Some(def) => def.clone(),
                    None => return Ok(false),
                };
                let mut fst = Substitution::new(fst.clone());
                let mut snd = Substitution::new(snd.clone());
                // the rule is symmetric; try both directions
                let fwd = fst.check(&other, &mut binding)?
                    && snd.check(claimed, &mut binding)?;
                if fwd {
                    return Ok(true);
                }
                Ok(fst.check(claimed, &mut binding)?
                    && snd.check(&other, &mut binding)?)
            }
            RuleKind::Deduction {
                premises,
                conclusion,
            } => {
                if refs.len() != premises.len() {
                    return Ok(false);
                }
                for (premise, r) in premises.iter().zip(refs) {
                    let cited = match thys.statement_def(*r) {
                        Some(def) => def.clone(),
                        None => return Ok(false),
                    };
                    let mut subst = Substitution::new(premise.clone());
                    if !subst.check(&cited, &mut binding)? {
                        return Ok(false);
                    }
                }
                let mut subst = Substitution::new(conclusion.clone());
                Ok(subst.check(claimed, &mut binding)?)
            }
        }
    }
}

fn check_statement(e: &Expr, at: &str) -> Result<(), TypeError> {
    let stmt = Expr::builtin(BuiltIn::Statement);
    let got = e.typ();
    if TypeComparator::new().eq(&got, &stmt) {
        Ok(())
    } else {
        Err(TypeError::mismatch_at(got, stmt, at.to_string()))
    }
}
