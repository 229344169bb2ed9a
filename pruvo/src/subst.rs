//! Pattern matching with substitution.
//!
//! [`Substitution`] decides whether a pattern expression, under a binding of
//! its parameter nodes, is structurally equal to a target expression. The
//! walk maintains two parallel stacks: the comparison stack carries the
//! pattern sub-expression compared against the current target sub-expression,
//! and the scope stack records which bindings a push introduced, so that a
//! pop restores the binding exactly. Pushing performs one step of lazy
//! beta-reduction, so substituted expressions are never materialised.

use crate::error::ProofError;
use crate::expr::{Expr, ExprC};
use crate::node::Node;
use crate::typing::{Context, TypeComparator};
use alloc::vec::Vec;

/// Scope stack entry.
enum Frame {
    /// A comparison stack entry without new bindings.
    Mark,
    /// Bindings introduced below the next mark, with the values they
    /// displaced.
    Scope(Vec<(Node, Option<Expr>)>),
}

/// Checks whether a pattern, under a given binding, matches a target.
///
/// The matcher is directional: it does not search for a binding, it is given
/// one and checks that it is consistent. Unmapped atomic references in the
/// pattern must equal themselves in the target.
pub struct Substitution {
    expr: Expr,
    stack: Vec<Expr>,
    scopes: Vec<Frame>,
    offender: Option<(Expr, Expr)>,
}

impl Substitution {
    /// Prepare to match against the given pattern.
    pub fn new(expr: Expr) -> Self {
        Self {
            expr,
            stack: Vec::new(),
            scopes: Vec::new(),
            offender: None,
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Does substituting bound expressions for parameters in the pattern
    /// give the target expression?
    ///
    /// The binding is extended and shrunk during the walk but is restored to
    /// its pre-call state before returning, also on mismatch and on error.
    pub fn check(&mut self, target: &Expr, binding: &mut Context) -> Result<bool, ProofError> {
        self.offender = None;
        self.stack.clear();
        self.scopes.clear();

        let expr = self.expr.clone();
        let res = self
            .push(expr, binding)
            .and_then(|()| self.visit(target, binding));
        match res {
            Ok(ok) => {
                self.pop(binding);
                Ok(ok)
            }
            Err(err) => {
                self.unwind(binding);
                Err(err)
            }
        }
    }

    /// The first mismatching pattern/target pair of the last `check`.
    pub fn mismatch(&self) -> Option<&(Expr, Expr)> {
        self.offender.as_ref()
    }

    /// Compare the top of the comparison stack with the target.
    fn visit(&mut self, target: &Expr, binding: &mut Context) -> Result<bool, ProofError> {
        let top = match self.stack.last() {
            Some(top) => top.clone(),
            None => return Ok(false),
        };
        trace!("match: {} ~? {}", top, target);

        match (&*top, &**target) {
            (ExprC::Atomic(p), ExprC::Atomic(t)) if p == t => Ok(true),
            (
                ExprC::LambdaCall {
                    node: pn,
                    args: pa,
                },
                ExprC::LambdaCall {
                    node: tn,
                    args: ta,
                },
            ) if pn == tn && pa.len() == ta.len() => {
                for (p, t) in pa.iter().zip(ta) {
                    if !self.recurse(p.clone(), t, binding)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (ExprC::Negation(p), ExprC::Negation(t)) => self.recurse(p.clone(), t, binding),
            (ExprC::Connective(pc, p1, p2), ExprC::Connective(tc, t1, t2)) if pc == tc => {
                let (p1, p2) = (p1.clone(), p2.clone());
                Ok(self.recurse(p1, t1, binding)? && self.recurse(p2, t2, binding)?)
            }
            (ExprC::Quantifier(pq, pp), ExprC::Quantifier(tq, tp)) if pq == tq => {
                self.recurse(pp.clone(), tp, binding)
            }
            (ExprC::Lambda(pl), ExprC::Lambda(tl)) => {
                // the signatures must agree under the current binding
                if !TypeComparator::with_context(binding).eq(&top.typ(), &target.typ()) {
                    self.report(top.clone(), target);
                    return Ok(false);
                }
                // alpha-equivalence: pair pattern parameters with references
                // to the target parameters
                let mut displaced = Vec::with_capacity(pl.params.len());
                for (p, t) in pl.params.iter().zip(&tl.params) {
                    let sub = Expr::atomic(t.clone());
                    displaced.push((p.clone(), binding.insert(p.clone(), sub)));
                }
                self.scopes.push(Frame::Scope(displaced));
                self.recurse(pl.body.clone(), &tl.body, binding)
            }
            (ExprC::Builtin(_), ExprC::Builtin(_))
            | (ExprC::LambdaType { .. }, ExprC::LambdaType { .. }) => {
                Ok(TypeComparator::with_context(binding).eq(&top, target))
            }
            _ => {
                self.report(top.clone(), target);
                Ok(false)
            }
        }
    }

    fn recurse(&mut self, p: Expr, t: &Expr, binding: &mut Context) -> Result<bool, ProofError> {
        self.push(p, binding)?;
        let ok = self.visit(t, binding)?;
        self.pop(binding);
        Ok(ok)
    }

    /// Push a pattern expression, performing one step of lazy reduction.
    fn push(&mut self, expr: Expr, binding: &mut Context) -> Result<(), ProofError> {
        match &*expr {
            // for atomics, when we can: resolve
            ExprC::Atomic(node) => {
                if let Some(sub) = binding.get(node) {
                    let sub = sub.clone();
                    self.scopes.push(Frame::Mark);
                    self.stack.push(sub);
                    return Ok(());
                }
            }
            ExprC::LambdaCall { node, args } => {
                if let Some(def) = binding.get(node).cloned() {
                    let lambda = match &*def {
                        ExprC::Lambda(lambda) => lambda,
                        _ => return Err(ProofError::UnsupportedReduction),
                    };
                    // bind the parameters to the call arguments and push the
                    // body in their scope
                    let mut displaced = Vec::with_capacity(lambda.params.len());
                    for (param, arg) in lambda.params.iter().zip(args) {
                        let arg = shortcut(arg, binding);
                        displaced.push((param.clone(), binding.insert(param.clone(), arg)));
                    }
                    self.scopes.push(Frame::Scope(displaced));
                    return self.push(lambda.body.clone(), binding);
                }
            }
            _ => (),
        }

        // nothing to substitute: push the expression as-is
        self.scopes.push(Frame::Mark);
        self.stack.push(expr);
        Ok(())
    }

    /// Pop a comparison stack entry and tear down the scopes it introduced.
    fn pop(&mut self, binding: &mut Context) {
        let mark = self.scopes.pop();
        debug_assert!(matches!(mark, Some(Frame::Mark)));
        while matches!(self.scopes.last(), Some(Frame::Scope(_))) {
            if let Some(Frame::Scope(displaced)) = self.scopes.pop() {
                restore(displaced, binding);
            }
        }
        self.stack.pop();
    }

    /// Tear down all remaining frames, restoring the binding.
    fn unwind(&mut self, binding: &mut Context) {
        while let Some(frame) = self.scopes.pop() {
            if let Frame::Scope(displaced) = frame {
                restore(displaced, binding);
            }
        }
        self.stack.clear();
    }

    /// Record the first mismatching pair.
    fn report(&mut self, p: Expr, t: &Expr) {
        if self.offender.is_none() {
            self.offender = Some((p, t.clone()));
        }
    }
}

/// Resolve an atomic argument through the binding at bind time.
fn shortcut(arg: &Expr, binding: &Context) -> Expr {
    if let ExprC::Atomic(node) = &**arg {
        if let Some(sub) = binding.get(node) {
            return sub.clone();
        }
    }
    arg.clone()
}

fn restore(displaced: Vec<(Node, Option<Expr>)>, binding: &mut Context) {
    for (node, prev) in displaced.into_iter().rev() {
        match prev {
            Some(expr) => binding.insert(node, expr),
            None => binding.remove(&node),
        };
    }
}
