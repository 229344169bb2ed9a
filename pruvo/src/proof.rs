//! Statements and the proofs that justify them.

use crate::error::{Error, ProofError, TypeError};
use crate::expr::{BuiltIn, Expr};
use crate::node::Node;
use crate::rule::Rule;
use crate::subst::Substitution;
use crate::theory::{Reference, Theories, TheoryId};
use crate::typing::{Context, TypeComparator};
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

/// A named or anonymous statement: an axiom, or a lemma with a proof.
#[derive(Debug)]
pub struct Statement {
    node: Node,
    expr: Expr,
    proof: Option<Proof>,
}

impl Statement {
    /// Declare a statement with the given content, which must have type
    /// `statement`.
    pub fn new(name: impl Into<String>, expr: Expr) -> Result<Self, Error> {
        let node = Node::new(name, Expr::builtin(BuiltIn::Statement))?;
        node.set_definition(expr.clone())?;
        Ok(Self {
            node,
            expr,
            proof: None,
        })
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// The content of the statement.
    pub fn definition(&self) -> &Expr {
        &self.expr
    }

    pub fn has_proof(&self) -> bool {
        self.proof.is_some()
    }

    pub fn proof(&self) -> Option<&Proof> {
        self.proof.as_ref()
    }

    pub fn add_proof(&mut self, proof: Proof) {
        self.proof = Some(proof);
    }
}

/// A proof of a statement.
#[derive(Debug)]
pub enum Proof {
    /// A single application of a rule.
    Step(ProofStep),
    /// An inline sub-theory whose last statement establishes the claim.
    Long(LongProof),
    /// Recorded by the parser when a claimed proof could not be built;
    /// proves nothing, so the statement fails verification.
    Invalid,
}

impl Proof {
    /// Does the proof prove the statement?
    pub fn proves(&self, statement: &Statement, thys: &Theories) -> Result<bool, Error> {
        match self {
            Self::Step(step) => step.proves(statement, thys),
            Self::Long(long) => long.proves(statement, thys),
            Self::Invalid => Ok(false),
        }
    }
}

/// An application of a rule: arguments for the rule's parameters and
/// references for its premises.
#[derive(Debug)]
pub struct ProofStep {
    rule: Rc<Rule>,
    args: Vec<Expr>,
    binding: Context,
    refs: Vec<Reference>,
}

impl ProofStep {
    /// Bind the rule's parameters to the given arguments.
    ///
    /// Each argument's type is checked against the corresponding parameter's
    /// declared type, with the binding accumulated so far as the comparison
    /// context, so parameters that reference earlier parameters resolve
    /// correctly.
    pub fn new(rule: Rc<Rule>, args: Vec<Expr>, refs: Vec<Reference>) -> Result<Self, Error> {
        if args.len() != rule.params().len() {
            return Err(ProofError::ArityMismatch {
                want: rule.params().len(),
                got: args.len(),
            }
            .into());
        }

        let mut binding = Context::default();
        for (param, arg) in rule.params().iter().zip(&args) {
            let got = arg.typ();
            if !TypeComparator::with_context(&binding).eq(param.ty(), &got) {
                return Err(TypeError::mismatch_at(
                    got,
                    param.ty().clone(),
                    format!("argument for {}", param.name()),
                )
                .into());
            }
            binding.insert(param.clone(), arg.clone());
        }

        Ok(Self {
            rule,
            args,
            binding,
            refs,
        })
    }

    pub fn rule(&self) -> &Rc<Rule> {
        &self.rule
    }

    pub fn args(&self) -> &[Expr] {
        &self.args
    }

    pub fn refs(&self) -> &[Reference] {
        &self.refs
    }

    /// The expression substituted for a rule parameter.
    pub fn substitute(&self, param: &Node) -> Option<&Expr> {
        self.binding.get(param)
    }

    fn proves(&self, statement: &Statement, thys: &Theories) -> Result<bool, Error> {
        self.rule
            .validate(&self.binding, &self.refs, statement.definition(), thys)
    }
}

/// A proof carried out in an inline sub-theory.
#[derive(Debug)]
pub struct LongProof {
    theory: TheoryId,
}

impl LongProof {
    pub fn new(theory: TheoryId) -> Self {
        Self { theory }
    }

    pub fn theory(&self) -> TheoryId {
        self.theory
    }

    /// The sub-theory must verify, and its last object must be a statement
    /// whose definition structurally equals the claim.
    fn proves(&self, statement: &Statement, thys: &Theories) -> Result<bool, Error> {
        if !thys.verify(self.theory) {
            return Ok(false);
        }
        let last = match thys.theory(self.theory).objects().last() {
            Some(crate::theory::Object::Statement(last)) => last,
            _ => return Ok(false),
        };
        let mut binding = Context::default();
        let mut subst = Substitution::new(last.definition().clone());
        Ok(subst.check(statement.definition(), &mut binding)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Conn;
    use crate::theory::Object;

    fn ty(name: &str) -> Node {
        Node::new(name, Expr::builtin(BuiltIn::Type)).unwrap()
    }

    /// The working example: persons, two predicates, fritz, and the
    /// implication axiom.
    struct World {
        thys: Theories,
        root: TheoryId,
        rules: TheoryId,
        ponens: Rc<Rule>,
        student_fritz: Expr,
        stupid_fritz: Expr,
        impl_ref: Reference,
        student_ref: Reference,
    }

    impl World {
        fn new() -> Self {
            let person = ty("person");
            let pred_ty = || {
                Expr::lambda_type(
                    Expr::builtin(BuiltIn::Statement),
                    [Expr::atomic(person.clone())].into_iter().collect(),
                )
                .unwrap()
            };
            let student = Node::new("student?", pred_ty()).unwrap();
            let stupid = Node::new("stupid?", pred_ty()).unwrap();
            let fritz = Node::new("fritz", Expr::atomic(person.clone())).unwrap();

            let call = |pred: &Node, arg: &Node| {
                Expr::call(
                    pred.clone(),
                    [Expr::atomic(arg.clone())].into_iter().collect(),
                )
                .unwrap()
            };
            let student_fritz = call(&student, &fritz);
            let stupid_fritz = call(&stupid, &fritz);

            let a = Node::new("a", Expr::builtin(BuiltIn::Statement)).unwrap();
            let b = Node::new("b", Expr::builtin(BuiltIn::Statement)).unwrap();
            let ponens = Rule::deduction(
                "ponens",
                [a.clone(), b.clone()].into_iter().collect(),
                [
                    Expr::connective(Conn::Impl, Expr::atomic(a.clone()), Expr::atomic(b.clone()))
                        .unwrap(),
                    Expr::atomic(a),
                ]
                .into_iter()
                .collect(),
                Expr::atomic(b),
            )
            .unwrap();

            let mut thys = Theories::new();
            let rules = thys.create(None);
            let ponens = Rc::new(ponens);
            thys.push(rules, Object::Rule(ponens.clone())).unwrap();

            let root = thys.create(None);
            for node in [person, student, stupid, fritz] {
                thys.push(root, Object::Node(node)).unwrap();
            }
            let implication = Expr::connective(
                Conn::Impl,
                student_fritz.clone(),
                stupid_fritz.clone(),
            )
            .unwrap();
            let impl_ref = thys
                .push(
                    root,
                    Object::Statement(Statement::new("fritz_consequence", implication).unwrap()),
                )
                .unwrap();
            let student_ref = thys
                .push(
                    root,
                    Object::Statement(
                        Statement::new("fritz_is_student", student_fritz.clone()).unwrap(),
                    ),
                )
                .unwrap();

            Self {
                thys,
                root,
                rules,
                ponens,
                student_fritz,
                stupid_fritz,
                impl_ref,
                student_ref,
            }
        }
    }

    #[test]
    fn modus_ponens_verifies() {
        let mut w = World::new();
        let step = ProofStep::new(
            w.ponens.clone(),
            [w.student_fritz.clone(), w.stupid_fritz.clone()]
                .into_iter()
                .collect(),
            [w.impl_ref, w.student_ref].into_iter().collect(),
        )
        .unwrap();
        let mut lemma = Statement::new("fritz_is_stupid", w.stupid_fritz.clone()).unwrap();
        lemma.add_proof(Proof::Step(step));
        w.thys.push(w.root, Object::Statement(lemma)).unwrap();

        assert!(w.thys.verify(w.root));
        assert!(w.thys.verify(w.rules));
    }

    #[test]
    fn swapped_references_fail() {
        let mut w = World::new();
        let step = ProofStep::new(
            w.ponens.clone(),
            [w.student_fritz.clone(), w.stupid_fritz.clone()]
                .into_iter()
                .collect(),
            // premise order matters
            [w.student_ref, w.impl_ref].into_iter().collect(),
        )
        .unwrap();
        let mut lemma = Statement::new("fritz_is_stupid", w.stupid_fritz.clone()).unwrap();
        lemma.add_proof(Proof::Step(step));
        w.thys.push(w.root, Object::Statement(lemma)).unwrap();

        assert!(!w.thys.verify(w.root));
        assert!(!w.thys.verify_with(w.root, true));
    }

    #[test]
    fn step_arguments_are_type_checked() {
        let w = World::new();
        // the first argument must be a statement, not a person
        let fritz = match w.thys.resolve(w.thys.get(w.root, "fritz").unwrap()) {
            Some(Object::Node(node)) => node.clone(),
            _ => unreachable!(),
        };
        let err = ProofStep::new(
            w.ponens.clone(),
            [Expr::atomic(fritz), w.stupid_fritz.clone()]
                .into_iter()
                .collect(),
            [w.impl_ref, w.student_ref].into_iter().collect(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Type(TypeError::Mismatch { .. })));

        let err = ProofStep::new(w.ponens.clone(), Vec::new(), Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::Proof(ProofError::ArityMismatch { want: 2, got: 0 })
        ));
    }

    #[test]
    fn specialization_instantiates_a_quantifier() {
        // specialization(T: type, P: (T) -> statement, y: T):
        //   premises = [(forall P)], conclusion = (P y)
        let t = ty("T");
        let p = Node::new(
            "P",
            Expr::lambda_type(
                Expr::builtin(BuiltIn::Statement),
                [Expr::atomic(t.clone())].into_iter().collect(),
            )
            .unwrap(),
        )
        .unwrap();
        let y = Node::new("y", Expr::atomic(t.clone())).unwrap();
        let specialization = Rc::new(
            Rule::deduction(
                "specialization",
                [t.clone(), p.clone(), y.clone()].into_iter().collect(),
                [Expr::quantifier(crate::expr::Quant::Forall, Expr::atomic(p.clone())).unwrap()]
                    .into_iter()
                    .collect(),
                Expr::call(p, [Expr::atomic(y)].into_iter().collect()).unwrap(),
            )
            .unwrap(),
        );

        // theory: person, student?, stupid?, fritz, and the axiom
        // (forall (lambda ((person x)) (impl (student? x) (stupid? x))))
        let person = ty("person");
        let pred_ty = || {
            Expr::lambda_type(
                Expr::builtin(BuiltIn::Statement),
                [Expr::atomic(person.clone())].into_iter().collect(),
            )
            .unwrap()
        };
        let student = Node::new("student?", pred_ty()).unwrap();
        let stupid = Node::new("stupid?", pred_ty()).unwrap();
        let fritz = Node::new("fritz", Expr::atomic(person.clone())).unwrap();
        let call = |pred: &Node, arg: &Expr| {
            Expr::call(pred.clone(), [arg.clone()].into_iter().collect()).unwrap()
        };

        let x = Node::new("x", Expr::atomic(person.clone())).unwrap();
        let body = Expr::connective(
            Conn::Impl,
            call(&student, &Expr::atomic(x.clone())),
            call(&stupid, &Expr::atomic(x.clone())),
        )
        .unwrap();
        let pred = Expr::lambda([x].into_iter().collect(), body);
        let axiom_expr =
            Expr::quantifier(crate::expr::Quant::Forall, pred.clone()).unwrap();

        let mut thys = Theories::new();
        let root = thys.create(None);
        thys.push(root, Object::Node(person.clone())).unwrap();
        let axiom_ref = thys
            .push(
                root,
                Object::Statement(Statement::new("all_students_stupid", axiom_expr).unwrap()),
            )
            .unwrap();

        let step = ProofStep::new(
            specialization,
            [Expr::atomic(person), pred, Expr::atomic(fritz.clone())]
                .into_iter()
                .collect(),
            [axiom_ref].into_iter().collect(),
        )
        .unwrap();

        let claim = Expr::connective(
            Conn::Impl,
            call(&student, &Expr::atomic(fritz.clone())),
            call(&stupid, &Expr::atomic(fritz)),
        )
        .unwrap();
        let mut lemma = Statement::new("fritz_consequence", claim).unwrap();
        lemma.add_proof(Proof::Step(step));
        thys.push(root, Object::Statement(lemma)).unwrap();

        assert!(thys.verify(root));
    }

    #[test]
    fn long_proofs_check_their_sub_theory() {
        let mut w = World::new();

        let lemma = Statement::new("fritz_is_stupid", w.stupid_fritz.clone()).unwrap();
        let lemma_ref = w.thys.push(w.root, Object::Statement(lemma)).unwrap();

        let sub = w.thys.create(Some(lemma_ref));
        let step = ProofStep::new(
            w.ponens.clone(),
            [w.student_fritz.clone(), w.stupid_fritz.clone()]
                .into_iter()
                .collect(),
            [w.impl_ref, w.student_ref].into_iter().collect(),
        )
        .unwrap();
        let mut inner = Statement::new("", w.stupid_fritz.clone()).unwrap();
        inner.add_proof(Proof::Step(step));
        w.thys.push(sub, Object::Statement(inner)).unwrap();

        w.thys
            .add_proof(lemma_ref, Proof::Long(LongProof::new(sub)))
            .unwrap();
        assert!(w.thys.verify(w.root));

        // a sub-theory ending in the wrong statement proves nothing
        let mut other = Statement::new("other", w.student_fritz.clone()).unwrap();
        other.add_proof(Proof::Long(LongProof::new(sub)));
        assert!(!Proof::Long(LongProof::new(sub))
            .proves(&other, &w.thys)
            .unwrap());
    }
}
