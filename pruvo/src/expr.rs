//! Expressions of the logic.
//!
//! Every expression carries a type, which is itself an expression whose own
//! type is the constant [`BuiltIn::Type`]. Expressions are immutable after
//! construction and shared by reference counting; the smart constructors on
//! [`Expr`] reject ill-typed combinations.

use crate::error::TypeError;
use crate::node::Node;
use crate::typing::TypeComparator;
use alloc::{rc::Rc, string::ToString, vec::Vec};
use core::cell::OnceCell;
use core::fmt::{self, Display};

/// The built-in type constants.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BuiltIn {
    Type,
    Statement,
    Rule,
    Undefined,
}

impl BuiltIn {
    pub fn name(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Statement => "statement",
            Self::Rule => "rule",
            Self::Undefined => "undefined",
        }
    }
}

/// Binary connective variants.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Conn {
    And,
    Or,
    Impl,
    Equiv,
}

impl Conn {
    pub fn name(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Impl => "impl",
            Self::Equiv => "equiv",
        }
    }
}

/// Quantifier variants.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Quant {
    Forall,
    Exists,
}

impl Quant {
    pub fn name(self) -> &'static str {
        match self {
            Self::Forall => "forall",
            Self::Exists => "exists",
        }
    }
}

/// A lambda abstraction; its type is memoised on first use.
#[derive(Debug)]
pub struct Lambda {
    pub params: Vec<Node>,
    pub body: Expr,
    ty: OnceCell<Expr>,
}

impl Lambda {
    /// The lambda type formed from the parameter types and the body type.
    pub fn typ(&self) -> Expr {
        self.ty
            .get_or_init(|| {
                let args = self.params.iter().map(|p| p.ty().clone()).collect();
                Expr::raw(ExprC::LambdaType {
                    ret: self.body.typ(),
                    args,
                })
            })
            .clone()
    }
}

/// Expression variants.
#[derive(Debug)]
pub enum ExprC {
    /// One of the four built-in type constants.
    Builtin(BuiltIn),
    /// Reference to a declared node.
    Atomic(Node),
    /// Function type: return type and argument types.
    LambdaType { ret: Expr, args: Vec<Expr> },
    /// Application of a lambda node to arguments.
    LambdaCall { node: Node, args: Vec<Expr> },
    /// Lambda abstraction.
    Lambda(Lambda),
    /// Negated statement.
    Negation(Expr),
    /// Binary connective over two statements.
    Connective(Conn, Expr, Expr),
    /// Quantifier over a predicate.
    Quantifier(Quant, Expr),
}

/// Shared immutable expression.
#[derive(Clone, Debug)]
pub struct Expr(Rc<ExprC>);

impl core::ops::Deref for Expr {
    type Target = ExprC;

    fn deref(&self) -> &ExprC {
        &self.0
    }
}

impl Expr {
    fn raw(e: ExprC) -> Self {
        Self(Rc::new(e))
    }

    /// A built-in type constant.
    pub fn builtin(b: BuiltIn) -> Self {
        Self::raw(ExprC::Builtin(b))
    }

    /// Reference to a node.
    pub fn atomic(node: Node) -> Self {
        Self::raw(ExprC::Atomic(node))
    }

    /// Construct a function type; all components must have type `type`.
    pub fn lambda_type(ret: Expr, args: Vec<Expr>) -> Result<Self, TypeError> {
        let tty = Self::builtin(BuiltIn::Type);
        if !ret.is_type() {
            return Err(TypeError::mismatch(ret.typ(), tty));
        }
        for (i, arg) in args.iter().enumerate() {
            if !arg.is_type() {
                let at = format_arg(i);
                return Err(TypeError::mismatch_at(arg.typ(), tty, at));
            }
        }
        Ok(Self::raw(ExprC::LambdaType { ret, args }))
    }

    /// Apply a lambda node to arguments.
    ///
    /// The node's declared type must resolve to a lambda type whose arity and
    /// argument types match the supplied arguments.
    pub fn call(node: Node, args: Vec<Expr>) -> Result<Self, TypeError> {
        let (_, want) = match node.ty().as_lambda_type() {
            Some(sig) => sig,
            None => {
                let got = node.ty().clone();
                return Err(TypeError::NotALambda { got });
            }
        };
        if want.len() != args.len() {
            let (want, got) = (want.len(), args.len());
            return Err(TypeError::Arity { want, got });
        }
        let cmp = TypeComparator::new();
        for (i, (want, arg)) in want.iter().zip(args.iter()).enumerate() {
            let got = arg.typ();
            if !cmp.eq(&got, want) {
                return Err(TypeError::mismatch_at(got, want.clone(), format_arg(i)));
            }
        }
        Ok(Self::raw(ExprC::LambdaCall { node, args }))
    }

    /// Abstract a body over parameter nodes.
    pub fn lambda(params: Vec<Node>, body: Expr) -> Self {
        let ty = OnceCell::new();
        Self::raw(ExprC::Lambda(Lambda { params, body, ty }))
    }

    /// Negate a statement.
    pub fn negation(inner: Expr) -> Result<Self, TypeError> {
        check_statement(&inner)?;
        Ok(Self::raw(ExprC::Negation(inner)))
    }

    /// Connect two statements.
    pub fn connective(conn: Conn, fst: Expr, snd: Expr) -> Result<Self, TypeError> {
        check_statement(&fst)?;
        check_statement(&snd)?;
        Ok(Self::raw(ExprC::Connective(conn, fst, snd)))
    }

    /// Quantify over a predicate, which must return a statement.
    pub fn quantifier(quant: Quant, predicate: Expr) -> Result<Self, TypeError> {
        let pty = predicate.typ();
        let (ret, _) = match pty.as_lambda_type() {
            Some(sig) => sig,
            None => return Err(TypeError::NotALambda { got: pty.clone() }),
        };
        let stmt = Self::builtin(BuiltIn::Statement);
        if !TypeComparator::new().eq(ret, &stmt) {
            let at = "quantified predicate".to_string();
            return Err(TypeError::mismatch_at(ret.clone(), stmt, at));
        }
        Ok(Self::raw(ExprC::Quantifier(quant, predicate)))
    }

    /// The type of this expression. Total on well-formed expressions.
    pub fn typ(&self) -> Expr {
        match &*self.0 {
            ExprC::Builtin(_) | ExprC::LambdaType { .. } => Self::builtin(BuiltIn::Type),
            ExprC::Atomic(node) => node.ty().clone(),
            ExprC::LambdaCall { node, .. } => match node.ty().as_lambda_type() {
                Some((ret, _)) => ret.clone(),
                // ruled out at construction
                None => Self::builtin(BuiltIn::Undefined),
            },
            ExprC::Lambda(lambda) => lambda.typ(),
            ExprC::Negation(_) | ExprC::Connective(..) | ExprC::Quantifier(..) => {
                Self::builtin(BuiltIn::Statement)
            }
        }
    }

    /// Is this expression a type, i.e. is its type the constant `type`?
    pub fn is_type(&self) -> bool {
        matches!(&*self.typ(), ExprC::Builtin(BuiltIn::Type))
    }

    /// Resolve an expression used as a type to its function-type shape,
    /// unfolding type synonyms.
    pub fn as_lambda_type(&self) -> Option<(&Expr, &[Expr])> {
        match &*self.0 {
            ExprC::LambdaType { ret, args } => Some((ret, args)),
            ExprC::Atomic(node) => node.definition()?.as_lambda_type(),
            _ => None,
        }
    }

    /// Pointer equality of the shared representation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the shared representation, usable as an identity token.
    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

fn format_arg(i: usize) -> alloc::string::String {
    use alloc::format;
    format!("argument {}", i + 1)
}

fn check_statement(e: &Expr) -> Result<(), TypeError> {
    let stmt = Expr::builtin(BuiltIn::Statement);
    let got = e.typ();
    if TypeComparator::new().eq(&got, &stmt) {
        Ok(())
    } else {
        Err(TypeError::mismatch(got, stmt))
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &*self.0 {
            ExprC::Builtin(b) => b.name().fmt(f),
            ExprC::Atomic(node) => node.fmt(f),
            ExprC::LambdaType { ret, args } => {
                write!(f, "(lambda-type {} (list", ret)?;
                args.iter().try_for_each(|a| write!(f, " {}", a))?;
                write!(f, "))")
            }
            ExprC::LambdaCall { node, args } => {
                write!(f, "({}", node)?;
                args.iter().try_for_each(|a| write!(f, " {}", a))?;
                write!(f, ")")
            }
            ExprC::Lambda(lambda) => {
                write!(f, "(lambda (list")?;
                for p in &lambda.params {
                    write!(f, " ({} {})", p.ty(), p)?;
                }
                write!(f, ") {})", lambda.body)
            }
            ExprC::Negation(e) => write!(f, "(not {})", e),
            ExprC::Connective(c, fst, snd) => write!(f, "({} {} {})", c.name(), fst, snd),
            ExprC::Quantifier(q, p) => write!(f, "({} {})", q.name(), p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TypeError;

    fn person() -> Node {
        Node::new("person", Expr::builtin(BuiltIn::Type)).unwrap()
    }

    #[test]
    fn call_rejects_wrong_argument_type() {
        let person = person();
        let person_ty = Expr::atomic(person);
        let pred_ty = Expr::lambda_type(
            Expr::builtin(BuiltIn::Statement),
            [person_ty].into_iter().collect(),
        )
        .unwrap();
        let p = Node::new("P", pred_ty).unwrap();
        let a = Node::new("a", Expr::builtin(BuiltIn::Statement)).unwrap();

        let err = Expr::call(p, [Expr::atomic(a)].into_iter().collect()).unwrap_err();
        match err {
            TypeError::Mismatch { got, want, at } => {
                assert!(matches!(&*got, ExprC::Builtin(BuiltIn::Statement)));
                assert!(matches!(&*want, ExprC::Atomic(_)));
                assert_eq!(at.as_deref(), Some("argument 1"));
            }
            err => panic!("unexpected error {:?}", err),
        }
    }

    #[test]
    fn call_with_zero_arguments() {
        let nullary = Expr::lambda_type(Expr::builtin(BuiltIn::Statement), Vec::new()).unwrap();
        let p = Node::new("p", nullary).unwrap();
        assert!(Expr::call(p.clone(), Vec::new()).is_ok());
        let person = person();
        let x = Node::new("x", Expr::atomic(person)).unwrap();
        let err = Expr::call(p, [Expr::atomic(x)].into_iter().collect()).unwrap_err();
        assert!(matches!(err, TypeError::Arity { want: 0, got: 1 }));
    }

    #[test]
    fn call_through_type_synonym() {
        let person = person();
        let pred_ty = Expr::lambda_type(
            Expr::builtin(BuiltIn::Statement),
            [Expr::atomic(person.clone())].into_iter().collect(),
        )
        .unwrap();
        let synonym = Node::new("pred", Expr::builtin(BuiltIn::Type)).unwrap();
        synonym.set_definition(pred_ty).unwrap();
        let p = Node::new("P", Expr::atomic(synonym)).unwrap();
        let x = Node::new("x", Expr::atomic(person)).unwrap();
        assert!(Expr::call(p, [Expr::atomic(x)].into_iter().collect()).is_ok());
    }

    #[test]
    fn quantifier_requires_predicate() {
        let person = person();
        let x = Node::new("x", Expr::atomic(person)).unwrap();
        let err = Expr::quantifier(Quant::Forall, Expr::atomic(x)).unwrap_err();
        assert!(matches!(err, TypeError::NotALambda { .. }));
    }

    #[test]
    fn connective_requires_statements() {
        let a = Node::new("a", Expr::builtin(BuiltIn::Statement)).unwrap();
        let person = person();
        let x = Node::new("x", Expr::atomic(person)).unwrap();
        assert!(Expr::connective(Conn::And, Expr::atomic(a.clone()), Expr::atomic(a)).is_ok());
        let b = Node::new("b", Expr::builtin(BuiltIn::Statement)).unwrap();
        let err = Expr::connective(Conn::Or, Expr::atomic(b), Expr::atomic(x)).unwrap_err();
        assert!(matches!(err, TypeError::Mismatch { .. }));
    }

    #[test]
    fn lambda_type_is_memoised() {
        let person = person();
        let x = Node::new("x", Expr::atomic(person)).unwrap();
        let p = Node::new(
            "p",
            Expr::lambda_type(Expr::builtin(BuiltIn::Statement), Vec::new()).unwrap(),
        )
        .unwrap();
        let body = Expr::call(p, Vec::new()).unwrap();
        let lam = Expr::lambda([x].into_iter().collect(), body);
        assert!(lam.typ().ptr_eq(&lam.typ()));
        assert!(lam.typ().is_type());
    }
}
