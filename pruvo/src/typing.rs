//! Structural equality of type expressions.

use crate::expr::{BuiltIn, Expr, ExprC};
use crate::node::Node;
use fnv::FnvHashMap;

/// Mapping from nodes to the expressions that stand in for them.
///
/// This is how the parameters of a rule become equal to the expressions a
/// caller supplies.
pub type Context = FnvHashMap<Node, Expr>;

/// Canonical serialisation token for a type expression.
///
/// The `Open`/`Close` brackets and the builtin discriminators are distinct
/// from every node identity by construction.
#[derive(Clone, Debug, Eq, PartialEq)]
enum Token {
    Open,
    Close,
    Builtin(BuiltIn),
    Node(usize),
    Opaque(usize),
}

/// Decides equality of type expressions modulo alpha-equivalence and
/// definition unfolding.
///
/// Each side is serialised to a token stream; two types are equal iff the
/// streams match exactly. Bound positions are identified structurally, not
/// by parameter names, and atomic references are resolved through the
/// optional [`Context`] first and through type-synonym definitions second.
pub struct TypeComparator<'c> {
    context: Option<&'c Context>,
}

impl TypeComparator<'static> {
    pub fn new() -> Self {
        Self { context: None }
    }
}

impl Default for TypeComparator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'c> TypeComparator<'c> {
    pub fn with_context(context: &'c Context) -> Self {
        Self {
            context: Some(context),
        }
    }

    /// Are the two types equal?
    ///
    /// Both arguments must be types; comparing anything else is a logic
    /// error in the caller.
    pub fn eq(&self, a: &Expr, b: &Expr) -> bool {
        assert!(
            a.is_type() && b.is_type(),
            "trying to compare non-types in TypeComparator"
        );

        // if the pointers agree, the types must be equal
        if a.ptr_eq(b) {
            return true;
        }

        let mut da = alloc::vec::Vec::new();
        let mut db = alloc::vec::Vec::new();
        self.describe(a, &mut da);
        self.describe(b, &mut db);
        trace!("type_eq: {} ~? {}", a, b);
        da == db
    }

    fn describe(&self, e: &Expr, out: &mut alloc::vec::Vec<Token>) {
        match &**e {
            ExprC::Builtin(b) => out.push(Token::Builtin(*b)),
            ExprC::LambdaType { ret, args } => {
                out.push(Token::Open);
                self.describe(ret, out);
                args.iter().for_each(|arg| self.describe(arg, out));
                out.push(Token::Close);
            }
            ExprC::Atomic(node) => {
                if let Some(sub) = self.context.and_then(|ctx| ctx.get(node)) {
                    self.describe(sub, out)
                } else if let Some(def) = node.definition() {
                    // type synonym
                    self.describe(def, out)
                } else {
                    out.push(Token::Node(node.addr()))
                }
            }
            // not reachable from well-formed types; identity decides
            _ => out.push(Token::Opaque(e.addr())),
        }
    }
}
