//! Named entities with fast copying, hashing and equality checking.

use crate::error::{Error, TheoryError, TypeError};
use crate::expr::{BuiltIn, Expr};
use crate::typing::TypeComparator;
use alloc::rc::Rc;
use alloc::string::String;
use core::cell::OnceCell;
use core::fmt::{self, Display};
use core::hash::{Hash, Hasher};

/// Owned node data: a name, a declared type, and an optional definition.
#[derive(Debug)]
struct Owned {
    name: String,
    ty: Expr,
    def: OnceCell<Expr>,
}

/// Named entity declared in a theory: a constant, variable, predicate,
/// type, or the carrier of a statement or rule.
///
/// Cloning, hashing, and equality checking is performed on the address of a
/// shared pointer, making them constant-time operations. Two nodes with the
/// same name and type are distinct unless one is a clone of the other:
///
/// ~~~
/// # use pruvo::{BuiltIn, Expr, Node};
/// let n1 = Node::new("a", Expr::builtin(BuiltIn::Statement))?;
/// let n2 = Node::new("a", Expr::builtin(BuiltIn::Statement))?;
/// assert_eq!(n1, n1.clone());
/// assert_ne!(n1, n2);
/// # Ok::<_, pruvo::Error>(())
/// ~~~
#[derive(Clone, Debug)]
pub struct Node(Rc<Owned>);

impl Node {
    /// Declare a node. The declared type must itself have type `type`.
    pub fn new(name: impl Into<String>, ty: Expr) -> Result<Self, TypeError> {
        if !ty.is_type() {
            return Err(TypeError::mismatch(ty.typ(), Expr::builtin(BuiltIn::Type)));
        }
        Ok(Self(Rc::new(Owned {
            name: name.into(),
            ty,
            def: OnceCell::new(),
        })))
    }

    /// A sentinel node of type `undefined`, used by parsers to recover.
    pub fn undefined() -> Self {
        Self(Rc::new(Owned {
            name: String::new(),
            ty: Expr::builtin(BuiltIn::Undefined),
            def: OnceCell::new(),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The empty name marks anonymous objects.
    pub fn is_anonymous(&self) -> bool {
        self.0.name.is_empty()
    }

    pub fn ty(&self) -> &Expr {
        &self.0.ty
    }

    pub fn definition(&self) -> Option<&Expr> {
        self.0.def.get()
    }

    /// Set the definition, which must compare equal to the declared type.
    /// The definition can be set at most once.
    pub fn set_definition(&self, def: Expr) -> Result<(), Error> {
        let got = def.typ();
        if !TypeComparator::new().eq(self.ty(), &got) {
            return Err(TypeError::mismatch(got, self.ty().clone()).into());
        }
        self.0
            .def
            .set(def)
            .map_err(|_| TheoryError::Redefinition(self.0.name.clone()).into())
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.addr())
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Node {}

impl Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.name.fmt(f)
    }
}
