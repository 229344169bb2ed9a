//! Theories: ordered, lexically scoped collections of named objects.

use crate::error::TheoryError;
use crate::expr::Expr;
use crate::node::Node;
use crate::proof::{Proof, Statement};
use crate::rule::Rule;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use fnv::FnvHashMap;

/// Stable handle to a theory inside a [`Theories`] arena.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TheoryId(usize);

/// Handle to a specific object slot in a specific theory.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Reference {
    pub theory: TheoryId,
    pub pos: usize,
}

/// Objects a theory can own.
#[derive(Debug)]
pub enum Object {
    Node(Node),
    Statement(Statement),
    Rule(Rc<Rule>),
}

impl Object {
    pub fn name(&self) -> &str {
        self.node().name()
    }

    /// The node carrying this object's name and type.
    pub fn node(&self) -> &Node {
        match self {
            Self::Node(node) => node,
            Self::Statement(stmt) => stmt.node(),
            Self::Rule(rule) => rule.node(),
        }
    }
}

/// A single theory: objects in insertion order, a name index, and an
/// optional link to the object in the parent theory that contains it.
#[derive(Debug, Default)]
pub struct Theory {
    parent: Option<Reference>,
    objects: Vec<Object>,
    index: FnvHashMap<String, usize>,
}

impl Theory {
    pub fn parent(&self) -> Option<Reference> {
        self.parent
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn iter(&self) -> core::slice::Iter<Object> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Arena owning a forest of theories.
///
/// Sub-theories (for example the inline theory of a long proof) refer to
/// their parents by [`Reference`], so the arena is the single owner of every
/// theory.
#[derive(Debug, Default)]
pub struct Theories {
    all: Vec<Theory>,
}

impl Theories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a theory; `parent` designates the containing object, if any.
    pub fn create(&mut self, parent: Option<Reference>) -> TheoryId {
        let id = TheoryId(self.all.len());
        self.all.push(Theory {
            parent,
            ..Default::default()
        });
        id
    }

    pub fn theory(&self, id: TheoryId) -> &Theory {
        &self.all[id.0]
    }

    /// Add an object after the given position (or at the front).
    ///
    /// Non-anonymous objects must have a name that is new to this theory.
    pub fn add(
        &mut self,
        id: TheoryId,
        object: Object,
        after: Option<usize>,
    ) -> Result<Reference, TheoryError> {
        let theory = &mut self.all[id.0];
        let name = object.name();
        if !name.is_empty() && theory.index.contains_key(name) {
            return Err(TheoryError::DuplicateName(name.to_string()));
        }

        let pos = after.map(|a| a + 1).unwrap_or(0);
        if pos < theory.objects.len() {
            theory.index.values_mut().for_each(|i| {
                if *i >= pos {
                    *i += 1
                }
            });
        }
        if !name.is_empty() {
            theory.index.insert(name.to_string(), pos);
        }
        theory.objects.insert(pos, object);
        Ok(Reference { theory: id, pos })
    }

    /// Append an object at the end of a theory.
    pub fn push(&mut self, id: TheoryId, object: Object) -> Result<Reference, TheoryError> {
        let len = self.all[id.0].objects.len();
        self.add(id, object, len.checked_sub(1))
    }

    /// Look up a name, walking up the parent theories.
    pub fn get(&self, id: TheoryId, name: &str) -> Option<Reference> {
        let theory = self.theory(id);
        if let Some(&pos) = theory.index.get(name) {
            return Some(Reference { theory: id, pos });
        }
        self.get(theory.parent?.theory, name)
    }

    pub fn resolve(&self, r: Reference) -> Option<&Object> {
        self.theory(r.theory).objects.get(r.pos)
    }

    /// The definition of the statement a reference points to.
    pub fn statement_def(&self, r: Reference) -> Option<&Expr> {
        match self.resolve(r)? {
            Object::Statement(stmt) => Some(stmt.definition()),
            _ => None,
        }
    }

    /// Attach a proof to the statement at the given slot.
    pub fn add_proof(&mut self, at: Reference, proof: Proof) -> Result<(), TheoryError> {
        match self.all[at.theory.0].objects.get_mut(at.pos) {
            Some(Object::Statement(stmt)) => {
                stmt.add_proof(proof);
                Ok(())
            }
            _ => Err(TheoryError::BadReference(format!(
                "no statement at position {}",
                at.pos
            ))),
        }
    }

    /// Verify every statement of the theory that carries a proof.
    ///
    /// Statements without proofs (axioms) are accepted unconditionally;
    /// non-statement objects pass through. Failures are logged and counted,
    /// but verification continues to the end of the theory.
    pub fn verify(&self, id: TheoryId) -> bool {
        self.verify_with(id, false)
    }

    /// Like [`Self::verify`], but optionally stop at the first failure.
    pub fn verify_with(&self, id: TheoryId, fail_fast: bool) -> bool {
        let mut ok = true;
        for (pos, object) in self.theory(id).iter().enumerate() {
            let stmt = match object {
                Object::Statement(stmt) => stmt,
                _ => continue,
            };
            let proof = match stmt.proof() {
                Some(proof) => proof,
                None => continue,
            };
            let proved = proof.proves(stmt, self).unwrap_or_else(|e| {
                warn!("error while checking {}: {}", slot_name(stmt, pos), e);
                false
            });
            if !proved {
                warn!("could not verify {}", slot_name(stmt, pos));
                ok = false;
                if fail_fast {
                    return false;
                }
            }
        }
        ok
    }
}

fn slot_name(stmt: &Statement, pos: usize) -> String {
    if stmt.node().is_anonymous() {
        format!("statement at position {}", pos)
    } else {
        stmt.node().name().to_string()
    }
}

impl Reference {
    /// Walk back `k` positions in the same theory.
    pub fn back(self, k: usize) -> Option<Self> {
        Some(Self {
            theory: self.theory,
            pos: self.pos.checked_sub(k)?,
        })
    }

    /// Parse a textual reference relative to the current position.
    ///
    /// The base is `this`, `parent`, `parent^n`, or a name resolved
    /// lexically from the current theory; `base~k` walks back `k` slots.
    pub fn parse(desc: &str, thys: &Theories, at: Reference) -> Result<Self, TheoryError> {
        let bad = || TheoryError::BadReference(desc.to_string());

        let (base, diff) = match desc.split_once('~') {
            Some((base, off)) => (base, off.parse::<usize>().map_err(|_| bad())?),
            None => (desc, 0),
        };

        let anchor = if base == "this" {
            at
        } else if base == "parent" {
            thys.theory(at.theory).parent().ok_or_else(bad)?
        } else if let Some(n) = base.strip_prefix("parent^") {
            let n = n.parse::<usize>().map_err(|_| bad())?;
            let mut anchor = at;
            for _ in 0..n {
                anchor = thys.theory(anchor.theory).parent().ok_or_else(bad)?;
            }
            anchor
        } else {
            thys.get(at.theory, base)
                .ok_or_else(|| TheoryError::NameNotFound(base.to_string()))?
        };

        anchor.back(diff).ok_or_else(bad)
    }

    /// Describe this reference relative to the current position.
    ///
    /// Prefers the target's name when lexical lookup from `at` finds the
    /// target under it; otherwise emits the most compact of the
    /// `this`/`parent`/`parent^n` forms with a backward offset. If the
    /// ancestor walk does not reach the target, the deterministic fallback
    /// is the `this~k` form with the largest `k` within the current theory.
    pub fn describe(&self, thys: &Theories, at: Reference) -> String {
        if let Some(object) = thys.resolve(*self) {
            let name = object.name();
            if !name.is_empty() && thys.get(at.theory, name) == Some(*self) {
                return name.to_string();
            }
        }

        let mut anchor = at;
        let mut level = 0;
        loop {
            if self.theory == anchor.theory && self.pos <= anchor.pos {
                let diff = anchor.pos - self.pos;
                return match level {
                    0 => format!("this~{}", diff),
                    1 => format!("parent~{}", diff),
                    n => format!("parent^{}~{}", n, diff),
                };
            }
            match thys.theory(anchor.theory).parent() {
                Some(parent) => {
                    anchor = parent;
                    level += 1;
                }
                None => return format!("this~{}", at.pos),
            }
        }
    }
}

/// The signed positional difference, or `None` across theories.
impl core::ops::Sub for Reference {
    type Output = Option<isize>;

    fn sub(self, other: Self) -> Self::Output {
        (self.theory == other.theory).then(|| self.pos as isize - other.pos as isize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{BuiltIn, Expr};

    fn node(name: &str) -> Object {
        Object::Node(Node::new(name, Expr::builtin(BuiltIn::Type)).unwrap())
    }

    #[test]
    fn names_are_unique_per_theory() {
        let mut thys = Theories::new();
        let root = thys.create(None);
        thys.push(root, node("person")).unwrap();
        assert_eq!(
            thys.push(root, node("person")),
            Err(TheoryError::DuplicateName("person".to_string()))
        );
        // anonymous objects may repeat
        thys.push(root, node("")).unwrap();
        thys.push(root, node("")).unwrap();
    }

    #[test]
    fn lookup_walks_up_parents() {
        let mut thys = Theories::new();
        let root = thys.create(None);
        let person = thys.push(root, node("person")).unwrap();
        let sub = thys.create(Some(person));
        thys.push(sub, node("x")).unwrap();

        assert_eq!(thys.get(sub, "person"), Some(person));
        assert_eq!(thys.get(root, "x"), None);
        assert_eq!(thys.get(sub, "nope"), None);
    }

    #[test]
    fn insertion_after_a_position_keeps_the_index_consistent() {
        let mut thys = Theories::new();
        let root = thys.create(None);
        let a = thys.push(root, node("a")).unwrap();
        thys.push(root, node("c")).unwrap();
        let b = thys.add(root, node("b"), Some(a.pos)).unwrap();
        assert_eq!(b.pos, 1);
        assert_eq!(thys.get(root, "c").map(|r| r.pos), Some(2));
        assert_eq!(thys.get(root, "a").map(|r| r.pos), Some(0));
    }

    #[test]
    fn reference_arithmetic() {
        let mut thys = Theories::new();
        let root = thys.create(None);
        for name in ["a", "b", "c", "d"] {
            thys.push(root, node(name)).unwrap();
        }
        let d = thys.get(root, "d").unwrap();
        let a = thys.get(root, "a").unwrap();

        // stepping back composes and is checked
        assert_eq!(d.back(1).and_then(|r| r.back(2)), d.back(3));
        assert_eq!(d.back(3), Some(a));
        assert_eq!(a.back(1), None);

        // signed positional difference
        assert_eq!(a - d, Some(-3));
        assert_eq!(d - a, Some(3));
        assert_eq!(d - d, Some(0));

        let other = thys.create(None);
        thys.push(other, node("a")).unwrap();
        let foreign = thys.get(other, "a").unwrap();
        assert_eq!(d - foreign, None);
    }

    #[test]
    fn textual_references() {
        let mut thys = Theories::new();
        let root = thys.create(None);
        let a = thys.push(root, node("a")).unwrap();
        let anon = thys.push(root, node("")).unwrap();
        let b = thys.push(root, node("b")).unwrap();

        // as seen from b
        assert_eq!(Reference::parse("this", &thys, b).unwrap(), b);
        assert_eq!(Reference::parse("this~1", &thys, b).unwrap(), anon);
        assert_eq!(Reference::parse("a", &thys, b).unwrap(), a);
        assert_eq!(Reference::parse("a~0", &thys, b).unwrap(), a);
        assert!(Reference::parse("this~9", &thys, b).is_err());
        assert!(Reference::parse("nope", &thys, b).is_err());

        assert_eq!(a.describe(&thys, b), "a");
        assert_eq!(anon.describe(&thys, b), "this~1");

        // from a sub-theory, the parent anchor is the containing object
        let sub = thys.create(Some(b));
        let inner = thys.push(sub, node("")).unwrap();
        assert_eq!(Reference::parse("parent~2", &thys, inner).unwrap(), a);
        assert_eq!(anon.describe(&thys, inner), "parent~1");
        assert_eq!(
            Reference::parse(&anon.describe(&thys, inner), &thys, inner).unwrap(),
            anon
        );
    }
}
