//! Recursive-descent parser for theory documents.
//!
//! The parser builds core objects directly while reading the token stream.
//! Construction errors do not abort the parse: they are recorded as
//! positioned diagnostics, the affected object is replaced by a sentinel,
//! and reading continues, so one mistake does not cascade into a flood of
//! follow-up errors.

use crate::lex::{Lexer, Position, Token};
use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::{self, Display};
use pruvo::{
    BuiltIn, Conn, Expr, ExprC, LongProof, Node, Object, Proof, ProofStep, Quant, Reference, Rule,
    Statement, Theories, TheoryId,
};

/// Diagnostic severity.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Level {
    Error,
    Warning,
    Note,
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Error => "error".fmt(f),
            Self::Warning => "warning".fmt(f),
            Self::Note => "note".fmt(f),
        }
    }
}

/// A positioned parser message. Prepend the file name to get the usual
/// `file:line:col: level: message` form.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub position: Position,
    pub level: Level,
    pub message: String,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}: {}", self.position, self.level, self.message)
    }
}

/// Parser state over one input document.
pub struct Parser<'s> {
    lexer: Lexer<'s>,
    token: Token<'s>,
    diagnostics: Vec<Diagnostic>,
    errors: usize,
    warnings: usize,
    /// Theory to resolve rule names in, in addition to the document itself.
    rules: Option<TheoryId>,
    /// Parameter scopes opened by lambdas and rules, innermost last.
    scopes: Vec<Vec<Node>>,
    /// Theory nesting with the latest insertion position per level.
    levels: Vec<(TheoryId, Option<usize>)>,
}

impl<'s> Parser<'s> {
    pub fn new(src: &'s str) -> Self {
        let mut lexer = Lexer::new(src);
        let token = lexer.token();
        Self {
            lexer,
            token,
            diagnostics: Vec::new(),
            errors: 0,
            warnings: 0,
            rules: None,
            scopes: Vec::new(),
            levels: Vec::new(),
        }
    }

    /// Resolve rule names of proof steps in the given theory as well.
    pub fn with_rules(mut self, rules: TheoryId) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Parse a standalone theory until the end of input.
    pub fn theory(&mut self, thys: &mut Theories) -> TheoryId {
        let id = thys.create(None);
        self.theory_into(thys, id);
        if self.token != Token::Eof {
            self.error(format!("expected {}, but read {}", Token::Eof, self.token));
        }
        id
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn warnings(&self) -> usize {
        self.warnings
    }

    fn next(&mut self) {
        self.token = self.lexer.token();
    }

    fn report(&mut self, level: Level, message: String) {
        match level {
            Level::Error => self.errors += 1,
            Level::Warning => self.warnings += 1,
            Level::Note => (),
        }
        self.diagnostics.push(Diagnostic {
            position: self.lexer.position(),
            level,
            message,
        });
    }

    fn error(&mut self, message: String) {
        self.report(Level::Error, message)
    }

    /// Check the kind of the current token; report an error otherwise.
    fn expect(&mut self, token: &Token) -> bool {
        let ok = matches!(
            (&self.token, token),
            (Token::Open, Token::Open)
                | (Token::Close, Token::Close)
                | (Token::Word(_), Token::Word(_))
                | (Token::Eof, Token::Eof)
        );
        if !ok {
            self.error(format!("expected {}, but read {}", token, self.token));
        }
        ok
    }

    /// Skip to the matching closing parenthesis of the current group.
    fn recover(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.token {
                Token::Open => depth += 1,
                Token::Close => {
                    if depth == 0 {
                        self.next();
                        break;
                    }
                    depth -= 1;
                }
                Token::Eof => break,
                Token::Word(_) => (),
            }
            self.next();
        }
        self.report(Level::Note, "ignored everything until ')'".to_string());
    }

    fn current(&self) -> (TheoryId, Option<usize>) {
        *self.levels.last().expect("parser is inside a theory")
    }

    fn add_object(&mut self, thys: &mut Theories, object: Object) -> Option<Reference> {
        let (id, last) = self.current();
        match thys.add(id, object, last) {
            Ok(r) => {
                if let Some((_, last)) = self.levels.last_mut() {
                    *last = Some(r.pos);
                }
                Some(r)
            }
            Err(err) => {
                self.error(format!("{}", err));
                None
            }
        }
    }

    /// A named placeholder that keeps later references resolvable.
    fn sentinel(&mut self, name: &str) -> Node {
        match Node::new(name, Expr::builtin(BuiltIn::Undefined)) {
            Ok(node) => node,
            Err(_) => Node::undefined(),
        }
    }

    fn sentinel_expr(&mut self) -> Expr {
        Expr::atomic(Node::undefined())
    }

    /// Sentinel expressions mark sub-terms that already produced an error;
    /// suppressing their follow-up errors keeps diagnostics readable.
    fn is_sentinel(e: &Expr) -> bool {
        matches!(&*e.typ(), ExprC::Builtin(BuiltIn::Undefined))
    }

    /// Look up a name through the parameter scopes and the theory chain.
    fn get_node(&mut self, thys: &Theories, name: &str) -> Option<Node> {
        for scope in self.scopes.iter().rev() {
            if let Some(node) = scope.iter().rev().find(|n| n.name() == name) {
                return Some(node.clone());
            }
        }
        let (id, _) = self.current();
        let r = thys.get(id, name)?;
        thys.resolve(r).map(|obj| obj.node().clone())
    }

    /// Like [`Self::get_node`], but reports undeclared identifiers.
    fn known_node(&mut self, thys: &Theories, name: &str) -> Option<Node> {
        let node = self.get_node(thys, name);
        if node.is_none() {
            self.error(format!("undeclared identifier {}", name));
        }
        node
    }

    fn get_rule(&mut self, thys: &Theories, name: &str) -> Option<Rc<Rule>> {
        let (id, _) = self.current();
        let found = thys.get(id, name).or_else(|| {
            let rules = self.rules?;
            thys.get(rules, name)
        })?;
        match thys.resolve(found) {
            Some(Object::Rule(rule)) => Some(rule.clone()),
            _ => None,
        }
    }

    /// Parse objects into the given theory until `)` or end of input.
    fn theory_into(&mut self, thys: &mut Theories, id: TheoryId) {
        self.levels.push((id, None));
        while self.token != Token::Close && self.token != Token::Eof {
            self.object(thys);
        }
        self.levels.pop();
    }

    /// Parse one object and add it to the current theory.
    fn object(&mut self, thys: &mut Theories) {
        if !self.expect(&Token::Open) {
            // skip the offending token so that parsing makes progress
            self.next();
            return;
        }
        self.next();

        match self.token {
            Token::Word("axiom") => self.statement(thys, false),
            Token::Word("lemma") => self.statement(thys, true),
            Token::Word("tautology") => self.tautology(thys),
            Token::Word("equivrule") => self.equivrule(thys),
            Token::Word("deductionrule") => self.deductionrule(thys),
            _ => {
                if let Some(node) = self.decl(thys) {
                    self.add_object(thys, Object::Node(node));
                }
            }
        }

        if self.expect(&Token::Close) {
            self.next();
        } else {
            self.recover();
        }
    }

    /// Parse a node declaration or definition: `type name expr?`.
    fn decl(&mut self, thys: &mut Theories) -> Option<Node> {
        let ty = self.typ(thys);

        let name = match self.token {
            Token::Word(name) => name,
            _ => {
                self.expect(&Token::Word(""));
                return None;
            }
        };
        let node = Node::new(name, ty).unwrap_or_else(|err| {
            self.error(format!("{}", err));
            self.sentinel(name)
        });
        self.next();

        if self.token != Token::Close {
            let def = self.expr(thys);
            if !Self::is_sentinel(&def) {
                if let Err(err) = node.set_definition(def) {
                    self.error(format!("{}", err));
                }
            }
        }
        Some(node)
    }

    /// Parse a type expression.
    fn typ(&mut self, thys: &mut Theories) -> Expr {
        match self.token {
            Token::Word("type") => {
                self.next();
                Expr::builtin(BuiltIn::Type)
            }
            Token::Word("statement") => {
                self.next();
                Expr::builtin(BuiltIn::Statement)
            }
            Token::Word(name) => {
                let ty = match self.known_node(thys, name) {
                    Some(node) => Expr::atomic(node),
                    None => Expr::builtin(BuiltIn::Undefined),
                };
                self.next();
                ty
            }
            Token::Open => self.lambda_type(thys),
            _ => {
                self.error("expected beginning of type expression".to_string());
                Expr::builtin(BuiltIn::Undefined)
            }
        }
    }

    /// Parse `( lambda-type type ( list type* ) )`, starting at `(`.
    fn lambda_type(&mut self, thys: &mut Theories) -> Expr {
        self.next();
        match self.token {
            Token::Word("lambda-type") => self.next(),
            _ => self.error("expected 'lambda-type'".to_string()),
        }

        let ret = self.typ(thys);

        let mut args = Vec::new();
        if self.expect(&Token::Open) {
            self.next();
            if self.expect(&Token::Word("")) && self.token == Token::Word("list") {
                self.next();
            }
            while self.token != Token::Close && self.token != Token::Eof {
                args.push(self.typ(thys));
            }
            self.next();
        } else {
            self.recover();
        }

        if self.expect(&Token::Close) {
            self.next();
        }

        Expr::lambda_type(ret, args).unwrap_or_else(|err| {
            self.error(format!("{}", err));
            Expr::builtin(BuiltIn::Undefined)
        })
    }

    /// Parse an expression.
    fn expr(&mut self, thys: &mut Theories) -> Expr {
        match self.token {
            Token::Open => {
                self.next();
                match self.token {
                    Token::Word("not") => self.negation(thys),
                    Token::Word("and") => self.connective(thys, Conn::And),
                    Token::Word("or") => self.connective(thys, Conn::Or),
                    Token::Word("impl") => self.connective(thys, Conn::Impl),
                    Token::Word("equiv") => self.connective(thys, Conn::Equiv),
                    Token::Word("forall") => self.quantifier(thys, Quant::Forall),
                    Token::Word("exists") => self.quantifier(thys, Quant::Exists),
                    Token::Word("lambda") => self.lambda(thys),
                    Token::Word(_) => self.call(thys),
                    _ => {
                        self.expect(&Token::Word(""));
                        self.recover();
                        self.sentinel_expr()
                    }
                }
            }
            Token::Word(name) => {
                let expr = match self.known_node(thys, name) {
                    Some(node) => Expr::atomic(node),
                    None => self.sentinel_expr(),
                };
                self.next();
                expr
            }
            _ => {
                self.error("expected beginning of expression".to_string());
                self.sentinel_expr()
            }
        }
    }

    /// Parse a lambda call `( name expr* )`, starting at the callee name.
    fn call(&mut self, thys: &mut Theories) -> Expr {
        let name = match self.token {
            Token::Word(name) => name,
            _ => return self.sentinel_expr(),
        };
        let callee = self.known_node(thys, name);
        self.next();

        let mut args = Vec::new();
        while self.token != Token::Close && self.token != Token::Eof {
            args.push(self.expr(thys));
        }
        self.next();

        let callee = match callee {
            Some(callee) => callee,
            None => return self.sentinel_expr(),
        };
        // a sentinel callee or argument already produced an error
        if matches!(&**callee.ty(), ExprC::Builtin(BuiltIn::Undefined))
            || args.iter().any(Self::is_sentinel)
        {
            return self.sentinel_expr();
        }
        Expr::call(callee, args).unwrap_or_else(|err| {
            self.error(format!("{}", err));
            self.sentinel_expr()
        })
    }

    /// Parse `( not expr )`, starting at `not`.
    fn negation(&mut self, thys: &mut Theories) -> Expr {
        self.next();
        let inner = self.expr(thys);

        if self.expect(&Token::Close) {
            self.next();
        } else {
            self.recover();
        }

        if Self::is_sentinel(&inner) {
            return self.sentinel_expr();
        }
        Expr::negation(inner).unwrap_or_else(|err| {
            self.error(format!("{}", err));
            self.sentinel_expr()
        })
    }

    /// Parse a binary connective, starting at its keyword.
    fn connective(&mut self, thys: &mut Theories, conn: Conn) -> Expr {
        self.next();
        let fst = self.expr(thys);
        let snd = self.expr(thys);

        if self.expect(&Token::Close) {
            self.next();
        } else {
            self.recover();
        }

        if Self::is_sentinel(&fst) || Self::is_sentinel(&snd) {
            return self.sentinel_expr();
        }
        Expr::connective(conn, fst, snd).unwrap_or_else(|err| {
            self.error(format!("{}", err));
            self.sentinel_expr()
        })
    }

    /// Parse a quantifier, starting at its keyword.
    fn quantifier(&mut self, thys: &mut Theories, quant: Quant) -> Expr {
        self.next();
        let predicate = self.expr(thys);

        if self.expect(&Token::Close) {
            self.next();
        } else {
            self.recover();
        }

        if Self::is_sentinel(&predicate) {
            return self.sentinel_expr();
        }
        Expr::quantifier(quant, predicate).unwrap_or_else(|err| {
            self.error(format!("{}", err));
            self.sentinel_expr()
        })
    }

    /// Parse `( lambda ( list decl* ) expr )`, starting at `lambda`.
    fn lambda(&mut self, thys: &mut Theories) -> Expr {
        self.next();

        let Some(params) = self.paramlist(thys) else {
            return self.sentinel_expr();
        };

        let body = self.expr(thys);
        self.scopes.pop();

        if self.expect(&Token::Close) {
            self.next();
        } else {
            self.recover();
        }

        Expr::lambda(params, body)
    }

    /// Parse `( list ( decl )* )` and open a scope with the parameters.
    ///
    /// On success, the caller must pop the scope after parsing whatever the
    /// parameters are visible in.
    fn paramlist(&mut self, thys: &mut Theories) -> Option<Vec<Node>> {
        if !self.expect(&Token::Open) {
            return None;
        }
        self.next();
        match self.token {
            Token::Word("list") => self.next(),
            _ => {
                self.error(format!("expected 'list', but read {}", self.token));
                self.recover();
                return None;
            }
        }

        self.scopes.push(Vec::new());
        while self.token == Token::Open {
            self.next();
            // parameters may refer to the parameters before them
            if let Some(node) = self.decl(thys) {
                if let Some(scope) = self.scopes.last_mut() {
                    scope.push(node);
                }
            }
            if self.expect(&Token::Close) {
                self.next();
            } else {
                self.recover();
            }
        }

        if self.expect(&Token::Close) {
            self.next();
        } else {
            self.recover();
        }
        let params = self.scopes.last().cloned().unwrap_or_default();
        Some(params)
    }

    /// Parse a tautology rule, starting at `tautology`.
    fn tautology(&mut self, thys: &mut Theories) {
        self.next();
        let Some(name) = self.rule_name() else { return };
        let Some(params) = self.paramlist(thys) else {
            return;
        };
        let statement = self.expr(thys);
        self.scopes.pop();

        if Self::is_sentinel(&statement) {
            let sentinel = self.sentinel(&name);
            self.add_object(thys, Object::Node(sentinel));
            return;
        }
        match Rule::tautology(&name, params, statement) {
            Ok(rule) => {
                self.add_object(thys, Object::Rule(Rc::new(rule)));
            }
            Err(err) => self.failed_object(thys, &name, err.into()),
        }
    }

    /// Parse an equivalence rule, starting at `equivrule`.
    fn equivrule(&mut self, thys: &mut Theories) {
        self.next();
        let Some(name) = self.rule_name() else { return };
        let Some(params) = self.paramlist(thys) else {
            return;
        };
        let fst = self.expr(thys);
        let snd = self.expr(thys);
        self.scopes.pop();

        if Self::is_sentinel(&fst) || Self::is_sentinel(&snd) {
            let sentinel = self.sentinel(&name);
            self.add_object(thys, Object::Node(sentinel));
            return;
        }
        match Rule::equivalence(&name, params, fst, snd) {
            Ok(rule) => {
                self.add_object(thys, Object::Rule(Rc::new(rule)));
            }
            Err(err) => self.failed_object(thys, &name, err.into()),
        }
    }

    /// Parse a deduction rule, starting at `deductionrule`.
    fn deductionrule(&mut self, thys: &mut Theories) {
        self.next();
        let Some(name) = self.rule_name() else { return };
        let Some(params) = self.paramlist(thys) else {
            return;
        };

        let mut premises = Vec::new();
        if self.expect(&Token::Open) {
            self.next();
            if self.expect(&Token::Word("")) && self.token == Token::Word("list") {
                self.next();
                while self.token != Token::Close && self.token != Token::Eof {
                    premises.push(self.expr(thys));
                }
                self.next();
            } else {
                self.recover();
            }
        }

        let conclusion = self.expr(thys);
        self.scopes.pop();

        if premises.iter().any(Self::is_sentinel) || Self::is_sentinel(&conclusion) {
            let sentinel = self.sentinel(&name);
            self.add_object(thys, Object::Node(sentinel));
            return;
        }
        match Rule::deduction(&name, params, premises, conclusion) {
            Ok(rule) => {
                self.add_object(thys, Object::Rule(Rc::new(rule)));
            }
            Err(err) => self.failed_object(thys, &name, err.into()),
        }
    }

    fn rule_name(&mut self) -> Option<String> {
        match self.token {
            Token::Word(name) => {
                let name = name.to_string();
                self.next();
                Some(name)
            }
            _ => {
                self.expect(&Token::Word(""));
                self.recover();
                None
            }
        }
    }

    /// Record a construction failure and keep the name resolvable.
    fn failed_object(&mut self, thys: &mut Theories, name: &str, err: pruvo::Error) {
        self.error(format!("{}", err));
        let sentinel = self.sentinel(name);
        self.add_object(thys, Object::Node(sentinel));
    }

    /// Parse a statement, starting at `axiom` or `lemma`.
    fn statement(&mut self, thys: &mut Theories, lemma: bool) {
        self.next();

        let mut name = "";
        if let Token::Word(word) = self.token {
            name = word;
            self.next();
        }
        let name = name.to_string();

        let expr = self.expr(thys);
        let at = if Self::is_sentinel(&expr) {
            // already diagnosed while parsing the content
            let sentinel = self.sentinel(&name);
            self.add_object(thys, Object::Node(sentinel));
            None
        } else {
            match Statement::new(&name, expr) {
                Ok(stmt) => self.add_object(thys, Object::Statement(stmt)),
                Err(err) => {
                    self.failed_object(thys, &name, err);
                    None
                }
            }
        };

        if lemma {
            // parse the proof even if the statement itself went wrong, so
            // that reading continues behind it
            let (id, _) = self.current();
            let anchor = at.unwrap_or(Reference {
                theory: id,
                pos: usize::MAX,
            });
            let proof = self.proof(thys, anchor).unwrap_or(Proof::Invalid);
            if let Some(at) = at {
                let _ = thys.add_proof(at, proof);
            }
        } else if self.token == Token::Open {
            self.report(
                Level::Warning,
                "axioms take no proof; use 'lemma' instead".to_string(),
            );
        }
    }

    /// Parse a proof: a single step `( rule ( list expr* ) ( list ref* ) )`
    /// or a sub-theory `( proof object* )`.
    fn proof(&mut self, thys: &mut Theories, at: Reference) -> Option<Proof> {
        if !self.expect(&Token::Open) {
            return None;
        }
        self.next();

        let name = match self.token {
            Token::Word("proof") => {
                self.next();
                let sub = thys.create(Some(at));
                self.theory_into(thys, sub);
                if self.expect(&Token::Close) {
                    self.next();
                } else {
                    self.recover();
                }
                return Some(Proof::Long(LongProof::new(sub)));
            }
            Token::Word(name) => name.to_string(),
            _ => {
                self.expect(&Token::Word(""));
                self.recover();
                return None;
            }
        };
        self.next();

        // argument expressions
        let mut args = Vec::new();
        if self.expect(&Token::Open) {
            self.next();
            if self.expect(&Token::Word("")) && self.token == Token::Word("list") {
                self.next();
                while self.token != Token::Close && self.token != Token::Eof {
                    args.push(self.expr(thys));
                }
                self.next();
            } else {
                self.recover();
            }
        }

        // premise references
        let mut refs = Vec::new();
        if self.expect(&Token::Open) {
            self.next();
            if self.expect(&Token::Word("")) && self.token == Token::Word("list") {
                self.next();
                while self.token != Token::Close && self.token != Token::Eof {
                    refs.push(self.reference(thys, at));
                }
                self.next();
            } else {
                self.recover();
            }
        }

        if self.expect(&Token::Close) {
            self.next();
        } else {
            self.recover();
        }

        let rule = match self.get_rule(thys, &name) {
            Some(rule) => rule,
            None => {
                self.error(format!("unknown rule {}", name));
                return None;
            }
        };
        match ProofStep::new(rule, args, refs) {
            Ok(step) => Some(Proof::Step(step)),
            Err(err) => {
                self.error(format!("{}", err));
                None
            }
        }
    }

    /// Parse a reference relative to the statement being proven.
    fn reference(&mut self, thys: &Theories, at: Reference) -> Reference {
        // an unresolvable slot; every rule application rejects it
        let sentinel = Reference {
            theory: at.theory,
            pos: usize::MAX,
        };
        let desc = match self.token {
            Token::Word(desc) => desc,
            _ => {
                self.expect(&Token::Word(""));
                self.next();
                return sentinel;
            }
        };
        let r = match Reference::parse(desc, thys, at) {
            Ok(r) => r,
            Err(err) => {
                self.error(format!("{}", err));
                sentinel
            }
        };
        self.next();
        r
    }
}
