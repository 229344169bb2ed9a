//! Pretty-printing theories back to S-expression documents.
//!
//! The writer queues tokens and decides line breaks once it has enough
//! material: a parenthesised group that fits within the configured width is
//! written on one line, anything larger is broken after its head word and
//! indented one level deeper. Parsing the output reproduces an equivalent
//! theory.

use alloc::collections::VecDeque;
use alloc::string::String;
use core::fmt;
use pruvo::{Expr, ExprC, Node, Object, Proof, Reference, Rule, RuleKind, Statement};
use pruvo::{Theories, TheoryId};

/// Layout options for the writer.
#[derive(Copy, Clone, Debug)]
pub struct Style {
    /// Preferred maximal line width.
    pub width: usize,
    /// Indentation per nesting level.
    pub indent: usize,
    /// Indent with tabs instead of spaces.
    pub tabs: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            width: 80,
            indent: 4,
            tabs: true,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Tok {
    Open,
    Close,
    Word(String),
}

/// Writes objects as S-expressions with line wrapping.
pub struct Writer<'w, W: fmt::Write> {
    out: &'w mut W,
    style: Style,
    queue: VecDeque<Tok>,
    /// Parenthesis nesting of the queued material.
    depth: i64,
    /// Length of the queued material, excluding its last token.
    line: i64,
    /// Indentation level of the next written line.
    write_depth: i64,
}

impl<'w, W: fmt::Write> Writer<'w, W> {
    pub fn new(out: &'w mut W, style: Style) -> Self {
        Self {
            out,
            style,
            queue: VecDeque::new(),
            depth: 0,
            line: 0,
            write_depth: 0,
        }
    }

    /// Flush any remaining queued tokens.
    pub fn finish(mut self) -> fmt::Result {
        self.write_queue()
    }

    /// Write all objects of a theory.
    pub fn theory(&mut self, thys: &Theories, id: TheoryId) -> fmt::Result {
        for (pos, object) in thys.theory(id).iter().enumerate() {
            self.object(thys, object, Reference { theory: id, pos })?;
        }
        Ok(())
    }

    /// Write one object; `at` is its own slot, used to describe references.
    pub fn object(&mut self, thys: &Theories, object: &Object, at: Reference) -> fmt::Result {
        match object {
            Object::Node(node) => self.decl(node),
            Object::Rule(rule) => self.rule(rule),
            Object::Statement(stmt) => self.statement(thys, stmt, at),
        }
    }

    /// Write an expression.
    pub fn expr(&mut self, e: &Expr) -> fmt::Result {
        match &**e {
            ExprC::Builtin(b) => self.word(b.name()),
            ExprC::Atomic(node) => self.word(node.name()),
            ExprC::LambdaType { ret, args } => {
                self.open()?;
                self.word("lambda-type")?;
                self.expr(ret)?;
                self.open()?;
                self.word("list")?;
                args.iter().try_for_each(|arg| self.expr(arg))?;
                self.close()?;
                self.close()
            }
            ExprC::LambdaCall { node, args } => {
                self.open()?;
                self.word(node.name())?;
                args.iter().try_for_each(|arg| self.expr(arg))?;
                self.close()
            }
            ExprC::Lambda(lambda) => {
                self.open()?;
                self.word("lambda")?;
                self.open()?;
                self.word("list")?;
                lambda.params.iter().try_for_each(|p| self.decl(p))?;
                self.close()?;
                self.expr(&lambda.body)?;
                self.close()
            }
            ExprC::Negation(inner) => {
                self.open()?;
                self.word("not")?;
                self.expr(inner)?;
                self.close()
            }
            ExprC::Connective(conn, fst, snd) => {
                self.open()?;
                self.word(conn.name())?;
                self.expr(fst)?;
                self.expr(snd)?;
                self.close()
            }
            ExprC::Quantifier(quant, predicate) => {
                self.open()?;
                self.word(quant.name())?;
                self.expr(predicate)?;
                self.close()
            }
        }
    }

    /// Write a node declaration `( type name def? )`.
    fn decl(&mut self, node: &Node) -> fmt::Result {
        self.open()?;
        self.expr(node.ty())?;
        self.word(node.name())?;
        if let Some(def) = node.definition() {
            self.expr(def)?;
        }
        self.close()
    }

    fn varlist(&mut self, rule: &Rule) -> fmt::Result {
        self.open()?;
        self.word("list")?;
        rule.params().iter().try_for_each(|p| self.decl(p))?;
        self.close()
    }

    fn rule(&mut self, rule: &Rule) -> fmt::Result {
        self.open()?;
        match rule.kind() {
            RuleKind::Tautology(tautology) => {
                self.word("tautology")?;
                self.word(rule.name())?;
                self.varlist(rule)?;
                self.expr(tautology)?;
            }
            RuleKind::Equivalence(fst, snd) => {
                self.word("equivrule")?;
                self.word(rule.name())?;
                self.varlist(rule)?;
                self.expr(fst)?;
                self.expr(snd)?;
            }
            RuleKind::Deduction {
                premises,
                conclusion,
            } => {
                self.word("deductionrule")?;
                self.word(rule.name())?;
                self.varlist(rule)?;
                self.open()?;
                self.word("list")?;
                premises.iter().try_for_each(|p| self.expr(p))?;
                self.close()?;
                self.expr(conclusion)?;
            }
        }
        self.close()
    }

    fn statement(&mut self, thys: &Theories, stmt: &Statement, at: Reference) -> fmt::Result {
        self.open()?;
        self.word(if stmt.has_proof() { "lemma" } else { "axiom" })?;
        if !stmt.node().is_anonymous() {
            self.word(stmt.node().name())?;
        }
        self.expr(stmt.definition())?;
        if let Some(proof) = stmt.proof() {
            self.proof(thys, proof, at)?;
        }
        self.close()
    }

    fn proof(&mut self, thys: &Theories, proof: &Proof, at: Reference) -> fmt::Result {
        match proof {
            Proof::Step(step) => {
                self.open()?;
                self.word(step.rule().name())?;
                self.open()?;
                self.word("list")?;
                step.args().iter().try_for_each(|arg| self.expr(arg))?;
                self.close()?;
                self.open()?;
                self.word("list")?;
                for r in step.refs() {
                    self.word(r.describe(thys, at))?;
                }
                self.close()?;
                self.close()
            }
            Proof::Long(long) => {
                self.open()?;
                self.word("proof")?;
                self.theory(thys, long.theory())?;
                self.close()
            }
            // nothing sensible to print
            Proof::Invalid => Ok(()),
        }
    }

    fn word(&mut self, w: impl Into<String>) -> fmt::Result {
        self.push(Tok::Word(w.into()));
        Ok(())
    }

    fn open(&mut self) -> fmt::Result {
        self.paren(Tok::Open, 1)
    }

    fn close(&mut self) -> fmt::Result {
        self.paren(Tok::Close, -1)
    }

    fn paren(&mut self, tok: Tok, change: i64) -> fmt::Result {
        self.depth += change;
        self.push(tok);
        // at level 0 or with enough material, write something
        if self.depth == 0 || self.line > 2 * self.style.width as i64 {
            self.write_queue()?;
        }
        Ok(())
    }

    fn push(&mut self, tok: Tok) {
        self.queue.push_back(tok);
        // account for the length of the preceding token; the last token in
        // the queue is never counted, neither here nor in write_line
        if self.queue.len() >= 2 {
            self.line += self.tok_len(self.queue.len() - 2);
        }
    }

    /// Length of a queued token, including the space after it.
    fn tok_len(&self, i: usize) -> i64 {
        let len = match &self.queue[i] {
            Tok::Word(w) => w.chars().count() as i64,
            _ => 1,
        };
        let spaced = !matches!(self.queue[i], Tok::Open)
            && !matches!(self.queue.get(i + 1), Some(Tok::Close) | None);
        len + i64::from(spaced)
    }

    /// Write tokens until the queue is drained (at level 0) or until the
    /// queued material fits the line again.
    fn write_queue(&mut self) -> fmt::Result {
        let width = self.style.width as i64;
        while (self.depth == 0 && !self.queue.is_empty()) || (self.depth != 0 && self.line > width)
        {
            let front = match self.queue.front() {
                Some(tok) => tok.clone(),
                None => break,
            };
            match front {
                Tok::Open => {
                    // count characters until the matching ')'
                    let mut length = self.style.indent as i64 * self.write_depth.max(0);
                    let mut group = 1i64;
                    let mut index = 1;
                    while group != 0 && length <= width && index < self.queue.len() {
                        match self.queue[index] {
                            Tok::Open => group += 1,
                            Tok::Close => group -= 1,
                            Tok::Word(_) => (),
                        }
                        length += self.tok_len(index);
                        index += 1;
                    }

                    if group == 0 && length <= width {
                        self.write_line(index)?;
                    } else {
                        let head = matches!(self.queue.get(1), Some(Tok::Open));
                        self.write_line(if head { 1 } else { 2 })?;
                        // the closing parenthesis will get an extra line,
                        // compensated when it is written
                        self.line -= 1;
                        self.write_depth += 1;
                    }
                }
                Tok::Close => {
                    self.line += 1;
                    self.write_depth -= 1;
                    self.write_line(1)?;
                }
                Tok::Word(_) => self.write_line(1)?,
            }
        }
        Ok(())
    }

    /// Write one indented line using the first `n` queued tokens.
    fn write_line(&mut self, n: usize) -> fmt::Result {
        if self.style.tabs {
            for _ in 0..self.write_depth.max(0) {
                self.out.write_char('\t')?;
            }
        } else {
            for _ in 0..(self.style.indent as i64 * self.write_depth.max(0)) {
                self.out.write_char(' ')?;
            }
        }

        let mut n = n.min(self.queue.len());
        while n > 0 {
            n -= 1;
            if self.queue.len() > 1 {
                self.line -= self.tok_len(0);
            }
            let tok = match self.queue.pop_front() {
                Some(tok) => tok,
                None => break,
            };
            match &tok {
                Tok::Open => self.out.write_char('(')?,
                Tok::Close => self.out.write_char(')')?,
                Tok::Word(w) => self.out.write_str(w)?,
            }
            // space after a word unless the group or the line ends here
            let before_close = matches!(self.queue.front(), Some(Tok::Close) | None);
            if !matches!(tok, Tok::Open) && !before_close && n > 1 {
                self.out.write_char(' ')?;
            }
        }
        self.out.write_char('\n')
    }
}

/// Render a whole theory to a string.
pub fn theory_string(thys: &Theories, id: TheoryId, style: Style) -> String {
    let mut out = String::new();
    let mut writer = Writer::new(&mut out, style);
    // writing to a string does not fail
    let _ = writer.theory(thys, id).and_then(|()| writer.finish());
    out
}
