#![no_std]
#![forbid(unsafe_code)]

//! S-expression front end for the `pruvo` proof checker.
//!
//! The [`lex`] module tokenises a document, [`parse`] builds core objects
//! from the token stream while accumulating positioned diagnostics, and
//! [`print`] writes theories back out with configurable line wrapping.
//!
//! ~~~
//! use pruvo::Theories;
//! use pruvo_parse::Parser;
//!
//! let mut thys = Theories::new();
//! let mut parser = Parser::new("(type person) (person fritz)");
//! let theory = parser.theory(&mut thys);
//! assert_eq!(parser.errors(), 0);
//! assert_eq!(thys.theory(theory).len(), 2);
//! # assert!(thys.verify(theory));
//! ~~~

extern crate alloc;

pub mod lex;
pub mod parse;
pub mod print;

pub use lex::{Lexer, Position, Token};
pub use parse::{Diagnostic, Level, Parser};
pub use print::{theory_string, Style, Writer};

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use alloc::vec::Vec;
    use pruvo::{Theories, TheoryId};

    const RULES: &str = r#"
# basic rules of classical logic
(tautology excluded_middle (list (statement a)) (or a (not a)))
(equivrule double_negation (list (statement a)) (not (not a)) a)
(deductionrule ponens (list (statement a) (statement b)) (list (impl a b) a) b)
(deductionrule specialization
    (list (type T) ((lambda-type statement (list T)) P) (T y))
    (list (forall P))
    (P y))
"#;

    const SOCRATES: &str = r#"
(type person)
((lambda-type statement (list person)) schüler?)
((lambda-type statement (list person)) dumm?)
(person fritz)
(axiom (schüler? fritz))
(axiom (forall (lambda (list (person x)) (impl (schüler? x) (dumm? x)))))
(lemma (dumm? fritz)
    (proof
        (lemma (impl (schüler? fritz) (dumm? fritz))
            (specialization
                (list
                    person
                    (lambda (list (person x)) (impl (schüler? x) (dumm? x)))
                    fritz)
                (list parent~1)))
        (lemma (dumm? fritz)
            (ponens (list (schüler? fritz) (dumm? fritz)) (list this~1 parent~2)))))
"#;

    fn parse_rules(thys: &mut Theories) -> TheoryId {
        let mut parser = Parser::new(RULES);
        let rules = parser.theory(thys);
        for diag in parser.diagnostics() {
            std::eprintln!("{}", diag);
        }
        assert_eq!(parser.errors(), 0, "rules must parse cleanly");
        rules
    }

    fn parse_doc(thys: &mut Theories, rules: TheoryId, src: &str) -> TheoryId {
        let mut parser = Parser::new(src).with_rules(rules);
        let theory = parser.theory(thys);
        for diag in parser.diagnostics() {
            std::eprintln!("{}", diag);
        }
        assert_eq!(parser.errors(), 0);
        theory
    }

    #[test]
    fn socrates_verifies() {
        let mut thys = Theories::new();
        let rules = parse_rules(&mut thys);
        let theory = parse_doc(&mut thys, rules, SOCRATES);
        assert!(thys.verify(theory));
    }

    #[test]
    fn swapped_premises_do_not_verify() {
        let swapped = SOCRATES.replace(
            "(list this~1 parent~2)",
            "(list parent~2 this~1)",
        );
        let mut thys = Theories::new();
        let rules = parse_rules(&mut thys);
        let theory = parse_doc(&mut thys, rules, &swapped);
        assert!(!thys.verify(theory));
    }

    #[test]
    fn printing_round_trips() {
        let mut thys = Theories::new();
        let rules = parse_rules(&mut thys);
        let theory = parse_doc(&mut thys, rules, SOCRATES);

        let printed = theory_string(&thys, theory, Style::default());
        let reparsed = parse_doc(&mut thys, rules, &printed);
        assert!(thys.verify(reparsed));

        // printing is idempotent modulo reference formatting
        let reprinted = theory_string(&thys, reparsed, Style::default());
        assert_eq!(printed, reprinted);
    }

    #[test]
    fn printing_round_trips_when_narrow() {
        let mut thys = Theories::new();
        let rules = parse_rules(&mut thys);
        let theory = parse_doc(&mut thys, rules, SOCRATES);

        let style = Style {
            width: 40,
            indent: 2,
            tabs: false,
        };
        let printed = theory_string(&thys, theory, style);
        assert!(printed.lines().count() > thys.theory(theory).len());
        let reparsed = parse_doc(&mut thys, rules, &printed);
        assert!(thys.verify(reparsed));
    }

    #[test]
    fn references_prefer_names() {
        let doc = r#"
(statement it)
(statement so)
(axiom premise (impl it so))
(axiom fact it)
(lemma done so (ponens (list it so) (list premise fact)))
"#;
        let mut thys = Theories::new();
        let rules = parse_rules(&mut thys);
        let theory = parse_doc(&mut thys, rules, doc);
        assert!(thys.verify(theory));

        let printed = theory_string(&thys, theory, Style::default());
        assert!(printed.contains("premise fact"), "got: {}", printed);
        let reparsed = parse_doc(&mut thys, rules, &printed);
        assert!(thys.verify(reparsed));
    }

    #[test]
    fn rules_print_like_their_source() {
        let mut thys = Theories::new();
        let rules = parse_rules(&mut thys);
        let style = Style {
            width: 120,
            indent: 4,
            tabs: true,
        };
        let printed = theory_string(&thys, rules, style);
        let lines: Vec<&str> = printed.lines().collect();
        assert_eq!(
            lines[0],
            "(tautology excluded_middle (list (statement a)) (or a (not a)))"
        );
        assert_eq!(
            lines[1],
            "(equivrule double_negation (list (statement a)) (not (not a)) a)"
        );
        assert_eq!(
            lines[2],
            "(deductionrule ponens (list (statement a) (statement b)) (list (impl a b) a) b)"
        );
        assert_eq!(
            lines[3],
            "(deductionrule specialization (list (type T) ((lambda-type statement (list T)) P) (T y)) (list (forall P)) (P y))"
        );
    }

    #[test]
    fn diagnostics_have_positions_and_recovery_continues() {
        let doc = "(type person)\n(person fritz extra)\n(wrong fritz)\n(person gustav)";
        let mut thys = Theories::new();
        let mut parser = Parser::new(doc);
        let theory = parser.theory(&mut thys);

        // 'extra' is an undeclared definition and 'wrong' is not a type,
        // but 'gustav' still makes it into the theory
        assert!(parser.errors() >= 2);
        assert!(thys.get(theory, "gustav").is_some());
        assert!(thys.get(theory, "fritz").is_some());

        let undeclared = parser
            .diagnostics()
            .iter()
            .find(|d| d.message.contains("undeclared identifier extra"))
            .expect("diagnostic for 'extra'");
        assert_eq!(undeclared.position.line, 2);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let doc = "(type person) (type person)";
        let mut thys = Theories::new();
        let mut parser = Parser::new(doc);
        let theory = parser.theory(&mut thys);
        assert_eq!(parser.errors(), 1);
        assert_eq!(thys.theory(theory).len(), 1);
        assert!(parser
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("duplicate name person")));
    }

    #[test]
    fn lemmas_require_working_proofs() {
        // the lemma cites a rule that does not exist
        let doc = "(statement it) (axiom fact it) (lemma again it (nope (list) (list fact)))";
        let mut thys = Theories::new();
        let rules = parse_rules(&mut thys);
        let mut parser = Parser::new(doc).with_rules(rules);
        let theory = parser.theory(&mut thys);
        assert_eq!(parser.errors(), 1);
        // the lemma is kept, but it does not verify
        assert!(!thys.verify(theory));
    }

    #[test]
    fn ill_typed_calls_are_diagnosed() {
        let doc = "(type person)\n((lambda-type statement (list person)) dumm?)\n(statement a)\n(axiom (dumm? a))";
        let mut thys = Theories::new();
        let mut parser = Parser::new(doc);
        parser.theory(&mut thys);
        assert_eq!(parser.errors(), 1);
        assert!(parser
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("type mismatch in argument 1")));
    }
}
