//! A proof checker for a small higher-order logic.

mod error;
mod opt;

use error::Error;
use opt::Opt;
use pruvo::{Theories, TheoryId};
use pruvo_parse::Parser;
use std::path::Path;
use structopt::StructOpt;

/// Parse a file into a new theory, printing diagnostics to stderr.
fn parse(path: &Path, thys: &mut Theories, rules: Option<TheoryId>) -> Result<TheoryId, Error> {
    let src = std::fs::read_to_string(path)?;

    let mut parser = Parser::new(&src);
    if let Some(rules) = rules {
        parser = parser.with_rules(rules);
    }
    let theory = parser.theory(thys);

    for diag in parser.diagnostics() {
        eprintln!("{}:{}", path.display(), diag);
    }
    log::info!(
        "{}: {} errors, {} warnings",
        path.display(),
        parser.errors(),
        parser.warnings()
    );

    if parser.errors() > 0 {
        return Err(Error::Parse {
            path: path.into(),
            errors: parser.errors(),
        });
    }
    Ok(theory)
}

fn run(opt: &Opt) -> Result<(), Error> {
    let mut thys = Theories::new();
    let rules = parse(&opt.rules, &mut thys, None)?;
    let theory = parse(&opt.file, &mut thys, Some(rules))?;

    if thys.verify_with(theory, opt.fail_fast) {
        println!("Verified theory!");
        Ok(())
    } else {
        Err(Error::Verification)
    }
}

fn main() {
    use env_logger::Env;
    // log warnings and errors by default
    // allow setting the logging level by using the environment variable "LOG"
    // e.g. `LOG=trace prucheck ...`
    env_logger::from_env(Env::default().filter_or("LOG", "warn")).init();

    let opt = Opt::from_args();

    std::process::exit(match run(&opt) {
        Ok(()) => 0,
        Err(Error::Io(err)) => {
            eprintln!("{}", err);
            1
        }
        Err(Error::Parse { path, errors }) => {
            eprintln!("Could not parse {}", path.display());
            errors.min(255) as i32
        }
        Err(Error::Verification) => {
            eprintln!("Could not verify theory.");
            1
        }
    })
}
