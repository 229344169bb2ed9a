//! Reformat a theory file, wrapping lines at a configurable width.

use clap::Parser as Clap;
use pruvo::{Theories, TheoryId};
use pruvo_parse::{theory_string, Parser, Style};
use std::path::PathBuf;

#[derive(Clone, Debug, Clap)]
pub struct Opt {
    /// Maximal line width.
    #[clap(long, default_value_t = 80)]
    width: usize,

    /// Indentation per nesting level.
    #[clap(long, default_value_t = 4)]
    indent: usize,

    /// Indent with spaces instead of tabs.
    #[clap(long)]
    spaces: bool,

    /// Rules file providing the inference rules for the theory's proofs.
    #[clap(long, value_name = "RULES", default_value = "basic/rules.lth")]
    rules: PathBuf,

    /// Files to reformat (cumulative); output goes to standard output.
    #[clap(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env("LOG").init();

    let opt = Opt::parse();
    let style = Style {
        width: opt.width,
        indent: opt.indent,
        tabs: !opt.spaces,
    };

    let mut errors = 0;
    let mut thys = Theories::new();

    // proof steps can only be read with the rules they cite
    let rules: Option<TheoryId> = match std::fs::read_to_string(&opt.rules) {
        Ok(src) => {
            let mut parser = Parser::new(&src);
            let rules = parser.theory(&mut thys);
            for diag in parser.diagnostics() {
                eprintln!("{}:{}", opt.rules.display(), diag);
            }
            errors += parser.errors();
            Some(rules)
        }
        Err(err) => {
            log::warn!("skipping rules file {}: {}", opt.rules.display(), err);
            None
        }
    };

    for path in &opt.files {
        let src = std::fs::read_to_string(path)?;
        let mut parser = Parser::new(&src);
        if let Some(rules) = rules {
            parser = parser.with_rules(rules);
        }
        let theory = parser.theory(&mut thys);
        for diag in parser.diagnostics() {
            eprintln!("{}:{}", path.display(), diag);
        }
        errors += parser.errors();

        print!("{}", theory_string(&thys, theory, style));
    }

    std::process::exit(errors.min(255) as i32)
}
