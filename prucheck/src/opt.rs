use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Clone, Debug, StructOpt)]
/// A proof checker for a small higher-order logic
pub struct Opt {
    /// Stop at the first statement that fails to verify
    ///
    /// By default, every statement of the theory is checked and
    /// all failures are reported.
    #[structopt(long)]
    pub fail_fast: bool,

    /// Theory file to verify
    #[structopt(name = "FILE")]
    pub file: PathBuf,

    /// Rules file providing the inference rules for the theory's proofs
    #[structopt(name = "RULES", default_value = "basic/rules.lth")]
    pub rules: PathBuf,
}
