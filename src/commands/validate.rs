use clap::Args;
use serde::Serialize;

use pkgwiz::identity::{self, IdentityValidation};

use super::CmdResult;

#[derive(Args)]
pub struct ValidateArgs {
    /// Company name (first domain segment after the prefix)
    #[arg(long)]
    pub company: String,

    /// Package name (last domain segment, and the module name prefix)
    #[arg(long)]
    pub package: String,

    /// Domain prefix (default: `domainPrefix` from pkgwiz.json)
    #[arg(long)]
    pub prefix: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ValidateOutput {
    command: String,
    #[serde(flatten)]
    validation: IdentityValidation,
}

/// Exit 0 when the identity is usable, 2 otherwise.
pub fn run(args: ValidateArgs, global: &crate::commands::GlobalArgs) -> CmdResult<ValidateOutput> {
    let prefix = match args.prefix {
        Some(prefix) => prefix,
        None => global.load_config()?.1.domain_prefix,
    };

    let validation = identity::validate_identity(&args.company, &args.package, &prefix);
    let exit_code = if validation.usable { 0 } else { 2 };

    Ok((
        ValidateOutput {
            command: "validate".to_string(),
            validation,
        },
        exit_code,
    ))
}
