use std::path::PathBuf;

use pkgwiz::defaults::{self, WizardConfig};
use pkgwiz::validation;

pub type CmdResult<T> = pkgwiz::Result<(T, i32)>;

pub(crate) struct GlobalArgs {
    pub project: Option<String>,
}

impl GlobalArgs {
    /// Project root: `--project` when given, otherwise the working directory.
    pub fn project_root(&self) -> pkgwiz::Result<PathBuf> {
        let root = match self.project.as_deref() {
            Some(raw) => validation::expand_path(raw),
            None => std::env::current_dir().map_err(|e| {
                pkgwiz::Error::internal_io(e.to_string(), Some("read working directory".to_string()))
            })?,
        };

        validation::require_directory(&root, "project")?;
        Ok(root)
    }

    pub fn load_config(&self) -> pkgwiz::Result<(PathBuf, WizardConfig)> {
        let root = self.project_root()?;
        let config = defaults::load_config(&root)?;
        Ok((root, config))
    }
}

pub mod config;
pub mod rename;
pub mod validate;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (pkgwiz::Result<serde_json::Value>, i32) {
    crate::tty::status("pkgwiz is working...");

    match command {
        crate::Commands::Validate(args) => dispatch!(args, global, validate),
        crate::Commands::Rename(args) => dispatch!(args, global, rename),
        crate::Commands::Config(args) => dispatch!(args, global, config),
    }
}
