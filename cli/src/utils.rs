use std::path::PathBuf;

use bxcount_core::Input;
use clap::CommandFactory;

use crate::Cli;

/// Returns the sites input, failing with a usage error if no sites file is provided and stdin is
/// an interactive terminal.
pub fn sites_input(sites: Option<PathBuf>) -> Result<Input, clap::Error> {
    Input::new(sites)
        .map_err(|e| Cli::command().error(clap::error::ErrorKind::TooFewValues, e))
}
