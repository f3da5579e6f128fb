use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(mode) = cli.color {
        zetteldev_experiment::set_color_mode(mode);
    }
    zetteldev_experiment::init_logging(cli.verbose, zetteldev_experiment::color_enabled_stderr());

    if let Some(name) = cli.show.as_deref() {
        return commands::run_show_command(name);
    }
    commands::run_scaffold_command(&cli)
}
