use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "zetteldev-experiment",
    version,
    about = "Create a new experiment folder (data dirs, design doc, report, Snakefile, main script, test stub, notebook).",
    override_usage = "zetteldev-experiment [OPTIONS] [NAME | ISSUE-NUMBER]",
    after_long_help = "Examples:\n  zetteldev-experiment my-test        # experiments/my-test\n  zetteldev-experiment 42             # experiments/42-<issue-title-slug>\n  zetteldev-experiment                # pick an open issue (terminal) or list them (pipe)\n  zetteldev-experiment --show my-test\n"
)]
pub(crate) struct Cli {
    /// Experiment name, or an issue number to scaffold from the issue tracker
    #[arg(allow_hyphen_values = true)]
    pub(crate) target: Option<String>,

    /// Never prompt; without a target, only list open issues lacking an experiment
    #[arg(long = "non-interactive")]
    pub(crate) non_interactive: bool,

    /// Print the metadata (token, url) of an existing experiment and exit
    #[arg(long, value_name = "NAME", conflicts_with = "target")]
    pub(crate) show: Option<String>,

    /// Print detailed execution info
    #[arg(long)]
    pub(crate) verbose: bool,

    /// Suppress informational stderr output
    #[arg(long, short = 'q')]
    pub(crate) quiet: bool,

    /// Colorize output: auto|always|never
    #[arg(long = "color", value_enum)]
    pub(crate) color: Option<zetteldev_experiment::ColorMode>,
}
