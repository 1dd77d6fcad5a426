use anyhow::{Context, Result};
use clap::Parser;
use git_semver::config::{load_config, Configuration, CONFIG_FILE_NAME};
use git_semver::git::Git2Repository;
use git_semver::ui::{self, OutputFormat};
use git_semver::VersionCalculator;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "GIT_SEMVER_LOG";

#[derive(clap::Parser)]
#[command(
    name = "git-semver",
    version,
    about = "Calculate the semantic version of a commit from git history"
)]
struct Args {
    #[arg(short, long, default_value = ".", help = "Repository path")]
    path: PathBuf,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Branch to version the commit as")]
    branch: Option<String>,

    #[arg(long, help = "Commit to version instead of HEAD")]
    commit: Option<String>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,

    #[arg(short, long, help = "Log calculation steps to stderr")]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("git_semver=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let repo = Git2Repository::open(&args.path)
        .with_context(|| format!("cannot open repository at {}", args.path.display()))?;

    let in_repo = args.path.join(CONFIG_FILE_NAME);
    let config_path = match &args.config {
        Some(path) => Some(path.clone()),
        None if in_repo.exists() => Some(in_repo),
        None => None,
    };
    let config = load_config(config_path.as_deref()).context("cannot load configuration")?;
    let configuration = Configuration::build(&config).context("invalid configuration")?;

    let target = match &args.commit {
        Some(rev) => Some(repo.resolve(rev)?),
        None => None,
    };

    let calculation =
        VersionCalculator::new(&repo, &configuration).calculate(target, args.branch.as_deref())?;

    ui::display_warnings(&calculation.warnings);
    ui::display_version(&calculation.info, args.output)?;
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
