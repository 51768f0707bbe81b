//! CLI Module
//!
//! Command-line interface for crabgate using Clap v4.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::{self, GatePaths};
use crate::error::WizardError;
use crate::wizard::delegates::GateDelegates;
use crate::wizard::prompts::{InteractivePrompter, NonInteractivePrompter, Prompter};
use crate::wizard::{OnboardOptions, WizardOutcome, run_wizard};

/// crabgate - Local Message Gateway
#[derive(Parser, Debug)]
#[command(name = "crabgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the setup wizard (default)
    Onboard(OnboardArgs),

    /// Show the persisted configuration
    Config {
        /// Include secrets instead of redacting them
        #[arg(short, long)]
        show_secrets: bool,
    },

    /// Validate the persisted configuration and list problems
    Doctor,
}

#[derive(clap::Args, Debug, Default, Clone)]
pub struct OnboardArgs {
    /// Wizard flow: quickstart, advanced (alias: manual)
    #[arg(long)]
    pub flow: Option<String>,

    /// Gateway mode
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Agent workspace directory
    #[arg(long)]
    pub workspace: Option<String>,

    /// Authentication method, skipping the auth prompt
    #[arg(long)]
    pub auth_choice: Option<String>,

    /// Skip the risk acknowledgement prompt
    #[arg(long)]
    pub accept_risk: bool,

    /// Skip channel setup
    #[arg(long)]
    pub skip_channels: bool,

    /// Skip skill setup
    #[arg(long)]
    pub skip_skills: bool,

    /// Locale tag (e.g. en, zh-CN)
    #[arg(long)]
    pub locale: Option<String>,

    /// Answer every prompt with its default
    #[arg(long)]
    pub non_interactive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModeArg {
    Local,
    Remote,
}

/// Main CLI entry point
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = GatePaths::resolve();

    match cli.command {
        None => cmd_onboard(OnboardArgs::default(), &paths).await,
        Some(Commands::Onboard(args)) => cmd_onboard(args, &paths).await,
        Some(Commands::Config { show_secrets }) => cmd_config(&paths, show_secrets),
        Some(Commands::Doctor) => cmd_doctor(&paths),
    }
}

async fn cmd_onboard(args: OnboardArgs, paths: &GatePaths) -> Result<()> {
    let opts = OnboardOptions::from_args(&args);
    let delegates = GateDelegates::new();

    let interactive;
    let non_interactive;
    let prompter: &dyn Prompter = if args.non_interactive {
        non_interactive = NonInteractivePrompter;
        &non_interactive
    } else {
        interactive = InteractivePrompter::new();
        &interactive
    };

    match run_wizard(&opts, prompter, &delegates, paths).await {
        Ok(WizardOutcome::Completed) | Ok(WizardOutcome::RemoteConfigured) => Ok(()),
        Ok(WizardOutcome::InvalidConfig) => std::process::exit(1),
        Err(e) if e.is_cancelled() => {
            eprintln!("Setup cancelled. Run `crabgate onboard` to pick up where you left off.");
            Ok(())
        }
        Err(WizardError::InvalidFlow(flow)) => {
            eprintln!("Unrecognized --flow value: {flow} (expected quickstart, advanced, or manual)");
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_config(paths: &GatePaths, show_secrets: bool) -> Result<()> {
    let snapshot = config::load_snapshot(paths);
    if !snapshot.exists {
        println!("No configuration found at {}", paths.config_path().display());
        println!("Run `crabgate onboard` to create one.");
        return Ok(());
    }
    if !snapshot.valid {
        eprintln!("Configuration is invalid; run `crabgate doctor` for details.");
        std::process::exit(1);
    }

    let doc = if show_secrets {
        snapshot.config
    } else {
        snapshot.config.redacted()
    };
    print!("{}", toml::to_string_pretty(&doc)?);
    Ok(())
}

fn cmd_doctor(paths: &GatePaths) -> Result<()> {
    let snapshot = config::load_snapshot(paths);
    if !snapshot.exists {
        println!("No configuration found at {}", paths.config_path().display());
        return Ok(());
    }
    if snapshot.valid {
        println!("Configuration OK ({})", paths.config_path().display());
        let summary = snapshot.config.summarize();
        if !summary.is_empty() {
            println!("{summary}");
        }
        return Ok(());
    }

    eprintln!(
        "Found {} problem(s) in {}:",
        snapshot.issues.len(),
        paths.config_path().display()
    );
    for issue in &snapshot.issues {
        if issue.path.is_empty() {
            eprintln!("  - {}", issue.message);
        } else {
            eprintln!("  - {}: {}", issue.path, issue.message);
        }
    }
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn onboard_flags_parse() {
        let cli = Cli::parse_from([
            "crabgate",
            "onboard",
            "--flow",
            "manual",
            "--mode",
            "remote",
            "--accept-risk",
            "--non-interactive",
        ]);
        match cli.command {
            Some(Commands::Onboard(args)) => {
                assert_eq!(args.flow.as_deref(), Some("manual"));
                assert_eq!(args.mode, Some(ModeArg::Remote));
                assert!(args.accept_risk);
                assert!(args.non_interactive);
                assert!(!args.skip_channels);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
