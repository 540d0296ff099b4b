use crate::replay::{run_demo, run_replay, validate_rubric, DemoArgs, ReplayArgs, ValidateArgs};
use clap::{Parser, Subcommand};
use interview_assessor::config::AppConfig;
use interview_assessor::error::AppError;
use interview_assessor::telemetry;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "Interview Assessor",
    about = "Score recorded interviews against weighted rubrics and print hiring reports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Inspect rubric templates
    Rubric {
        #[command(subcommand)]
        command: RubricCommand,
    },
    /// Replay a recorded interview through the assessment engine
    Replay(ReplayArgs),
    /// Replay the bundled backend engineer interview
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum RubricCommand {
    /// Load a template, validate it and print its dimensions
    Validate(ValidateArgs),
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, config.environment)?;
    debug!(
        environment = ?config.environment,
        template_dirs = ?config.assessment.template_dirs,
        "configuration loaded"
    );

    match cli.command {
        Command::Rubric {
            command: RubricCommand::Validate(args),
        } => validate_rubric(&config, args),
        Command::Replay(args) => run_replay(&config, args).await,
        Command::Demo(args) => run_demo(&config, args).await,
    }
}
