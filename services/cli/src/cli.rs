use crate::commands::{
    run_classify, run_guard, run_validate, run_value, ClassifyArgs, GuardArgs, ValidateArgs,
    ValueArgs,
};
use crate::demo::{run_demo, DemoArgs};
use crate::infra::page_surface;
use carhub::config::AppConfig;
use carhub::error::AppError;
use carhub::telemetry;
use clap::{Parser, Subcommand};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "carhub",
    about = "Drive the CarHub form guards, car valuation, and news classifier from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate a car's market value
    Value(ValueArgs),
    /// Ask the classification service whether a news text is fake
    Classify(ClassifyArgs),
    /// Check one value against a single validation rule
    Validate(ValidateArgs),
    /// Run a form guard against submitted field values
    Guard(GuardArgs),
    /// Walk through every workflow using an in-process classifier
    Demo(DemoArgs),
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(environment = ?config.environment, "configuration loaded");

    let surface = page_surface(&config);
    match cli.command {
        Command::Value(args) => run_value(args, &config, surface).await,
        Command::Classify(args) => run_classify(args, config, surface).await,
        Command::Validate(args) => {
            run_validate(args);
            Ok(())
        }
        Command::Guard(args) => {
            run_guard(args, &surface);
            Ok(())
        }
        Command::Demo(args) => run_demo(args, &config, surface).await,
    }
}
