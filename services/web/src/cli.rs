use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_approval::application::FEATURE_NAMES;
use loan_approval::categories::CategoricalField;
use loan_approval::config::{AppConfig, ModelConfig};
use loan_approval::error::AppError;
use loan_approval::{telemetry, PredictionContext};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Approval Advisor",
    about = "Serve the loan approval form or inspect the loaded model schema",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the feature order and category orderings of the configured model
    Schema(ModelArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) model: ModelArgs,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ModelArgs {
    /// Override the configured model artifact path
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Reference dataset used to verify category orderings
    #[arg(long)]
    pub(crate) reference_csv: Option<PathBuf>,
}

impl ModelArgs {
    pub(crate) fn apply(self, config: &mut ModelConfig) {
        if let Some(path) = self.model {
            config.artifact_path = path;
        }
        if let Some(path) = self.reference_csv {
            config.reference_dataset = Some(path);
        }
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Schema(args) => run_schema(args),
    }
}

fn run_schema(args: ModelArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    args.apply(&mut config.model);
    telemetry::init(&config.telemetry)?;

    let context = PredictionContext::bootstrap(&config.model)?;
    print!("{}", schema_report(&context));
    Ok(())
}

fn schema_report(context: &PredictionContext) -> String {
    let mut report = format!(
        "Model: {}\nCategory source: {}\n\nFeature order\n",
        context.model_name(),
        context.category_source()
    );
    for (position, name) in FEATURE_NAMES.iter().enumerate() {
        report.push_str(&format!("{position:>2}. {name}\n"));
    }

    report.push_str("\nCategory encodings\n");
    for field in CategoricalField::ALL {
        let values = context
            .catalog()
            .domain(field)
            .values()
            .iter()
            .enumerate()
            .map(|(index, value)| format!("{index}={value}"))
            .collect::<Vec<_>>()
            .join(", ");
        report.push_str(&format!("- {}: {}\n", field.column(), values));
    }

    report
}
