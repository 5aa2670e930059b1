use crate::{oneshot, session};
use clap::{Args, Parser, Subcommand};
use plz_lookup::config::{AppConfig, DirectoryConfig};
use plz_lookup::error::AppError;
use plz_lookup::{telemetry, AddressLookupController, OpenPlzClient, Page};
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "plz-lookup",
    about = "Resolve German localities and postal codes (PLZ) against the OpenPLZ directory",
    version
)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill the form line by line from stdin (default command)
    Interactive,
    /// Look up a locality name and print the resulting form state as JSON
    Locality { name: String },
    /// Look up a postal code and print the resulting form state as JSON
    PostalCode { code: String },
}

#[derive(Args, Debug, Default)]
struct Overrides {
    /// Override the configured directory base URL
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Override the quiet period before a lookup fires, in milliseconds
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,
    /// Result page to request (1-based)
    #[arg(long, global = true)]
    page: Option<Page>,
}

impl Overrides {
    fn apply(&mut self, config: &mut AppConfig) -> Result<(), AppError> {
        if let Some(base_url) = self.base_url.take() {
            config.directory = DirectoryConfig::new(base_url)?;
        }
        if let Some(debounce_ms) = self.debounce_ms {
            config.lookup.debounce = Duration::from_millis(debounce_ms);
        }
        Ok(())
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let mut cli = Cli::parse();
    let mut config = AppConfig::load()?;
    cli.overrides.apply(&mut config)?;

    telemetry::init(&config.telemetry)?;

    let client = OpenPlzClient::new(&config.directory)?;
    let controller = AddressLookupController::new(client, config.lookup);
    if let Some(page) = cli.overrides.page {
        controller.set_page(page);
    }

    info!(
        ?config.environment,
        base_url = %config.directory.base_url,
        debounce_ms = config.lookup.debounce.as_millis() as u64,
        "postal code lookup ready"
    );

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Interactive => session::run(&controller).await,
        Command::Locality { name } => {
            controller.on_locality_edit(name);
            oneshot::print_settled(&controller).await;
            Ok(())
        }
        Command::PostalCode { code } => {
            controller.on_postal_code_edit(code);
            oneshot::print_settled(&controller).await;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "plz-lookup",
            "locality",
            "Berlin",
            "--page",
            "2",
            "--debounce-ms",
            "0",
        ])
        .expect("arguments parse");

        assert_eq!(cli.overrides.page, Page::new(2).ok());
        assert_eq!(cli.overrides.debounce_ms, Some(0));
        assert!(matches!(cli.command, Some(Command::Locality { ref name }) if name == "Berlin"));
    }

    #[test]
    fn page_zero_is_rejected_by_the_parser() {
        let result = Cli::try_parse_from(["plz-lookup", "--page", "0", "postal-code", "80331"]);
        assert!(result.is_err());
    }

    #[test]
    fn defaults_to_interactive_session() {
        let cli = Cli::try_parse_from(["plz-lookup"]).expect("no arguments parse");
        assert!(cli.command.is_none());
    }
}
