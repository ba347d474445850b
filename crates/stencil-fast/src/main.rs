use std::process::ExitCode;

use stencil_fast::cli::parse_cli;
use stencil_fast::settings::resolve_settings;
use stencil_fast::{logging, pipeline};
use tracing::error;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let (cli, sources) = parse_cli();
    logging::init(cli.debug);

    let settings = match resolve_settings(&cli, &sources) {
        Ok(settings) => settings,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(path) = &settings.config_path {
        tracing::debug!(config = %path.display(), "loaded configuration");
    }

    let plan = pipeline::build_plan(&cli.inputs, &settings);
    let summary = pipeline::run(plan).await;
    if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
