use clap::Parser;
use kctl::capabilities::Capabilities;
use kctl::cli::Cli;
use kctl::commands::{KubeConnector, Settings, handle_command};
use kctl::console::Console;
use kctl::error::finish;
use kctl_core::crypto::init_crypto;
use kctl_core::instrumentation::init_instrumentation;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_crypto();
    init_instrumentation(cli.verbose);

    let settings = Settings::from_cli(&cli);
    let capabilities = Capabilities::detect();
    let mut console = Console::stdio();

    let result = handle_command(
        &cli.command,
        &settings,
        &capabilities,
        &KubeConnector,
        &mut console,
    )
    .await;

    ExitCode::from(finish(result, &mut console))
}
