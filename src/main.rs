use clap::Parser;
use kube::CustomResourceExt;
use nimbletools_core::{install_tracing, serialize};
use nimbletools_core::{Api, Cli, Command, Controller, MCPService, ProviderConfig, ProviderRegistry, Result, ResultExt};
use tokio::fs::File;
use tokio::io::{stdout, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

/// Main entry point for nimbletools-core
#[tokio::main]
async fn main() -> Result<()> {
    let arguments = Cli::parse();
    install_tracing(&arguments.tracing_options);

    // --- Start the operator or API server based on the command
    let result = match arguments.command {
        // Run the reconciler under leader election until the process is signalled to stop.
        Command::Operator { controller_options } => {
            let controller = Controller::new(&controller_options).await?;
            let shutdown = CancellationToken::new();
            let watcher = shutdown.clone();
            tokio::spawn(async move {
                let _ = tokio::signal::ctrl_c().await;
                watcher.cancel();
            });
            nimbletools_core::run_with_leader_election(controller, shutdown).await
        }
        // Start the control-plane API server.
        Command::Api {
            controller_options,
            api_options,
            core_options,
        } => {
            let controller = Controller::new(&controller_options).await?;
            let provider_config = ProviderConfig::from_path(&core_options.auth_config).await?;
            let auth_provider = ProviderRegistry::new().load(&provider_config).await?;
            let api = Api::new(api_options, controller, auth_provider);
            api.start().await
        }
        // Export the CRD or its JSON Schema.
        Command::Export { r#type, format, output } => {
            let serialized = match r#type.as_str() {
                "crd" => serialize(&MCPService::crd(), &format)?,
                "schema" => serialize(&schemars::schema_for!(MCPService), &format)?,
                other => {
                    return Err(nimbletools_core::Error::validation(format!("Invalid export type: {other}")));
                }
            };

            // --- Write to file or stdout
            match output {
                None => stdout()
                    .write_all(serialized.as_bytes())
                    .await
                    .with_message("Could not write to stdout"),

                // If an output file is specified, write to that file.
                Some(path) => {
                    let mut file = File::create(path)
                        .await
                        .with_message("Could not create output file")?;

                    file.write_all(serialized.as_bytes())
                        .await
                        .with_message("Could not write to output file")
                }
            }
        }
    };

    if let Err(error) = result {
        error.trace();
    };

    Ok(())
}
