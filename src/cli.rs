use crate::{ApiOptions, ControllerOptions, CoreOptions, TracingOptions};
use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Command-line options for nimbletools-core
#[derive(Debug, Clone, Parser)]
#[command(
    name = "nimbletools-core",
    about,
    version,
    color = ColorChoice::Always,
    after_help = "For more information, visit https://github.com/nimbletools/core",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Tracing configuration options
    #[command(flatten)]
    pub tracing_options: TracingOptions,
}

/// Commands supported by nimbletools-core
#[derive(Debug, Clone, Parser)]
pub enum Command {
    /// Run the Kubernetes operator reconciling `MCPService` resources
    #[command(name = "operator")]
    Operator {
        #[command(flatten)]
        controller_options: ControllerOptions,
    },

    /// Run the control-plane API without the operator
    #[command(name = "api")]
    Api {
        #[command(flatten)]
        controller_options: ControllerOptions,

        #[command(flatten)]
        api_options: ApiOptions,

        #[command(flatten)]
        core_options: CoreOptions,
    },

    /// Export the `MCPService` CRD or its JSON Schema
    #[command(name = "export")]
    Export {
        /// Type of resource to export: crd or schema
        #[arg(short, long, value_parser = ["crd", "schema"])]
        r#type: String,

        /// Output format: json or yaml
        #[arg(short, long, default_value = "yaml", value_parser = ["json", "yaml"])]
        format: String,

        /// Output file (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
