use std::path::PathBuf;

use clap::Parser;

/// Settings specific to the `api` subcommand (§4.3, §9).
#[derive(Debug, Clone, Parser)]
pub struct CoreOptions {
    /// Path to the YAML file describing the configured auth provider
    /// (§9: `class` + `kwargs`, loaded through the `ProviderRegistry`).
    #[arg(long, env = "NIMBLETOOLS_AUTH_CONFIG")]
    pub auth_config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_core_options_debug_assert() {
        CoreOptions::command().debug_assert();
    }
}
