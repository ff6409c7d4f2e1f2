// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use crate::compiler::RuleCompiler;
use config::{ConfigError, RuleConfig, TO_PORT_OPTION};

/// Command-line options of the DPORT target, for embedding in a front end.
///
/// The value is kept as given and only interpreted by [`DportArgs::compile`], so that errors
/// are reported in the same terms as rule text errors.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct DportArgs {
    #[arg(
        long = "to-port",
        value_name = "port",
        help = "Destination port to be set, in [1..65535]"
    )]
    to_port: Option<String>,
}

impl DportArgs {
    /// Arguments holding the given `--to-port` value.
    #[must_use]
    pub fn with_to_port(value: &str) -> Self {
        Self {
            to_port: Some(value.to_string()),
        }
    }

    /// Whether `--to-port` was given at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_port.is_none()
    }

    /// Compile the options into a [`RuleConfig`].
    ///
    /// # Errors
    ///
    /// Fails if `--to-port` is missing or invalid.
    pub fn compile(&self) -> Result<RuleConfig, ConfigError> {
        let mut compiler = RuleCompiler::new();
        if let Some(value) = &self.to_port {
            compiler.parse(TO_PORT_OPTION, value)?;
        }
        compiler.finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::DportArgs;
    use clap::Parser;
    use config::ConfigError;

    #[derive(Parser, Debug)]
    struct Cli {
        #[command(flatten)]
        dport: DportArgs,
    }

    #[test]
    fn parses_from_command_line() {
        let cli = Cli::try_parse_from(["test", "--to-port", "8080"]).unwrap();
        assert_eq!(cli.dport.compile().unwrap().to_string(), "to-port 8080");
    }

    #[test]
    fn invalid_value_uses_target_wording() {
        let cli = Cli::try_parse_from(["test", "--to-port", "http"]).unwrap();
        assert_eq!(
            cli.dport.compile().unwrap_err().to_string(),
            "DPORT: Bad value for \"--to-port\" option: \"http\""
        );
    }

    #[test]
    fn missing_option() {
        let cli = Cli::try_parse_from(["test"]).unwrap();
        assert!(cli.dport.is_empty());
        assert!(matches!(
            cli.dport.compile(),
            Err(ConfigError::MissingRequiredParameter { .. })
        ));
    }

    #[test]
    fn programmatic() {
        assert!(DportArgs::with_to_port("1").compile().is_ok());
        assert!(DportArgs::with_to_port("65536").compile().is_err());
    }
}
