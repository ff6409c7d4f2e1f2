// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use config::{ConfigError, ConfigResult, RuleConfig, TARGET_NAME, TARGET_REVISION, TO_PORT_OPTION};
use pipeline::{Family, TargetDesc};
use std::num::NonZero;
use tracing::debug;

/// Descriptor of the rule compiler side of the target. It has to agree with the one of the
/// packet processing side for rules to be installed.
pub const USERSPACE_DESC: TargetDesc = TargetDesc {
    name: TARGET_NAME,
    revision: TARGET_REVISION,
    family: Family::Ipv4,
    size: RuleConfig::SIZE,
};

/// Keyword of the option in rendered rule text
const TO_PORT_KEYWORD: &str = "to-port";

const HELP: &str = "DPORT target options:\n    --to-port port    Destination port to be set\n";

/// Help text for the options of the target.
#[must_use]
pub fn help() -> &'static str {
    HELP
}

fn invalid_value(value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        target: TARGET_NAME,
        option: TO_PORT_OPTION,
        value: value.to_string(),
    }
}

/// Parse the value of `--to-port`: the decimal representation of an integer in `[1, 65535]`.
///
/// Signs, whitespace, radix prefixes and leading zeros are refused.
///
/// # Errors
///
/// Fails with [`ConfigError::InvalidValue`] for anything else.
pub fn parse_option(text: &str) -> Result<RuleConfig, ConfigError> {
    if text.is_empty() || text.starts_with('0') || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid_value(text));
    }
    text.parse::<u16>()
        .ok()
        .and_then(NonZero::new)
        .map(RuleConfig::new)
        .ok_or_else(|| invalid_value(text))
}

/// Check that the mandatory option was given.
///
/// # Errors
///
/// Fails with [`ConfigError::MissingRequiredParameter`] if `saw_option` is false.
pub fn finalize_rule(saw_option: bool) -> ConfigResult {
    if saw_option {
        Ok(())
    } else {
        Err(ConfigError::MissingRequiredParameter {
            target: TARGET_NAME,
            option: TO_PORT_OPTION,
        })
    }
}

/// Render a configuration as rule text.
///
/// The text has a leading and a trailing space so that it can be spliced into a full rule.
#[must_use]
pub fn render(config: &RuleConfig) -> String {
    let port = config.to_port().map_or(0, NonZero::get);
    format!(" {TO_PORT_KEYWORD} {port} ")
}

/// Render a configuration for interactive display.
#[must_use]
pub fn print(config: &RuleConfig) -> String {
    render(config)
}

/// Render a configuration for persistence. [`parse_rule_text`] reads it back.
#[must_use]
pub fn save(config: &RuleConfig) -> String {
    render(config)
}

/// Builds a [`RuleConfig`] from options handed over one at a time.
#[derive(Debug, Default)]
pub struct RuleCompiler {
    config: RuleConfig,
    saw_to_port: bool,
}

impl RuleCompiler {
    /// Create a [`RuleCompiler`] which has seen no option yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one option and its value. A repeated `--to-port` replaces the earlier value.
    ///
    /// # Errors
    ///
    /// Fails with [`ConfigError::UnknownOption`] if the option is not one of the target, or
    /// with [`ConfigError::InvalidValue`] if the value cannot be parsed.
    pub fn parse(&mut self, option: &str, value: &str) -> ConfigResult {
        match option {
            TO_PORT_OPTION | TO_PORT_KEYWORD => {
                self.config = parse_option(value)?;
                self.saw_to_port = true;
                Ok(())
            }
            _ => Err(ConfigError::UnknownOption {
                target: TARGET_NAME,
                option: option.to_string(),
            }),
        }
    }

    /// Complete the rule.
    ///
    /// # Errors
    ///
    /// Fails with [`ConfigError::MissingRequiredParameter`] if `--to-port` was never given.
    pub fn finish(self) -> Result<RuleConfig, ConfigError> {
        finalize_rule(self.saw_to_port)?;
        debug!("Compiled {TARGET_NAME} rule: {}", self.config);
        Ok(self.config)
    }
}

/// Reload rule text produced by [`save`], or written with command-line options.
///
/// Both `to-port 8080` and `--to-port 8080` are understood.
///
/// # Errors
///
/// Fails with [`ConfigError::MissingValue`] if an option has no value, with
/// [`ConfigError::UnknownOption`] for anything which is not an option of the target, and
/// otherwise as [`RuleCompiler::parse`] and [`RuleCompiler::finish`] do.
pub fn parse_rule_text(text: &str) -> Result<RuleConfig, ConfigError> {
    let mut compiler = RuleCompiler::new();
    let mut tokens = text.split_whitespace();
    while let Some(option) = tokens.next() {
        if option != TO_PORT_OPTION && option != TO_PORT_KEYWORD {
            return Err(ConfigError::UnknownOption {
                target: TARGET_NAME,
                option: option.to_string(),
            });
        }
        let value = tokens.next().ok_or(ConfigError::MissingValue {
            target: TARGET_NAME,
            option: TO_PORT_OPTION,
        })?;
        compiler.parse(option, value)?;
    }
    compiler.finish()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::compiler::{
        RuleCompiler, finalize_rule, help, parse_option, parse_rule_text, print, render, save,
    };
    use config::{ConfigError, RuleConfig};
    use pretty_assertions::assert_eq;
    use std::num::NonZero;

    fn port(config: &RuleConfig) -> u16 {
        config.to_port().map_or(0, NonZero::get)
    }

    #[test]
    fn port_boundaries() {
        assert_eq!(port(&parse_option("1").unwrap()), 1);
        assert_eq!(port(&parse_option("65535").unwrap()), 65535);
        for bad in ["0", "65536", "", "abc"] {
            assert_eq!(
                parse_option(bad),
                Err(ConfigError::InvalidValue {
                    target: "DPORT",
                    option: "--to-port",
                    value: bad.to_string(),
                })
            );
        }
    }

    #[test]
    fn only_plain_decimal_is_accepted() {
        for bad in ["+80", "-1", " 80", "80 ", "0x50", "8o", "99999999999999999999"] {
            assert!(parse_option(bad).is_err(), "{bad:?} should be refused");
        }
    }

    #[test]
    fn leading_zeros_are_refused() {
        for bad in ["00080", "080", "01", "00"] {
            assert_eq!(
                parse_option(bad),
                Err(ConfigError::InvalidValue {
                    target: "DPORT",
                    option: "--to-port",
                    value: bad.to_string(),
                })
            );
        }
        assert_eq!(port(&parse_option("80").unwrap()), 80);
        assert_eq!(port(&parse_option("10").unwrap()), 10);
    }

    #[test]
    fn any_u16_text_parses_unless_zero() {
        bolero::check!()
            .with_type::<u16>()
            .cloned()
            .for_each(|value: u16| {
                let parsed = parse_option(&value.to_string());
                assert_eq!(parsed.is_ok(), value != 0);
                if let Ok(config) = parsed {
                    assert_eq!(port(&config), value);
                }
            });
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            parse_option("abc").unwrap_err().to_string(),
            "DPORT: Bad value for \"--to-port\" option: \"abc\""
        );
        assert_eq!(
            finalize_rule(false).unwrap_err().to_string(),
            "DPORT: \"--to-port\" is required."
        );
        assert!(finalize_rule(true).is_ok());
    }

    #[test]
    fn rendered_text_reloads() {
        let config = parse_option("8080").unwrap();
        assert_eq!(render(&config), " to-port 8080 ");
        assert_eq!(print(&config), save(&config));
        assert_eq!(parse_rule_text(&save(&config)).unwrap(), config);
        assert_eq!(parse_rule_text("--to-port 8080").unwrap(), config);
    }

    #[test]
    fn compiler_requires_the_option() {
        assert!(matches!(
            RuleCompiler::new().finish(),
            Err(ConfigError::MissingRequiredParameter { .. })
        ));
        assert!(matches!(
            parse_rule_text("   "),
            Err(ConfigError::MissingRequiredParameter { .. })
        ));
    }

    #[test]
    fn last_option_wins() {
        let mut compiler = RuleCompiler::new();
        compiler.parse("--to-port", "80").unwrap();
        compiler.parse("--to-port", "443").unwrap();
        assert_eq!(port(&compiler.finish().unwrap()), 443);
    }

    #[test]
    fn failed_option_leaves_no_rule() {
        let mut compiler = RuleCompiler::new();
        assert!(compiler.parse("--to-port", "0").is_err());
        assert!(compiler.finish().is_err());
    }

    #[test]
    fn reload_errors() {
        assert!(matches!(
            parse_rule_text("to-port"),
            Err(ConfigError::MissingValue { .. })
        ));
        assert!(matches!(
            parse_rule_text("to-port 80 --to-ports 81"),
            Err(ConfigError::UnknownOption { option, .. }) if option == "--to-ports"
        ));
        assert!(matches!(
            parse_rule_text("to-port 0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            RuleCompiler::new().parse("--from-port", "80"),
            Err(ConfigError::UnknownOption { .. })
        ));
    }

    #[test]
    fn help_text() {
        assert!(help().starts_with("DPORT target options:"));
        assert!(help().contains("--to-port port"));
    }
}
