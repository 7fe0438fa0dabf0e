use clap::{Parser, Subcommand};

use crate::models::ChargeMode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Switch an Andersen EV charger between grid and solar charging")]
pub struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, env = "APP_CONFIG", default_value = "config.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP trigger endpoints.
    Serve,

    /// Switch to the given mode (`grid` or `solar`).
    Set {
        #[arg(value_parser = parse_mode)]
        mode: ChargeMode,
    },

    /// Print the current mode.
    Get,

    /// Apply the nightly schedule once, as the scheduled trigger would.
    Schedule,

    /// Apply the shadow's desired mode to the charger.
    Sync,
}

fn parse_mode(value: &str) -> Result<ChargeMode, String> {
    value.parse().map_err(|e| format!("{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set() {
        let args = Args::try_parse_from(["andersen_controller", "set", "Grid"]).unwrap();
        match args.command {
            Command::Set { mode } => assert_eq!(mode, ChargeMode::Grid),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_mode() {
        assert!(Args::try_parse_from(["andersen_controller", "set", "wind"]).is_err());
    }

    #[test]
    fn test_config_flag() {
        let args =
            Args::try_parse_from(["andersen_controller", "--config", "/etc/ev.toml", "schedule"])
                .unwrap();
        assert_eq!(args.config, "/etc/ev.toml");
        assert!(matches!(args.command, Command::Schedule));
    }
}
