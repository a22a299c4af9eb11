// CLI definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use tablet_driver::CapabilityContract;

#[derive(Parser)]
#[command(name = "tablet_driver")]
#[command(author, version, about = "Graphics tablet input pipeline")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Tablet configuration file (defaults to the built-in Huion New 1060 Plus)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List discoverable plugins
    #[command(visible_aliases = ["ls", "l"])]
    Plugins {
        /// Only show plugins implementing this contract
        #[arg(short, long, value_enum)]
        contract: Option<ContractArg>,
    },

    /// Decode one raw report with the device's parser
    #[command(visible_aliases = ["dec", "d"])]
    Decode {
        /// Report bytes as hex (e.g. "08 02 10 00 20 00 00 00")
        #[arg(value_parser = parse_report)]
        report: HexReport,
    },

    /// Show the device's profile, creating defaults if needed
    #[command(visible_aliases = ["prof", "p"])]
    Profile {
        /// Profiles file to read and save back to
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ContractArg {
    ReportParser,
    OutputMode,
    Filter,
}

impl From<ContractArg> for CapabilityContract {
    fn from(arg: ContractArg) -> Self {
        match arg {
            ContractArg::ReportParser => CapabilityContract::ReportParser,
            ContractArg::OutputMode => CapabilityContract::OutputMode,
            ContractArg::Filter => CapabilityContract::Filter,
        }
    }
}

/// Report bytes given on the command line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HexReport(pub Vec<u8>);

fn parse_report(s: &str) -> Result<HexReport, String> {
    parse_hex(s).map(HexReport)
}

/// Parse hex bytes, ignoring whitespace and an optional 0x prefix
pub fn parse_hex(s: &str) -> Result<Vec<u8>, String> {
    let digits: String = s.split_whitespace().collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(&digits);

    if digits.is_empty() {
        return Err("empty report".to_string());
    }
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits ({})", digits.len()));
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            let pair = digits.get(i..i + 2).ok_or("invalid hex")?;
            u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte '{pair}'"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("08 02 10 00").unwrap(), vec![0x08, 0x02, 0x10, 0x00]);
        assert_eq!(parse_hex("0x0840").unwrap(), vec![0x08, 0x40]);
        assert!(parse_hex("").is_err());
        assert!(parse_hex("080").is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn test_decode_args() {
        let cli = Cli::try_parse_from(["tablet_driver", "decode", "08 40 00 00 01 00"]).unwrap();
        match cli.command {
            Commands::Decode { report } => assert_eq!(report.0, vec![0x08, 0x40, 0, 0, 1, 0]),
            _ => panic!("Expected Decode command"),
        }
    }

    #[test]
    fn test_plugins_contract_arg() {
        let cli =
            Cli::try_parse_from(["tablet_driver", "plugins", "--contract", "output-mode"]).unwrap();
        match cli.command {
            Commands::Plugins { contract } => assert_eq!(contract, Some(ContractArg::OutputMode)),
            _ => panic!("Expected Plugins command"),
        }
    }
}
