//! Tablet Driver CLI
//!
//! Inspect plugins, decode reports and manage device profiles.

use clap::Parser;
use tracing::info;

use tablet_driver::device::{self, InputDevice, TabletConfiguration};
use tablet_driver::tablet_report::{RawReport, ReportParser, ReportVariant};
use tablet_driver::{
    plugin_registry, CapabilityContract, PluginContext, PluginFactory, ProfileCollection,
};

// CLI definitions
mod cli;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tablet_driver=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let configuration = match &cli.config {
        Some(path) => TabletConfiguration::load_from_file(path)?,
        None => device::huion_new_1060_plus(),
    };
    let device = InputDevice::new(configuration);

    match cli.command {
        Commands::Plugins { contract } => list_plugins(contract.map(Into::into)),
        Commands::Decode { report } => decode(&device, report.0)?,
        Commands::Profile { file } => show_profile(&device, file.as_deref())?,
    }

    Ok(())
}

fn list_plugins(contract: Option<CapabilityContract>) {
    let registry = plugin_registry();
    let contracts = match contract {
        Some(c) => vec![c],
        None => CapabilityContract::ALL.to_vec(),
    };

    for contract in contracts {
        println!("{contract}:");
        for descriptor in registry.query(contract) {
            match descriptor.display_name() {
                Some(name) => println!("  {:<50} {name}", descriptor.path()),
                None => println!("  {}", descriptor.path()),
            }
        }
    }
}

fn decode(device: &InputDevice, bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
    let config = device.configuration();
    let factory = PluginFactory::new(plugin_registry());
    let parser: Box<dyn ReportParser> =
        factory.try_construct(&config.report_parser, None, &PluginContext::for_device(device))?;

    if bytes.len() != config.report_length {
        info!(
            expected = config.report_length,
            actual = bytes.len(),
            "Report length differs from the device's"
        );
    }

    let variant = parser.parse(&RawReport::from(bytes))?;
    println!("{}", variant.kind());
    match &variant {
        ReportVariant::Auxiliary(aux) => println!("  aux buttons: {:?}", aux.aux_buttons),
        ReportVariant::Baseline(r) | ReportVariant::ModelSpecific(r) => {
            println!("  position:    ({}, {})", r.position.x, r.position.y);
            println!("  pressure:    {}", r.pressure);
            println!("  pen buttons: {:?}", r.pen_buttons);
        }
    }
    Ok(())
}

fn show_profile(
    device: &InputDevice,
    file: Option<&std::path::Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let profiles = match file {
        Some(path) if path.exists() => ProfileCollection::load_from_file(path)?,
        _ => ProfileCollection::new(),
    };

    let profile = profiles.get_or_create_defaults(device, plugin_registry());
    println!("{}", serde_json::to_string_pretty(&profile)?);

    if let Some(path) = file {
        profiles.save_to_file(path)?;
    }
    Ok(())
}
