// Device configuration
// Describes a tablet model: digitizer and pen specifications, report length
// and which parser decodes its reports. Loaded from JSON or built in.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tablet_report::{tables, DispatchTable};
use tracing::info;

use crate::builtin::paths;
use crate::error::LoadError;

/// Digitizer dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitizerSpecifications {
    /// Active area width in millimeters
    pub width: f32,
    /// Active area height in millimeters
    pub height: f32,
    /// Highest X coordinate the digitizer reports
    pub max_x: u32,
    /// Highest Y coordinate the digitizer reports
    pub max_y: u32,
}

impl DigitizerSpecifications {
    /// Convert a position in device units to millimeters
    pub fn to_millimeters(&self, x: u32, y: u32) -> (f32, f32) {
        (
            x as f32 / self.max_x as f32 * self.width,
            y as f32 / self.max_y as f32 * self.height,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonSpecifications {
    pub button_count: u8,
}

/// Device specifications for a pen tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PenSpecifications {
    /// The maximum pressure that the pen supports
    pub max_pressure: u32,
    /// Specifications for the pen buttons
    #[serde(default)]
    pub buttons: ButtonSpecifications,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabletSpecifications {
    pub digitizer: DigitizerSpecifications,
    #[serde(default)]
    pub pen: Option<PenSpecifications>,
    #[serde(default)]
    pub auxiliary_buttons: Option<ButtonSpecifications>,
}

/// One tablet model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabletConfiguration {
    /// Display name, also the device's profile identity
    pub name: String,
    pub specifications: TabletSpecifications,
    /// Length of the reports the device sends
    pub report_length: usize,
    /// Path of the report parser plugin
    pub report_parser: String,
    /// Dispatch table for the configurable parser
    #[serde(default)]
    pub dispatch: Option<DispatchTable>,
}

impl TabletConfiguration {
    /// Load a configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::load_from_json(&content)?;
        info!(name = %config.name, path = %path.as_ref().display(), "Loaded tablet configuration");
        Ok(config)
    }

    /// Load a configuration from a JSON string
    pub fn load_from_json(json: &str) -> Result<Self, LoadError> {
        let config: TabletConfiguration = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration data
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.name.trim().is_empty() {
            return Err(LoadError::Validation("name is empty".into()));
        }
        if self.report_parser.is_empty() {
            return Err(LoadError::Validation(format!(
                "{}: report parser is empty",
                self.name
            )));
        }

        let digitizer = &self.specifications.digitizer;
        if digitizer.max_x == 0 || digitizer.max_y == 0 {
            return Err(LoadError::Validation(format!(
                "{}: digitizer max X/Y must be non-zero",
                self.name
            )));
        }
        if !(digitizer.width > 0.0 && digitizer.height > 0.0) {
            return Err(LoadError::Validation(format!(
                "{}: digitizer dimensions must be positive",
                self.name
            )));
        }

        if let Some(table) = &self.dispatch {
            table
                .validate()
                .map_err(|e| LoadError::Validation(format!("{}: {e}", self.name)))?;
            let needed = table.min_report_len();
            if needed > self.report_length {
                return Err(LoadError::Validation(format!(
                    "{}: dispatch table reads {} bytes but reports are {} bytes",
                    self.name, needed, self.report_length
                )));
            }
        }

        Ok(())
    }

    /// Pressure value mapped to full pressure, 1 for pens without pressure
    pub fn max_pressure(&self) -> u32 {
        self.specifications
            .pen
            .as_ref()
            .map(|p| p.max_pressure.max(1))
            .unwrap_or(1)
    }
}

/// A connected tablet
///
/// Identity is the configuration's display name: two devices of the same
/// model share one profile.
#[derive(Debug, Clone, PartialEq)]
pub struct InputDevice {
    configuration: TabletConfiguration,
}

impl InputDevice {
    pub fn new(configuration: TabletConfiguration) -> Self {
        Self { configuration }
    }

    /// Identity used for profile lookup
    pub fn name(&self) -> &str {
        &self.configuration.name
    }

    pub fn configuration(&self) -> &TabletConfiguration {
        &self.configuration
    }

    pub fn specifications(&self) -> &TabletSpecifications {
        &self.configuration.specifications
    }
}

/// Huion New 1060 Plus
pub fn huion_new_1060_plus() -> TabletConfiguration {
    TabletConfiguration {
        name: "Huion New 1060 Plus".to_string(),
        specifications: TabletSpecifications {
            digitizer: DigitizerSpecifications {
                width: 254.0,
                height: 158.75,
                max_x: 50800,
                max_y: 31750,
            },
            pen: Some(PenSpecifications {
                max_pressure: 8191,
                buttons: ButtonSpecifications { button_count: 2 },
            }),
            auxiliary_buttons: Some(ButtonSpecifications { button_count: 12 }),
        },
        report_length: 12,
        report_parser: paths::NEW_1060_PLUS_PARSER.to_string(),
        dispatch: None,
    }
}

/// Configuration for an unknown tablet sending generic pen reports
pub fn generic(
    name: &str,
    digitizer: DigitizerSpecifications,
    max_pressure: u32,
) -> TabletConfiguration {
    TabletConfiguration {
        name: name.to_string(),
        specifications: TabletSpecifications {
            digitizer,
            pen: Some(PenSpecifications {
                max_pressure,
                buttons: ButtonSpecifications { button_count: 2 },
            }),
            auxiliary_buttons: None,
        },
        report_length: tables::generic().min_report_len(),
        report_parser: paths::TABLET_REPORT_PARSER.to_string(),
        dispatch: None,
    }
}

/// All built-in configurations
pub fn builtin_configurations() -> Vec<TabletConfiguration> {
    vec![huion_new_1060_plus()]
}
