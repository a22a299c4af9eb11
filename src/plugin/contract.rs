// Capability contracts
// The fixed set of plugin families the pipeline knows how to use

use std::fmt;

use tablet_report::ReportParser;

use crate::filter::Filter;
use crate::output::OutputMode;

/// Plugin family a descriptor belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityContract {
    /// Decodes raw reports into typed reports
    ReportParser,
    /// Turns tablet reports into pointer state
    OutputMode,
    /// Post-processes pointer state
    Filter,
}

impl CapabilityContract {
    pub const ALL: [CapabilityContract; 3] = [
        CapabilityContract::ReportParser,
        CapabilityContract::OutputMode,
        CapabilityContract::Filter,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ReportParser => "report parser",
            Self::OutputMode => "output mode",
            Self::Filter => "filter",
        }
    }
}

impl fmt::Display for CapabilityContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Instance produced by a plugin constructor
pub enum PluginObject {
    ReportParser(Box<dyn ReportParser>),
    OutputMode(Box<dyn OutputMode>),
    Filter(Box<dyn Filter>),
}

impl PluginObject {
    pub fn contract(&self) -> CapabilityContract {
        match self {
            Self::ReportParser(_) => CapabilityContract::ReportParser,
            Self::OutputMode(_) => CapabilityContract::OutputMode,
            Self::Filter(_) => CapabilityContract::Filter,
        }
    }
}

impl fmt::Debug for PluginObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PluginObject({})", self.contract())
    }
}

/// Types the factory can hand back for a given contract
pub trait FromPluginObject: Sized {
    const CONTRACT: CapabilityContract;

    fn from_object(object: PluginObject) -> Option<Self>;
}

impl FromPluginObject for Box<dyn ReportParser> {
    const CONTRACT: CapabilityContract = CapabilityContract::ReportParser;

    fn from_object(object: PluginObject) -> Option<Self> {
        match object {
            PluginObject::ReportParser(p) => Some(p),
            _ => None,
        }
    }
}

impl FromPluginObject for Box<dyn OutputMode> {
    const CONTRACT: CapabilityContract = CapabilityContract::OutputMode;

    fn from_object(object: PluginObject) -> Option<Self> {
        match object {
            PluginObject::OutputMode(o) => Some(o),
            _ => None,
        }
    }
}

impl FromPluginObject for Box<dyn Filter> {
    const CONTRACT: CapabilityContract = CapabilityContract::Filter;

    fn from_object(object: PluginObject) -> Option<Self> {
        match object {
            PluginObject::Filter(f) => Some(f),
            _ => None,
        }
    }
}
