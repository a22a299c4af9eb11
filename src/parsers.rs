// Report parser plugins
// Every built-in parser is a ReportDispatcher over a dispatch table; they
// differ only in where the table comes from.

use tablet_report::{tables, DispatchTable, ReportDispatcher, ReportError, ReportParser};

use crate::error::PluginError;
use crate::plugin::{PluginContext, SettingsProvider};

fn dispatcher(table: DispatchTable, key: &str) -> Result<Box<dyn ReportParser>, PluginError> {
    let dispatcher = ReportDispatcher::new(table)
        .map_err(|e: ReportError| PluginError::invalid_setting(key, e))?;
    Ok(Box::new(dispatcher))
}

/// Generic pen reports: position at bytes 2-5, pressure at 6-7
pub fn tablet_report_parser() -> Result<Box<dyn ReportParser>, PluginError> {
    dispatcher(tables::generic(), "Table")
}

/// Huion New 1060 Plus: express keys, the model's own pen layout, generic fallback
pub fn new_1060_plus_parser() -> Result<Box<dyn ReportParser>, PluginError> {
    dispatcher(tables::huion_new_1060_plus(), "Table")
}

/// Parser driven by a dispatch table from configuration
///
/// Uses the `Table` setting when present, otherwise the device
/// configuration's `dispatch` table.
pub fn configurable_parser(
    settings: &SettingsProvider,
    ctx: &PluginContext<'_>,
) -> Result<Box<dyn ReportParser>, PluginError> {
    if let Some(table) = settings.get::<DispatchTable>("Table")? {
        return dispatcher(table, "Table");
    }

    let device = ctx.require_device()?;
    let table = device
        .configuration()
        .dispatch
        .clone()
        .ok_or(PluginError::MissingDependency("dispatch table"))?;
    dispatcher(table, "dispatch")
}
