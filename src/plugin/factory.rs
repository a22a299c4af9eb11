// Plugin factory
// Builds configured plugin instances from registry descriptors

use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error};

use super::contract::FromPluginObject;
use super::manifest::PluginContext;
use super::registry::CapabilityRegistry;
use super::settings::{PluginSettings, SettingsProvider};
use crate::error::PluginError;

/// Constructs plugin instances by path
///
/// Construction never mutates the registry, so a factory (or several) can
/// be used from any number of threads at once. A failing plugin only
/// affects its own construction.
#[derive(Clone, Copy)]
pub struct PluginFactory<'r> {
    registry: &'r CapabilityRegistry,
}

impl<'r> PluginFactory<'r> {
    pub fn new(registry: &'r CapabilityRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r CapabilityRegistry {
        self.registry
    }

    /// Build the plugin at `path`, reporting failure as a structured error
    ///
    /// Errors and panics raised by the plugin's own constructor are both
    /// reported as `ConstructionFailed`.
    pub fn try_construct<T: FromPluginObject>(
        &self,
        path: &str,
        settings: Option<&PluginSettings>,
        ctx: &PluginContext<'_>,
    ) -> Result<T, PluginError> {
        let descriptor = self
            .registry
            .resolve(path)
            .ok_or_else(|| PluginError::DescriptorNotFound(path.to_string()))?;

        let provider = settings.map(SettingsProvider::new).unwrap_or_default();

        let object = match panic::catch_unwind(AssertUnwindSafe(|| {
            descriptor.instantiate(&provider, ctx, T::CONTRACT)
        })) {
            Ok(Ok(object)) => object,
            Ok(Err(e)) => {
                return Err(PluginError::ConstructionFailed {
                    path: path.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(payload) => {
                return Err(PluginError::ConstructionFailed {
                    path: path.to_string(),
                    reason: format!("constructor panicked: {}", panic_message(&*payload)),
                })
            }
        };

        let built = object.contract();
        T::from_object(object).ok_or_else(|| PluginError::ConstructionFailed {
            path: path.to_string(),
            reason: format!("built {built}, expected {}", T::CONTRACT),
        })
    }

    /// Build the plugin at `path`, logging any failure
    ///
    /// Returns `None` when the path is unknown or construction fails.
    pub fn construct<T: FromPluginObject>(&self, path: &str, ctx: &PluginContext<'_>) -> Option<T> {
        self.construct_logged(path, None, ctx)
    }

    /// Build the plugin addressed by `settings`, configured by them
    ///
    /// `None` settings mean the stage is not configured: nothing is
    /// resolved or logged.
    pub fn construct_from_settings<T: FromPluginObject>(
        &self,
        settings: Option<&PluginSettings>,
        ctx: &PluginContext<'_>,
    ) -> Option<T> {
        let settings = settings?;
        self.construct_logged(&settings.path, Some(settings), ctx)
    }

    fn construct_logged<T: FromPluginObject>(
        &self,
        path: &str,
        settings: Option<&PluginSettings>,
        ctx: &PluginContext<'_>,
    ) -> Option<T> {
        match self.try_construct(path, settings, ctx) {
            Ok(instance) => {
                debug!(path, "Constructed plugin");
                Some(instance)
            }
            Err(e) => {
                log_failure(path, &e);
                None
            }
        }
    }
}

/// One error event per failure, plus the requesting stack at debug level
///
/// The constructor has already returned or unwound here, so the captured
/// stack is the caller's. A panicking constructor's own stack is printed by
/// the panic hook when `RUST_BACKTRACE` is set.
fn log_failure(path: &str, e: &PluginError) {
    match e {
        PluginError::DescriptorNotFound(_) => error!(path, "{e}"),
        _ => {
            error!(path, "Object construction has thrown an error: {e}");
            debug!(
                path,
                caller_backtrace = %Backtrace::capture(),
                "Construction was requested from"
            );
        }
    }
}

pub(super) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
