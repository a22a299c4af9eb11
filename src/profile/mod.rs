// Profile module
// Per-device configuration profiles and their persistence

pub mod collection;
pub mod json;
pub mod types;

pub use collection::{ProfileCollection, ProfileEvent};
pub use types::{BindingSettings, Profile};
