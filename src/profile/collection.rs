// Profile collection
// At most one profile per device, with change notifications

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::types::Profile;
use crate::device::InputDevice;
use crate::plugin::CapabilityRegistry;

const EVENT_CAPACITY: usize = 16;

/// Emitted after a profile is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileEvent {
    /// `tablet`'s profile was set; `replaced` if one existed before
    Updated { tablet: String, replaced: bool },
    /// A default profile was created for `tablet`
    Created { tablet: String },
}

/// Profiles keyed by device name
///
/// Writers are serialized; readers get clones so they never observe a
/// half-applied update.
pub struct ProfileCollection {
    profiles: RwLock<Vec<Profile>>,
    events: broadcast::Sender<ProfileEvent>,
}

impl ProfileCollection {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            profiles: RwLock::new(Vec::new()),
            events,
        }
    }

    /// Collection holding `profiles`; a later profile for the same tablet
    /// replaces an earlier one
    pub fn from_profiles(profiles: impl IntoIterator<Item = Profile>) -> Self {
        let collection = Self::new();
        {
            let mut stored = collection.profiles.write();
            for profile in profiles {
                upsert(&mut stored, profile);
            }
        }
        collection
    }

    /// Store `profile` as `device`'s profile, replacing any existing one
    ///
    /// `None` leaves the collection untouched. The profile's `tablet` is set
    /// to the device's name.
    pub fn set(&self, device: &InputDevice, profile: Option<Profile>) {
        let Some(mut profile) = profile else {
            return;
        };
        profile.tablet = device.name().to_string();

        // Events go out under the write lock so their order matches the stores
        let mut profiles = self.profiles.write();
        let replaced = upsert(&mut profiles, profile);
        self.notify(ProfileEvent::Updated {
            tablet: device.name().to_string(),
            replaced,
        });
        drop(profiles);
        debug!(tablet = device.name(), replaced, "Profile set");
    }

    pub fn get(&self, device: &InputDevice) -> Option<Profile> {
        self.profiles
            .read()
            .iter()
            .find(|p| p.belongs_to(device))
            .cloned()
    }

    /// The device's profile, creating and storing defaults if it has none
    ///
    /// Lookup and insertion happen under one write lock, so concurrent
    /// callers all get the same profile.
    pub fn get_or_create_defaults(
        &self,
        device: &InputDevice,
        registry: &CapabilityRegistry,
    ) -> Profile {
        if let Some(existing) = self.get(device) {
            return existing;
        }

        let profile = {
            let mut profiles = self.profiles.write();
            if let Some(existing) = profiles.iter().find(|p| p.belongs_to(device)) {
                return existing.clone();
            }
            let profile = Profile::defaults(device, registry);
            profiles.push(profile.clone());
            self.notify(ProfileEvent::Created {
                tablet: device.name().to_string(),
            });
            profile
        };

        info!(
            tablet = device.name(),
            output_mode = %profile.output_mode.path,
            "Created default profile"
        );
        profile
    }

    /// Consistent copy of every profile, in storage order
    pub fn snapshot(&self) -> Vec<Profile> {
        self.profiles.read().clone()
    }

    pub fn len(&self) -> usize {
        self.profiles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.read().is_empty()
    }

    /// Receive an event after every stored profile
    pub fn subscribe(&self) -> broadcast::Receiver<ProfileEvent> {
        self.events.subscribe()
    }

    fn notify(&self, event: ProfileEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl Default for ProfileCollection {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove any profile for the same tablet, then append. Returns whether one was removed.
fn upsert(profiles: &mut Vec<Profile>, profile: Profile) -> bool {
    let before = profiles.len();
    profiles.retain(|p| p.tablet != profile.tablet);
    let replaced = profiles.len() != before;
    profiles.push(profile);
    replaced
}
