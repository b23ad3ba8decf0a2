//! Closed catalogue of action kinds and their behaviors.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use strum::IntoEnumIterator;

use super::kind::ActionKind;
use super::kinds;
use super::transition::{ActionBehavior, ActionTransition};
use crate::catalog::CatalogError;

bitflags! {
    /// Lifecycle traits a kind declares at registration.
    ///
    /// A consistent set holds exactly one of `COMMITS_IMMEDIATELY` /
    /// `COMMITS_WITH_DELAY` and exactly one of `VALIDATES_ON_INITIATE` /
    /// `NO_INITIATE_CHECK`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Capabilities: u8 {
        const VALIDATES_ON_INITIATE = 1 << 0;
        const COMMITS_IMMEDIATELY   = 1 << 1;
        const COMMITS_WITH_DELAY    = 1 << 2;
        const NO_INITIATE_CHECK     = 1 << 3;
    }
}

impl Capabilities {
    /// Player action without delay.
    pub const IMMEDIATE: Self = Self::VALIDATES_ON_INITIATE.union(Self::COMMITS_IMMEDIATELY);
    /// Player action whose effect lands later.
    pub const DELAYED: Self = Self::VALIDATES_ON_INITIATE.union(Self::COMMITS_WITH_DELAY);
    /// Operator action that skips initiate-time checks.
    pub const OPERATOR: Self = Self::NO_INITIATE_CHECK.union(Self::COMMITS_IMMEDIATELY);

    fn inconsistency(self) -> Option<&'static str> {
        let commit = self & (Self::COMMITS_IMMEDIATELY | Self::COMMITS_WITH_DELAY);
        if commit.bits().count_ones() != 1 {
            return Some("exactly one of immediate or delayed commit is required");
        }
        let check = self & (Self::VALIDATES_ON_INITIATE | Self::NO_INITIATE_CHECK);
        if check.bits().count_ones() != 1 {
            return Some("exactly one of initiate validation or no initiate check is required");
        }
        None
    }

    pub fn is_delayed(self) -> bool {
        self.contains(Self::COMMITS_WITH_DELAY)
    }

    pub fn checks_on_initiate(self) -> bool {
        self.contains(Self::VALIDATES_ON_INITIATE)
    }
}

/// One registration: a behavior for a single kind.
pub struct ActionDescriptor {
    behavior: Box<dyn ActionBehavior>,
}

impl ActionDescriptor {
    pub fn of<T: ActionTransition>(transition: T) -> Self {
        Self {
            behavior: Box::new(transition),
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.behavior.kind()
    }
}

/// Maps every [`ActionKind`] to exactly one behavior.
pub struct ActionRegistry {
    behaviors: BTreeMap<ActionKind, Box<dyn ActionBehavior>>,
}

impl ActionRegistry {
    /// Registers the descriptors, rejecting duplicates, gaps and inconsistent
    /// capability sets.
    pub fn new(
        descriptors: impl IntoIterator<Item = ActionDescriptor>,
    ) -> Result<Self, CatalogError> {
        let mut behaviors = BTreeMap::new();
        for descriptor in descriptors {
            let kind = descriptor.kind();
            if let Some(reason) = descriptor.behavior.capabilities().inconsistency() {
                return Err(CatalogError::InconsistentCapabilities { kind, reason });
            }
            if behaviors.insert(kind, descriptor.behavior).is_some() {
                return Err(CatalogError::DuplicateBehavior { kind });
            }
        }

        if let Some(kind) = ActionKind::iter().find(|kind| !behaviors.contains_key(kind)) {
            return Err(CatalogError::MissingBehavior { kind });
        }
        Ok(Self { behaviors })
    }

    /// The built-in rule set.
    pub fn standard() -> Result<Self, CatalogError> {
        Self::new(kinds::standard_descriptors())
    }

    /// Total: every kind is registered once construction succeeded.
    pub fn behavior(&self, kind: ActionKind) -> &dyn ActionBehavior {
        self.behaviors
            .get(&kind)
            .map(Box::as_ref)
            .unwrap_or_else(|| panic!("registry built without {kind}"))
    }

    /// Resolves a snake_case kind name.
    pub fn lookup(&self, name: &str) -> Option<ActionKind> {
        ActionKind::from_str(name).ok()
    }

    pub fn kinds(&self) -> impl Iterator<Item = ActionKind> + '_ {
        self.behaviors.keys().copied()
    }

    pub fn capabilities(&self, kind: ActionKind) -> Capabilities {
        self.behavior(kind).capabilities()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.behaviors
                    .iter()
                    .map(|(kind, behavior)| (kind, behavior.capabilities())),
            )
            .finish()
    }
}
