use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::{LedgerError, ResourceLedger, TeamId, TileIndex};
use crate::config::GameConfig;
use crate::plague::PlagueStats;
use crate::state::EntityId;

/// Per-team aggregate. Exactly one exists per team for the whole game.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeamState {
    pub id: TeamId,
    pub name: String,
    /// Tile the team always controls and where idle armies wait.
    pub home_tile: TileIndex,
    pub resources: ResourceLedger,
    pub researched: BTreeSet<EntityId>,
    pub researching: BTreeSet<EntityId>,
    /// Production consumed automatically by every feeding.
    pub granary: BTreeMap<EntityId, Decimal>,
    /// Materials held for physical withdrawal.
    pub storage: ResourceLedger,
    pub attributes: BTreeSet<EntityId>,
    /// Residents assigned to automated recipes.
    pub employees: BTreeMap<EntityId, u32>,
    pub last_fed_turn: Option<u32>,
    pub plague: Option<PlagueStats>,
}

impl TeamState {
    pub fn new(id: TeamId, name: impl Into<String>, home_tile: TileIndex) -> Self {
        Self {
            id,
            name: name.into(),
            home_tile,
            resources: ResourceLedger::new(),
            researched: BTreeSet::new(),
            researching: BTreeSet::new(),
            granary: BTreeMap::new(),
            storage: ResourceLedger::new(),
            attributes: BTreeSet::new(),
            employees: BTreeMap::new(),
            last_fed_turn: None,
            plague: None,
        }
    }

    /// Whole residents, as counted by the population resource.
    pub fn population(&self, config: &GameConfig) -> u32 {
        self.resources
            .get(&config.population_resource)
            .floor()
            .to_u32()
            .unwrap_or(u32::MAX)
    }

    /// Removes up to `count` residents and returns how many were removed.
    ///
    /// Plague counts are clamped so sick and immune never outnumber the living.
    pub fn remove_residents(
        &mut self,
        config: &GameConfig,
        count: u32,
    ) -> Result<u32, LedgerError> {
        let population = self.population(config);
        let removed = count.min(population);
        self.resources
            .take(&config.population_resource, Decimal::from(removed))?;

        if let Some(plague) = &mut self.plague {
            let living = population - removed;
            plague.sick = plague.sick.min(living);
            plague.immune = plague.immune.min(living - plague.sick);
        }
        Ok(removed)
    }

    pub fn is_afflicted(&self) -> bool {
        self.plague.is_some()
    }

    /// Residents assigned to automated recipes, saturating at `u32::MAX`.
    pub fn total_employees(&self) -> u32 {
        self.employees
            .values()
            .fold(0u32, |total, count| total.saturating_add(*count))
    }

    pub fn was_fed_in(&self, turn: u32) -> bool {
        self.last_fed_turn == Some(turn)
    }
}
