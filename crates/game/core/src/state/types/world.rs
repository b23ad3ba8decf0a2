use std::collections::BTreeMap;

use super::{Army, ArmyId, TeamId, Tick, TileIndex};
use crate::config::GameConfig;

/// Game-wide state shared by all teams.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldState {
    pub turn: u32,
    /// Logical clock. Only explicit tick calls move it forward.
    pub clock: Tick,
    /// Named global counters, never negative.
    pub counters: BTreeMap<String, u64>,
    pub config: GameConfig,
    pub armies: BTreeMap<ArmyId, Army>,
    /// Last sequence number handed out per raising team.
    army_seq: BTreeMap<TeamId, u32>,
}

impl WorldState {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Raises a fresh idle army for `team`.
    pub fn raise_army(&mut self, team: &TeamId) -> ArmyId {
        let seq = self.army_seq.entry(team.clone()).or_insert(0);
        *seq += 1;
        let id = ArmyId::new(team.clone(), *seq);
        self.armies
            .insert(id.clone(), Army::new(id.clone(), team.clone()));
        id
    }

    pub fn army(&self, id: &ArmyId) -> Option<&Army> {
        self.armies.get(id)
    }

    pub fn army_mut(&mut self, id: &ArmyId) -> Option<&mut Army> {
        self.armies.get_mut(id)
    }

    pub fn armies_of<'a>(&'a self, team: &'a TeamId) -> impl Iterator<Item = &'a Army> + 'a {
        self.armies.values().filter(move |army| &army.owner == team)
    }

    /// True when one of `team`'s armies occupies `tile`.
    pub fn occupies(&self, team: &TeamId, tile: TileIndex) -> bool {
        self.armies_of(team).any(|army| army.tile == Some(tile))
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }
}
