//! Authoritative game state representation.
//!
//! [`GameState`] aggregates the world, the map, every team and the pending
//! delayed effects. Runtime layers clone or query it but mutate it
//! exclusively through the engine.
pub mod delta;
mod error;
pub mod types;

pub use delta::{StateDiff, TeamChanges, TeamFields, TileChanges, TileFields, WorldFields};
pub use error::IntegrityViolation;
pub use types::{
    Army, ArmyGoal, ArmyId, ArmyMode, EntityId, LedgerError, MapState, ParseArmyIdError,
    ResourceLedger, TeamId, TeamState, Tick, TileIndex, TileState, WorldState,
};

use std::collections::BTreeMap;

use crate::scheduler::Scheduler;

/// Canonical snapshot of the whole game.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    /// Base seed for the stochastic sub-models. Fixed at game start.
    pub game_seed: u64,
    pub world: WorldState,
    pub map: MapState,
    pub teams: BTreeMap<TeamId, TeamState>,
    pub scheduler: Scheduler,
}

impl GameState {
    pub fn new(game_seed: u64, world: WorldState, map: MapState) -> Self {
        Self {
            game_seed,
            world,
            map,
            teams: BTreeMap::new(),
            scheduler: Scheduler::new(),
        }
    }

    /// Registers a team. Returns false if the id is already taken.
    pub fn add_team(&mut self, team: TeamState) -> bool {
        if self.teams.contains_key(&team.id) {
            return false;
        }
        self.teams.insert(team.id.clone(), team);
        true
    }

    pub fn team(&self, id: &TeamId) -> Option<&TeamState> {
        self.teams.get(id)
    }

    pub fn team_mut(&mut self, id: &TeamId) -> Option<&mut TeamState> {
        self.teams.get_mut(id)
    }

    /// A team controls its home tile and every tile one of its armies occupies.
    pub fn controls_tile(&self, team: &TeamId, tile: TileIndex) -> bool {
        self.team(team).is_some_and(|state| state.home_tile == tile)
            || self.world.occupies(team, tile)
    }

    /// Stable per-team stream number for seeding random draws.
    pub fn team_stream(&self, team: &TeamId) -> u32 {
        self.teams
            .keys()
            .position(|id| id == team)
            .and_then(|position| u32::try_from(position).ok())
            .unwrap_or(u32::MAX)
    }

    /// Verifies every cross-cutting invariant of the aggregate.
    pub fn check_integrity(&self) -> Result<(), IntegrityViolation> {
        for team in self.teams.values() {
            let ledgers = [("resources", &team.resources), ("storage", &team.storage)];
            for (ledger, balances) in ledgers {
                if let Some((resource, amount)) = balances.negative_entry() {
                    return Err(IntegrityViolation::NegativeBalance {
                        team: team.id.clone(),
                        ledger,
                        resource: resource.clone(),
                        amount,
                    });
                }
            }
            if let Some((resource, amount)) = team
                .granary
                .iter()
                .find(|(_, amount)| amount.is_sign_negative() && !amount.is_zero())
            {
                return Err(IntegrityViolation::NegativeBalance {
                    team: team.id.clone(),
                    ledger: "granary",
                    resource: resource.clone(),
                    amount: *amount,
                });
            }
            if let Some(plague) = &team.plague {
                let population = team.population(&self.world.config);
                if u64::from(plague.sick) + u64::from(plague.immune) > u64::from(population) {
                    return Err(IntegrityViolation::PlagueExceedsPopulation {
                        team: team.id.clone(),
                        sick: plague.sick,
                        immune: plague.immune,
                        population,
                    });
                }
            }
        }

        for army in self.world.armies.values() {
            if !self.teams.contains_key(&army.owner) {
                return Err(IntegrityViolation::UnknownOwner {
                    army: army.id.clone(),
                    owner: army.owner.clone(),
                });
            }
            if army.mode == ArmyMode::Occupying {
                let held = army.tile.is_some_and(|tile| {
                    self.map.occupant_of(tile) == Some(&army.id)
                });
                if !held {
                    return Err(IntegrityViolation::OccupancyMismatch {
                        army: army.id.clone(),
                        tile: army.tile.unwrap_or_default(),
                    });
                }
            }
        }

        for tile in self.map.tiles.values() {
            if let Some(occupant) = &tile.occupant {
                let consistent = self.world.army(occupant).is_some_and(|army| {
                    army.mode == ArmyMode::Occupying && army.tile == Some(tile.index)
                });
                if !consistent {
                    return Err(IntegrityViolation::StaleOccupant {
                        tile: tile.index,
                        army: occupant.clone(),
                    });
                }
            }
            for &other in &tile.roads {
                if !self.map.has_road(other, tile.index) {
                    return Err(IntegrityViolation::AsymmetricRoad {
                        a: tile.index,
                        b: other,
                    });
                }
            }
        }

        if let Some(effect) = self
            .scheduler
            .pending()
            .find(|effect| !self.teams.contains_key(&effect.team))
        {
            return Err(IntegrityViolation::UnknownTeam {
                seq: effect.seq,
                team: effect.team.clone(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use rust_decimal::Decimal;

    fn two_tiles() -> GameState {
        let mut map = MapState::default();
        map.tiles.insert(1, TileState::new(1, 2));
        map.tiles.insert(2, TileState::new(2, 2));
        let mut state = GameState::new(7, WorldState::new(GameConfig::default()), map);
        state.add_team(TeamState::new("north".into(), "North", 1));
        state
    }

    #[test]
    fn fresh_state_is_consistent() {
        let mut state = two_tiles();
        state.world.raise_army(&"north".into());
        assert_eq!(state.check_integrity(), Ok(()));
    }

    #[test]
    fn detects_negative_balance() {
        let mut state = two_tiles();
        let team = state.team_mut(&"north".into()).unwrap();
        team.resources = [("pro-wood".into(), Decimal::from(-1))].into_iter().collect();

        assert!(matches!(
            state.check_integrity(),
            Err(IntegrityViolation::NegativeBalance { ledger: "resources", .. })
        ));
    }

    #[test]
    fn detects_tile_claiming_an_army_elsewhere() {
        let mut state = two_tiles();
        let army = state.world.raise_army(&"north".into());
        state.world.army_mut(&army).unwrap().occupy(1);
        state.map.tile_mut(1).unwrap().occupant = Some(army.clone());
        assert_eq!(state.check_integrity(), Ok(()));

        // a second tile claiming the same army is a duplicate occupancy
        state.map.tile_mut(2).unwrap().occupant = Some(army.clone());
        assert_eq!(
            state.check_integrity(),
            Err(IntegrityViolation::StaleOccupant { tile: 2, army })
        );
    }

    #[test]
    fn detects_army_of_unknown_team() {
        let mut state = two_tiles();
        state.world.raise_army(&"ghosts".into());
        assert!(matches!(
            state.check_integrity(),
            Err(IntegrityViolation::UnknownOwner { .. })
        ));
    }

    #[test]
    fn home_and_occupied_tiles_are_controlled() {
        let mut state = two_tiles();
        let north: TeamId = "north".into();
        assert!(state.controls_tile(&north, 1));
        assert!(!state.controls_tile(&north, 2));

        let army = state.world.raise_army(&north);
        state.world.army_mut(&army).unwrap().occupy(2);
        state.map.tile_mut(2).unwrap().occupant = Some(army);
        assert!(state.controls_tile(&north, 2));
    }
}
