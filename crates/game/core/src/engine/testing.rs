//! Two-team game over the fixture catalog, shared by engine and action tests.

use rust_decimal::Decimal;

use super::{ActionRequest, GameEngine, TickReport};
use crate::action::{ActionArgs, ActionRegistry, ActionResult};
use crate::catalog::Catalog;
use crate::catalog::fixtures;
use crate::config::GameConfig;
use crate::cost::DiceRoll;
use crate::state::{
    EntityId, GameState, MapState, ResourceLedger, TeamId, TeamState, Tick, WorldState,
};

pub(crate) struct Harness {
    pub state: GameState,
    pub catalog: Catalog,
    pub registry: ActionRegistry,
}

fn team(id: &str, home_tile: u32) -> TeamState {
    let mut team = TeamState::new(TeamId::from(id), id.to_uppercase(), home_tile);
    team.resources = [
        ("res-work", 100),
        ("pop-residents", 50),
        ("pro-labor", 100),
        ("pro-grain", 20),
        ("pro-fish", 20),
        ("pro-meat", 20),
        ("pro-equipment", 50),
    ]
    .into_iter()
    .map(|(id, amount)| (EntityId::from(id), Decimal::from(amount)))
    .collect::<ResourceLedger>();
    team.researched.insert("tec-start".into());
    team
}

impl Harness {
    /// Teams `red` (home tile 1) and `blue` (home tile 3), seed 42.
    pub fn new() -> Self {
        let catalog = fixtures::catalog();
        let mut state = GameState::new(
            42,
            WorldState::new(GameConfig::new()),
            MapState::from_catalog(&catalog),
        );
        state.add_team(team("red", 1));
        state.add_team(team("blue", 3));
        Self {
            state,
            catalog,
            registry: ActionRegistry::standard().expect("standard registry is complete"),
        }
    }

    pub fn engine(&mut self) -> GameEngine<'_> {
        GameEngine::new(&mut self.state, &self.catalog, &self.registry)
    }

    pub fn submit(&mut self, team: &str, args: impl Into<ActionArgs>) -> ActionResult {
        self.engine()
            .submit(ActionRequest::by_team(team, args), None)
            .expect("no integrity failure")
    }

    pub fn submit_rolled(
        &mut self,
        team: &str,
        args: impl Into<ActionArgs>,
        roll: DiceRoll,
    ) -> ActionResult {
        self.engine()
            .submit(ActionRequest::by_team(team, args), Some(&roll))
            .expect("no integrity failure")
    }

    pub fn operator(&mut self, args: impl Into<ActionArgs>) -> ActionResult {
        self.engine()
            .submit(ActionRequest::operator(args), None)
            .expect("no integrity failure")
    }

    pub fn tick_to(&mut self, tick: u64) -> TickReport {
        self.engine()
            .tick(Tick(tick))
            .expect("no integrity failure")
    }

    pub fn team(&self, id: &str) -> &TeamState {
        self.state.team(&id.into()).expect("fixture team")
    }

    pub fn team_mut(&mut self, id: &str) -> &mut TeamState {
        self.state.team_mut(&id.into()).expect("fixture team")
    }

    pub fn balance(&self, team: &str, resource: &str) -> Decimal {
        self.team(team).resources.get(&resource.into())
    }
}
