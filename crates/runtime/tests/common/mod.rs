#![allow(dead_code)]

use game_content::ContentFactory;
use game_core::{EntityId, GameState, TeamId};
use runtime::{NotificationSink, Runtime, RuntimeConfig};
use rust_decimal::Decimal;

/// Runtime over the bundled default game.
pub async fn start(sink: impl NotificationSink + 'static) -> Runtime {
    let game = ContentFactory::embedded().expect("embedded content loads");
    Runtime::builder()
        .config(RuntimeConfig::default())
        .catalog(game.catalog)
        .initial_state(game.state)
        .sink(sink)
        .build()
        .await
        .expect("runtime builds")
}

pub fn balance(state: &GameState, team: &str, resource: &str) -> Decimal {
    state
        .team(&TeamId::from(team))
        .expect("team exists")
        .resources
        .get(&EntityId::from(resource))
}
