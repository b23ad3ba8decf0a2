use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use super::Catalog;
use crate::config::GameConfig;
use crate::state::TileIndex;

impl Catalog {
    /// Shortest travel time between two tiles over the neighbour graph.
    ///
    /// Each hop costs `hop_ticks`, or `road_hop_ticks` when `has_road` reports
    /// a road on that edge. Returns `None` when `to` is unreachable.
    pub fn travel_ticks(
        &self,
        from: TileIndex,
        to: TileIndex,
        has_road: impl Fn(TileIndex, TileIndex) -> bool,
        config: &GameConfig,
    ) -> Option<u64> {
        if from == to {
            return Some(0);
        }
        self.try_tile(from)?;
        self.try_tile(to)?;

        let mut best: BTreeMap<TileIndex, u64> = BTreeMap::new();
        let mut frontier = BinaryHeap::new();
        best.insert(from, 0);
        frontier.push(Reverse((0u64, from)));

        while let Some(Reverse((elapsed, tile))) = frontier.pop() {
            if tile == to {
                return Some(elapsed);
            }
            if best.get(&tile).is_some_and(|&known| known < elapsed) {
                continue;
            }
            for &next in &self.tile(tile).neighbours {
                let hop = if has_road(tile, next) {
                    config.road_hop_ticks
                } else {
                    config.hop_ticks
                };
                let candidate = elapsed + hop;
                if best.get(&next).is_none_or(|&known| candidate < known) {
                    best.insert(next, candidate);
                    frontier.push(Reverse((candidate, next)));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::fixtures::catalog;
    use crate::config::GameConfig;

    #[test]
    fn roads_shorten_travel() {
        let catalog = catalog();
        let config = GameConfig::default();

        let plain = catalog.travel_ticks(1, 3, |_, _| false, &config);
        assert_eq!(plain, Some(2 * config.hop_ticks));

        let with_road = catalog.travel_ticks(1, 3, |a, b| (a, b) == (1, 2), &config);
        assert_eq!(with_road, Some(config.road_hop_ticks + config.hop_ticks));
    }

    #[test]
    fn unknown_tile_is_unreachable() {
        let catalog = catalog();
        assert_eq!(
            catalog.travel_ticks(1, 99, |_, _| false, &GameConfig::default()),
            None
        );
        assert_eq!(catalog.travel_ticks(2, 2, |_, _| false, &GameConfig::default()), Some(0));
    }
}
