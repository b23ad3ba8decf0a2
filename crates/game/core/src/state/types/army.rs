use std::fmt;
use std::str::FromStr;

use super::{TeamId, TileIndex};
use crate::config::GameConfig;

/// Composite army identifier: the team that raised the army plus a per-team
/// sequence number. Stays stable when ownership transfers.
///
/// Serialized as `"<team>#<seq>"` so it can key JSON maps.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "String", try_from = "String"))]
pub struct ArmyId {
    pub team: TeamId,
    pub seq: u32,
}

impl ArmyId {
    pub fn new(team: impl Into<TeamId>, seq: u32) -> Self {
        Self {
            team: team.into(),
            seq,
        }
    }
}

impl fmt::Display for ArmyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.team, self.seq)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("malformed army id {0:?}, expected <team>#<seq>")]
pub struct ParseArmyIdError(pub String);

impl FromStr for ArmyId {
    type Err = ParseArmyIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (team, seq) = value
            .rsplit_once('#')
            .ok_or_else(|| ParseArmyIdError(value.to_owned()))?;
        let seq = seq
            .parse()
            .map_err(|_| ParseArmyIdError(value.to_owned()))?;
        if team.is_empty() {
            return Err(ParseArmyIdError(value.to_owned()));
        }
        Ok(Self::new(team, seq))
    }
}

impl From<ArmyId> for String {
    fn from(id: ArmyId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for ArmyId {
    type Error = ParseArmyIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum ArmyMode {
    #[default]
    Idle,
    Marching,
    Occupying,
}

/// What a marching army does on arrival.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum ArmyGoal {
    /// Take a free tile or fight the occupant for it.
    Occupy,
    /// Fight the occupant and return home.
    Eliminate,
    /// Hand the carried equipment to an own occupying army.
    Supply,
    /// Relieve an own occupying army and take its place.
    Replace,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Army {
    pub id: ArmyId,
    pub owner: TeamId,
    pub level: u32,
    pub equipment: u32,
    pub mode: ArmyMode,
    /// Occupied tile, set only while occupying.
    pub tile: Option<TileIndex>,
    /// Set only while marching.
    pub destination: Option<TileIndex>,
    /// Set only while marching.
    pub goal: Option<ArmyGoal>,
    /// Set only while marching toward a non-supply goal.
    pub boost: Option<u32>,
}

impl Army {
    pub fn new(id: ArmyId, owner: TeamId) -> Self {
        Self {
            id,
            owner,
            level: 1,
            equipment: 0,
            mode: ArmyMode::Idle,
            tile: None,
            destination: None,
            goal: None,
            boost: None,
        }
    }

    /// Maximum equipment the army can carry.
    pub fn capacity(&self, config: &GameConfig) -> u32 {
        self.level.saturating_mul(config.equipment_per_level)
    }

    /// Combat strength without positional bonuses.
    pub fn strength(&self, config: &GameConfig) -> u32 {
        self.equipment
            .saturating_add(self.level.saturating_mul(config.level_strength))
            .saturating_add(self.boost.unwrap_or(0))
    }

    /// Sends the army home. Returns the equipment it carried.
    pub fn disband_to_idle(&mut self) -> u32 {
        let equipment = std::mem::take(&mut self.equipment);
        self.mode = ArmyMode::Idle;
        self.tile = None;
        self.destination = None;
        self.goal = None;
        self.boost = None;
        equipment
    }

    pub fn occupy(&mut self, tile: TileIndex) {
        self.mode = ArmyMode::Occupying;
        self.tile = Some(tile);
        self.destination = None;
        self.goal = None;
        self.boost = None;
    }
}
