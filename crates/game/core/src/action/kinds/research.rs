use crate::action::{
    ActionContext, ActionRejected, ActionTransition, Capabilities, EffectContext, Message, ensure,
};
use crate::catalog::TechEntity;
use crate::cost::{DiceRequirement, ResourceCost};
use crate::state::EntityId;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResearchStartArgs {
    pub tech: EntityId,
}

/// Starts researching a technology. It joins the researched set once its
/// research time has passed.
pub struct ResearchStart;

fn tech<'a>(ctx: &ActionContext<'a>, id: &EntityId) -> Result<&'a TechEntity, ActionRejected> {
    ctx.catalog
        .try_tech(id)
        .ok_or_else(|| ActionRejected::UnknownEntity { id: id.clone() })
}

impl ActionTransition for ResearchStart {
    type Args = ResearchStartArgs;
    const CAPABILITIES: Capabilities = Capabilities::DELAYED;

    fn cost(
        &self,
        args: &ResearchStartArgs,
        ctx: &ActionContext<'_>,
    ) -> Result<ResourceCost, ActionRejected> {
        Ok(tech(ctx, &args.tech)?.cost.clone())
    }

    fn dice(
        &self,
        args: &ResearchStartArgs,
        ctx: &ActionContext<'_>,
    ) -> Result<DiceRequirement, ActionRejected> {
        Ok(tech(ctx, &args.tech)?.dice_requirement())
    }

    fn delay(&self, args: &ResearchStartArgs, ctx: &ActionContext<'_>) -> Result<u64, ActionRejected> {
        Ok(tech(ctx, &args.tech)?.research_ticks)
    }

    fn initiate_check(
        &self,
        args: &ResearchStartArgs,
        ctx: &ActionContext<'_>,
    ) -> Result<(), ActionRejected> {
        tech(ctx, &args.tech)?;
        ctx.require_available(&args.tech)?;
        let team = ctx.team()?;
        ensure(!team.researched.contains(&args.tech), || {
            ActionRejected::AlreadyResearched {
                team: team.id.clone(),
                tech: args.tech.clone(),
            }
        })?;
        ensure(!team.researching.contains(&args.tech), || {
            ActionRejected::AlreadyResearching {
                team: team.id.clone(),
                tech: args.tech.clone(),
            }
        })
    }

    fn commit(&self, args: &ResearchStartArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        let name = ctx.catalog.tech(&args.tech).name.clone();
        ctx.team_mut()?.researching.insert(args.tech.clone());
        ctx.info(
            Message::info("research.started", format!("Research of {name} started"))
                .with_ref(&args.tech),
        );
        Ok(())
    }

    fn delayed(&self, args: &ResearchStartArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        let catalog = ctx.catalog;
        let entity = catalog.tech(&args.tech);
        let team = ctx.team_mut()?;
        ensure(team.researching.remove(&args.tech), || {
            ActionRejected::NotResearching {
                team: team.id.clone(),
                tech: args.tech.clone(),
            }
        })?;
        team.researched.insert(args.tech.clone());
        let team = team.id.clone();

        let unlocked = entity
            .unlocks
            .iter()
            .map(EntityId::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let mut message = Message::info(
            "research.finished",
            format!("Research of {} finished, unlocking: {unlocked}", entity.name),
        )
        .with_ref(&args.tech);
        for id in &entity.unlocks {
            message = message.with_ref(id);
        }
        ctx.info(message.clone());
        ctx.notify(&team, message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::action::ActionStatus;
    use crate::cost::DiceRoll;
    use crate::engine::testing::Harness;
    use crate::state::TeamId;

    fn crafts() -> ResearchStartArgs {
        ResearchStartArgs {
            tech: "tec-crafts".into(),
        }
    }

    #[test]
    fn research_completes_after_its_research_time() {
        let mut harness = Harness::new();
        let result = harness.submit_rolled("red", crafts(), DiceRoll::new("die-lesy", 6));
        assert!(result.is_committed(), "{result:?}");
        assert_eq!(result.scheduled_delay, Some(5));
        assert!(harness.team("red").researching.contains(&EntityId::from("tec-crafts")));

        let report = harness.tick_to(5);
        assert_eq!(report.effects.len(), 1);
        let red = harness.team("red");
        assert!(red.researched.contains(&EntityId::from("tec-crafts")));
        assert!(red.researching.is_empty());
        let notes = &report.effects[0].notifications[&TeamId::from("red")];
        assert_eq!(notes[0].template, "research.finished");
        assert!(notes[0].refs.contains(&"die-hory".to_owned()));
    }

    #[test]
    fn duplicate_research_start_is_rejected_without_charge() {
        let mut harness = Harness::new();
        harness.submit_rolled("red", crafts(), DiceRoll::new("die-lesy", 6));
        let before = harness.team("red").resources.clone();

        let result = harness.submit_rolled("red", crafts(), DiceRoll::new("die-lesy", 6));
        assert_eq!(result.status, ActionStatus::Rejected);
        assert_eq!(
            result.errors().next().map(|m| m.template.as_str()),
            Some("ACTION_ALREADY_RESEARCHING")
        );
        assert_eq!(harness.team("red").resources, before);
        assert_eq!(harness.balance("red", "res-work"), Decimal::from(70));
    }

    #[test]
    fn locked_technology_cannot_be_started() {
        let mut harness = Harness::new();
        harness.team_mut("red").researched.clear();
        let result = harness.submit_rolled("red", crafts(), DiceRoll::new("die-lesy", 6));
        assert_eq!(
            result.errors().next().map(|m| m.template.as_str()),
            Some("ACTION_NOT_AVAILABLE")
        );
    }

    #[test]
    fn unknown_technology_is_a_validation_failure() {
        let mut harness = Harness::new();
        let result = harness.submit(
            "red",
            ResearchStartArgs {
                tech: "tec-nothing".into(),
            },
        );
        assert_eq!(
            result.errors().next().map(|m| m.template.as_str()),
            Some("ACTION_UNKNOWN_ENTITY")
        );
    }
}
