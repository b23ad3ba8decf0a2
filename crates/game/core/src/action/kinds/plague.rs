use crate::action::{
    ActionContext, ActionRejected, ActionTransition, Capabilities, EffectContext, Message, ensure,
};
use crate::config::RemedySpec;
use crate::cost::ResourceCost;
use crate::plague::PlagueStats;

#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlagueOnsetArgs {}

/// Infects the acting team with the configured starting epidemic.
pub struct PlagueOnset;

impl ActionTransition for PlagueOnset {
    type Args = PlagueOnsetArgs;
    const CAPABILITIES: Capabilities = Capabilities::IMMEDIATE;

    fn initiate_check(&self, _args: &PlagueOnsetArgs, ctx: &ActionContext<'_>) -> Result<(), ActionRejected> {
        let team = ctx.team()?;
        ensure(!team.is_afflicted(), || ActionRejected::AlreadyAfflicted {
            team: team.id.clone(),
        })
    }

    fn commit(&self, _args: &PlagueOnsetArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        let config = ctx.state.world.config.clone();
        let team = ctx.team_mut()?;
        let stats = PlagueStats::onset(&config.plague, team.population(&config));
        let sick = stats.sick;
        team.plague = Some(stats);
        let id = team.id.clone();

        let message = Message::warning(
            "plague.onset",
            format!("Plague broke out in {id}, {sick} residents are sick"),
        )
        .with_ref(&id);
        ctx.warn(message.clone());
        ctx.notify(&id, message);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlagueRemedyArgs {
    pub remedy: String,
}

fn remedy<'a>(ctx: &ActionContext<'a>, name: &str) -> Result<&'a RemedySpec, ActionRejected> {
    ctx.config()
        .plague
        .remedies
        .get(name)
        .ok_or_else(|| ActionRejected::UnknownRemedy {
            remedy: name.to_owned(),
        })
}

/// Applies a remedy from the configured book. Each remedy works once per
/// epidemic.
pub struct PlagueRemedy;

impl ActionTransition for PlagueRemedy {
    type Args = PlagueRemedyArgs;
    const CAPABILITIES: Capabilities = Capabilities::IMMEDIATE;

    fn cost(&self, args: &PlagueRemedyArgs, ctx: &ActionContext<'_>) -> Result<ResourceCost, ActionRejected> {
        Ok(remedy(ctx, &args.remedy)?.cost.clone())
    }

    fn initiate_check(&self, args: &PlagueRemedyArgs, ctx: &ActionContext<'_>) -> Result<(), ActionRejected> {
        let team = ctx.team()?;
        remedy(ctx, &args.remedy)?;
        let plague = team.plague.as_ref().ok_or_else(|| ActionRejected::NotAfflicted {
            team: team.id.clone(),
        })?;
        ensure(!plague.remedies.contains(&args.remedy), || {
            ActionRejected::RemedyApplied {
                team: team.id.clone(),
                remedy: args.remedy.clone(),
            }
        })
    }

    fn commit(&self, args: &PlagueRemedyArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        let spec = remedy(&ctx.view(), &args.remedy)?.clone();
        let team = ctx.team_mut()?;
        let id = team.id.clone();
        let plague = team
            .plague
            .as_mut()
            .ok_or_else(|| ActionRejected::NotAfflicted { team: id.clone() })?;
        plague.apply_remedy(&args.remedy, &spec);

        ctx.info(
            Message::info(
                "plague.remedy",
                format!("{id} applied remedy {}", args.remedy),
            )
            .with_ref(&id),
        );
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlagueCureArgs {}

/// Ends the acting team's epidemic, if any.
pub struct PlagueCure;

impl ActionTransition for PlagueCure {
    type Args = PlagueCureArgs;
    const CAPABILITIES: Capabilities = Capabilities::OPERATOR;

    fn commit(&self, _args: &PlagueCureArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        let team = ctx.team_mut()?;
        let id = team.id.clone();
        let message = (match team.plague.take() {
            Some(_) => Message::info("plague.cured", format!("The plague in {id} is over")),
            None => Message::info("plague.healthy", format!("{id} was not afflicted")),
        })
        .with_ref(&id);
        ctx.info(message.clone());
        ctx.notify(&id, message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::action::ActionResult;
    use crate::engine::testing::Harness;

    fn first_error(result: &ActionResult) -> Option<&str> {
        result.errors().next().map(|m| m.template.as_str())
    }

    fn with_herbs(harness: &mut Harness) {
        harness.state.world.config.plague.remedies.insert(
            "herbs".into(),
            RemedySpec {
                cost: ResourceCost::new().with("pro-grain", Decimal::from(2)),
                recovery: Decimal::new(3, 1),
                ..RemedySpec::default()
            },
        );
    }

    fn herbs() -> PlagueRemedyArgs {
        PlagueRemedyArgs {
            remedy: "herbs".into(),
        }
    }

    #[test]
    fn onset_attaches_default_stats_once() {
        let mut harness = Harness::new();
        let result = harness.submit("red", PlagueOnsetArgs::default());
        assert!(result.is_committed(), "{result:?}");
        assert_eq!(result.warnings().count(), 1);
        assert_eq!(harness.team("red").plague.as_ref().map(|p| p.sick), Some(5));

        assert_eq!(
            first_error(&harness.submit("red", PlagueOnsetArgs::default())),
            Some("ACTION_ALREADY_AFFLICTED")
        );
    }

    #[test]
    fn remedy_applies_once_per_epidemic() {
        let mut harness = Harness::new();
        with_herbs(&mut harness);
        assert_eq!(first_error(&harness.submit("red", herbs())), Some("ACTION_NOT_AFFLICTED"));

        harness.submit("red", PlagueOnsetArgs::default());
        let result = harness.submit("red", herbs());
        assert!(result.is_committed(), "{result:?}");
        assert_eq!(harness.balance("red", "pro-grain"), Decimal::from(18));
        let plague = harness.team("red").plague.clone().unwrap();
        assert_eq!(plague.recovery, Decimal::new(5, 1));

        assert_eq!(first_error(&harness.submit("red", herbs())), Some("ACTION_REMEDY_APPLIED"));
        let unknown = PlagueRemedyArgs {
            remedy: "leeches".into(),
        };
        assert_eq!(first_error(&harness.submit("red", unknown)), Some("ACTION_UNKNOWN_REMEDY"));
    }

    #[test]
    fn cure_detaches_the_epidemic() {
        let mut harness = Harness::new();
        harness.submit("red", PlagueOnsetArgs::default());
        let result = harness.submit("red", PlagueCureArgs::default());
        assert!(result.is_committed(), "{result:?}");
        assert!(!harness.team("red").is_afflicted());

        // curing a healthy team is harmless
        assert!(harness.submit("red", PlagueCureArgs::default()).is_committed());
    }
}
