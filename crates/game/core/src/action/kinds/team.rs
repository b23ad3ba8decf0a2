use crate::action::{
    ActionContext, ActionRejected, ActionTransition, Capabilities, EffectContext, Message, ensure,
};
use crate::cost::ResourceCost;
use crate::state::EntityId;

use super::vyroba::recipe;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeAddArgs {
    pub attribute: EntityId,
}

/// Acquires a permanent team attribute.
pub struct AttributeAdd;

impl ActionTransition for AttributeAdd {
    type Args = AttributeAddArgs;
    const CAPABILITIES: Capabilities = Capabilities::IMMEDIATE;

    fn cost(&self, args: &AttributeAddArgs, ctx: &ActionContext<'_>) -> Result<ResourceCost, ActionRejected> {
        ctx.catalog
            .try_attribute(&args.attribute)
            .map(|attribute| attribute.cost.clone())
            .ok_or_else(|| ActionRejected::UnknownEntity {
                id: args.attribute.clone(),
            })
    }

    fn initiate_check(&self, args: &AttributeAddArgs, ctx: &ActionContext<'_>) -> Result<(), ActionRejected> {
        let team = ctx.team()?;
        ensure(ctx.catalog.try_attribute(&args.attribute).is_some(), || {
            ActionRejected::UnknownEntity {
                id: args.attribute.clone(),
            }
        })?;
        ctx.require_available(&args.attribute)?;
        ensure(!team.attributes.contains(&args.attribute), || {
            ActionRejected::AttributeOwned {
                team: team.id.clone(),
                attribute: args.attribute.clone(),
            }
        })?;
        ensure(!team.is_afflicted(), || ActionRejected::Afflicted {
            team: team.id.clone(),
            kind: ctx.kind,
        })
    }

    fn commit(&self, args: &AttributeAddArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        let name = ctx.catalog.attribute(&args.attribute).name.clone();
        ctx.team_mut()?.attributes.insert(args.attribute.clone());
        ctx.info(
            Message::info("attribute.added", format!("Acquired {name}")).with_ref(&args.attribute),
        );
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmployeesAssignArgs {
    pub vyroba: EntityId,
    /// Residents working the recipe from now on; zero releases them.
    pub count: u32,
}

/// Assigns residents to an automated recipe. Employed residents stop
/// producing work and instead run the recipe once per `workers` every turn.
pub struct EmployeesAssign;

impl ActionTransition for EmployeesAssign {
    type Args = EmployeesAssignArgs;
    const CAPABILITIES: Capabilities = Capabilities::IMMEDIATE;

    fn initiate_check(
        &self,
        args: &EmployeesAssignArgs,
        ctx: &ActionContext<'_>,
    ) -> Result<(), ActionRejected> {
        let team = ctx.team()?;
        let entity = recipe(ctx, &args.vyroba)?;
        ensure(entity.workers > 0, || ActionRejected::NotAutomatable {
            vyroba: args.vyroba.clone(),
        })?;
        ctx.require_available(&args.vyroba)?;

        let current = team.employees.get(&args.vyroba).copied().unwrap_or(0);
        let requested = team
            .total_employees()
            .saturating_sub(current)
            .saturating_add(args.count);
        let population = team.population(ctx.config());
        ensure(requested <= population, || ActionRejected::TooManyEmployees {
            team: team.id.clone(),
            requested,
            population,
        })
    }

    fn commit(&self, args: &EmployeesAssignArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        let team = ctx.team_mut()?;
        if args.count == 0 {
            team.employees.remove(&args.vyroba);
        } else {
            team.employees.insert(args.vyroba.clone(), args.count);
        }
        let total = team.total_employees();
        ctx.info(
            Message::info(
                "employees.assigned",
                format!("{} residents work on {}, {total} employed", args.count, args.vyroba),
            )
            .with_ref(&args.vyroba),
        );
        Ok(())
    }
}
