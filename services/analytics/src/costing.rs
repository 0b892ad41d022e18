//! Production costing
//!
//! Read-only derivation over catalog recipes: how long a production run
//! takes and what it costs. Quantity drives duration via the recipe's
//! hourly rate; cost is hourly maintenance (billed per started hour)
//! plus input materials at base prices.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use types::catalog::ResourceCatalog;
use types::errors::EconomyError;
use types::ids::ResourceId;
use types::money;

/// Cost and duration of producing `quantity` units of a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionPlan {
    pub resource_id: ResourceId,
    pub quantity: i64,
    /// Run time in seconds, floored.
    pub duration_secs: i64,
    /// Maintenance hours billed (started hours count in full).
    pub hours_billed: i64,
    pub cash_cost: Decimal,
}

/// Plan a production run from the catalog recipe.
pub fn production_plan(
    catalog: &ResourceCatalog,
    resource_id: ResourceId,
    quantity: i64,
) -> Result<ProductionPlan, EconomyError> {
    if quantity <= 0 {
        return Err(EconomyError::invalid_order("quantity must be positive"));
    }
    let recipe = catalog.require_recipe(resource_id)?;
    if recipe.per_hour <= Decimal::ZERO {
        return Err(EconomyError::invalid_order("recipe has no production rate"));
    }

    let hours_exact = Decimal::from(quantity) / recipe.per_hour;
    let duration_secs = (hours_exact * Decimal::from(3600))
        .floor()
        .to_i64()
        .unwrap_or(i64::MAX);
    let hours_billed = hours_exact.ceil().to_i64().unwrap_or(i64::MAX);

    let mut cost = recipe.maintenance_cost * Decimal::from(hours_billed);
    for input in &recipe.inputs {
        let resource = catalog.require_resource(input.resource_id)?;
        cost += Decimal::from(quantity) * Decimal::from(input.quantity) * resource.base_price;
    }

    Ok(ProductionPlan {
        resource_id,
        quantity,
        duration_secs,
        hours_billed,
        cash_cost: money::round_cash(cost),
    })
}
