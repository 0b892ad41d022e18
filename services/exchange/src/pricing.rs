//! Order pricing strategies
//!
//! Suggested prices for the order-submission UI and for bots. One
//! strategy ships: a market-average follower that quotes the recent
//! VWAP (base price when the resource never traded) with a random
//! fluctuation inside the configured band. New strategies are
//! additional `PriceStrategy` implementations selected by name.

use persistence::WorldStore;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use types::catalog::ResourceCatalog;
use types::config::EconomyConfig;
use types::errors::EconomyError;
use types::ids::ResourceId;

/// Per-call pricing inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceContext {
    /// Signed fraction applied around the reference price, e.g. `0.03`
    /// quotes 3% above it.
    pub fluctuation: Decimal,
}

impl PriceContext {
    /// Deterministic context, used by tests and replay.
    pub fn fixed(fluctuation: Decimal) -> Self {
        Self { fluctuation }
    }

    /// Uniform random fluctuation in `[-band, band]`, sampled in
    /// thousandths so no float arithmetic is involved.
    pub fn random(band: Decimal) -> Self {
        let span = (band * Decimal::from(1000)).to_i64().unwrap_or(0).abs();
        let millis = if span > 0 {
            rand::thread_rng().gen_range(-span..=span)
        } else {
            0
        };
        Self {
            fluctuation: Decimal::new(millis, 3),
        }
    }
}

/// A pricing policy for suggested order prices.
pub trait PriceStrategy {
    fn name(&self) -> &'static str;

    fn price(
        &self,
        store: &WorldStore,
        catalog: &ResourceCatalog,
        config: &EconomyConfig,
        resource_id: ResourceId,
        ctx: &PriceContext,
    ) -> Result<Decimal, EconomyError>;
}

/// Follows the current market price (recent-trade VWAP, base price as
/// fallback) and applies the context fluctuation.
pub struct MarketAvgFollower;

impl PriceStrategy for MarketAvgFollower {
    fn name(&self) -> &'static str {
        "market_avg_follower"
    }

    fn price(
        &self,
        store: &WorldStore,
        catalog: &ResourceCatalog,
        config: &EconomyConfig,
        resource_id: ResourceId,
        ctx: &PriceContext,
    ) -> Result<Decimal, EconomyError> {
        let resource = catalog.require_resource(resource_id)?;
        let reference = store
            .market_price(resource_id, config.market_price_trades)
            .unwrap_or(resource.base_price);
        let quoted = reference * (Decimal::ONE + ctx.fluctuation);
        Ok(quoted.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}

/// Resolve a strategy by its registered name.
pub fn strategy_by_name(name: &str) -> Option<&'static dyn PriceStrategy> {
    match name {
        "market_avg_follower" => Some(&MarketAvgFollower),
        _ => None,
    }
}

/// Suggested price for a resource using the named strategy (default:
/// market-average follower) and a random fluctuation from the
/// configured band.
pub fn suggest_price(
    store: &WorldStore,
    catalog: &ResourceCatalog,
    config: &EconomyConfig,
    resource_id: ResourceId,
    strategy_name: Option<&str>,
) -> Result<Decimal, EconomyError> {
    let strategy = match strategy_name {
        Some(name) => {
            strategy_by_name(name).ok_or_else(|| EconomyError::not_found("price strategy", name))?
        }
        None => &MarketAvgFollower,
    };
    let ctx = PriceContext::random(config.price_fluctuation);
    strategy.price(store, catalog, config, resource_id, &ctx)
}
