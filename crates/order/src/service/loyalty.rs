use crate::{
    abstract_trait::customer::repository::DynCustomerCommandRepository,
    service::counters::{OrderCounters, SideEffect},
};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use shared::errors::{RepositoryError, ServiceError};
use std::sync::Arc;
use tracing::{error, info};

pub type DynLoyaltyPolicy = Arc<dyn LoyaltyPolicy + Send + Sync>;

/// Conversion between currency amounts and loyalty points.
pub trait LoyaltyPolicy {
    fn points_earned(&self, amount: Decimal) -> i64;
    fn points_to_redeem(&self, amount: Decimal) -> i64;
}

/// Fixed-rate policy: earns `floor(amount * points_per_unit)`, spends
/// `ceil(amount / units_per_point)`.
#[derive(Debug, Clone)]
pub struct RateLoyaltyPolicy {
    points_per_unit: Decimal,
    units_per_point: Decimal,
}

impl RateLoyaltyPolicy {
    pub fn new(points_per_unit: Decimal, units_per_point: Decimal) -> Self {
        Self {
            points_per_unit,
            units_per_point,
        }
    }
}

impl Default for RateLoyaltyPolicy {
    fn default() -> Self {
        Self::new(Decimal::ONE, Decimal::ONE)
    }
}

impl LoyaltyPolicy for RateLoyaltyPolicy {
    fn points_earned(&self, amount: Decimal) -> i64 {
        if amount <= Decimal::ZERO {
            return 0;
        }
        (amount * self.points_per_unit).floor().to_i64().unwrap_or(0)
    }

    fn points_to_redeem(&self, amount: Decimal) -> i64 {
        if amount <= Decimal::ZERO {
            return 0;
        }
        amount
            .checked_div(self.units_per_point)
            .and_then(|points| points.ceil().to_i64())
            .unwrap_or(0)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Settlement {
    pub redeemed: Option<i64>,
    pub awarded: Option<i64>,
}

/// Redeem-then-award on order completion. Every failure is logged and dropped.
#[derive(Clone)]
pub struct LoyaltyLedger {
    customers: DynCustomerCommandRepository,
    policy: DynLoyaltyPolicy,
    counters: OrderCounters,
}

impl LoyaltyLedger {
    pub fn new(
        customers: DynCustomerCommandRepository,
        policy: DynLoyaltyPolicy,
        counters: OrderCounters,
    ) -> Self {
        Self {
            customers,
            policy,
            counters,
        }
    }

    pub async fn settle(
        &self,
        customer_id: i32,
        final_amount: Decimal,
        redeem_amount: Option<Decimal>,
    ) -> Settlement {
        let mut settlement = Settlement::default();

        if let Some(amount) = redeem_amount.filter(|a| *a > Decimal::ZERO) {
            let points = self.policy.points_to_redeem(amount);
            match self.customers.redeem_points(customer_id, points).await {
                Ok(_) => settlement.redeemed = Some(points),
                Err(e) => {
                    self.counters.side_effect_failed(SideEffect::LoyaltyRedeem);
                    let err = redeem_error(customer_id, e);
                    error!("❌ Loyalty redemption skipped for customer {}: {}", customer_id, err);
                }
            }
        }

        let points = self.policy.points_earned(final_amount);
        if points > 0 {
            match self.customers.award_points(customer_id, points).await {
                Ok(_) => settlement.awarded = Some(points),
                Err(e) => {
                    self.counters.side_effect_failed(SideEffect::LoyaltyAward);
                    error!(
                        "❌ Loyalty award of {} points failed for customer {}: {:?}",
                        points, customer_id, e
                    );
                }
            }
        }

        info!(
            "🎁 Loyalty settled for customer {}: redeemed {:?}, awarded {:?}",
            customer_id, settlement.redeemed, settlement.awarded
        );
        settlement
    }
}

fn redeem_error(customer_id: i32, err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::NotFound => {
            ServiceError::InvalidState(format!("customer {customer_id} does not exist"))
        }
        RepositoryError::Conflict(msg) => ServiceError::InvalidState(msg),
        other => ServiceError::Repo(other),
    }
}
