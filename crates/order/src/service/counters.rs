use crate::model::{
    order::{OrderStatus, OrderType},
    order_token::StationType,
};
use prometheus_client::metrics::{counter::Counter, family::Family};
use prometheus_client::registry::Registry;
use prometheus_client_derive_encode::{EncodeLabelSet, EncodeLabelValue};

/// Post-commit steps whose failures are logged instead of returned.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum SideEffect {
    TableStatus,
    TokenRetire,
    TokenDelivery,
    LoyaltyRedeem,
    LoyaltyAward,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct OrderTypeLabels {
    pub order_type: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct TransitionLabels {
    pub from: String,
    pub to: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct StationLabels {
    pub station: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct SideEffectLabels {
    pub effect: SideEffect,
}

/// Business counters exported next to the per-operation service metrics.
#[derive(Clone, Debug, Default)]
pub struct OrderCounters {
    created: Family<OrderTypeLabels, Counter>,
    transitions: Family<TransitionLabels, Counter>,
    tokens_issued: Family<StationLabels, Counter>,
    side_effect_failures: Family<SideEffectLabels, Counter>,
}

impl OrderCounters {
    pub fn register(&self, registry: &mut Registry) {
        let order = registry.sub_registry_with_prefix("order");

        order.register("created", "Orders created, by order type", self.created.clone());
        order.register(
            "status_transitions",
            "Status changes applied by updates",
            self.transitions.clone(),
        );
        order.register(
            "tokens_issued",
            "Preparation tokens issued, by station",
            self.tokens_issued.clone(),
        );
        order.register(
            "side_effect_failures",
            "Post-commit steps that failed and were skipped",
            self.side_effect_failures.clone(),
        );
    }

    pub fn order_created(&self, order_type: OrderType) {
        self.created
            .get_or_create(&OrderTypeLabels {
                order_type: order_type.as_str().to_string(),
            })
            .inc();
    }

    pub fn status_changed(&self, from: OrderStatus, to: OrderStatus) {
        if from != to {
            self.transitions.get_or_create(&transition(from, to)).inc();
        }
    }

    pub fn token_issued(&self, station: StationType) {
        self.tokens_issued.get_or_create(&station_labels(station)).inc();
    }

    pub fn side_effect_failed(&self, effect: SideEffect) {
        self.side_effect_failures
            .get_or_create(&SideEffectLabels { effect })
            .inc();
    }

    pub fn created_of(&self, order_type: OrderType) -> u64 {
        self.created
            .get_or_create(&OrderTypeLabels {
                order_type: order_type.as_str().to_string(),
            })
            .get()
    }

    pub fn transitions_between(&self, from: OrderStatus, to: OrderStatus) -> u64 {
        self.transitions.get_or_create(&transition(from, to)).get()
    }

    pub fn issued_for(&self, station: StationType) -> u64 {
        self.tokens_issued.get_or_create(&station_labels(station)).get()
    }

    pub fn failures_of(&self, effect: SideEffect) -> u64 {
        self.side_effect_failures
            .get_or_create(&SideEffectLabels { effect })
            .get()
    }
}

fn transition(from: OrderStatus, to: OrderStatus) -> TransitionLabels {
    TransitionLabels {
        from: from.as_str().to_string(),
        to: to.as_str().to_string(),
    }
}

fn station_labels(station: StationType) -> StationLabels {
    StationLabels {
        station: station.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus_client::encoding::text::encode;

    #[test]
    fn same_status_is_not_a_transition() {
        let counters = OrderCounters::default();

        counters.status_changed(OrderStatus::Pending, OrderStatus::Pending);
        counters.status_changed(OrderStatus::Pending, OrderStatus::Processing);

        assert_eq!(
            counters.transitions_between(OrderStatus::Pending, OrderStatus::Pending),
            0
        );
        assert_eq!(
            counters.transitions_between(OrderStatus::Pending, OrderStatus::Processing),
            1
        );
    }

    #[test]
    fn exported_under_the_order_prefix() {
        let mut registry = Registry::default();
        let counters = OrderCounters::default();
        counters.register(&mut registry);
        counters.token_issued(StationType::Kitchen);
        counters.side_effect_failed(SideEffect::LoyaltyAward);

        let mut out = String::new();
        encode(&mut out, &registry).expect("encode registry");

        assert!(out.contains("order_tokens_issued_total{station=\"KITCHEN\"} 1"));
        assert!(out.contains("order_side_effect_failures_total{effect=\"LoyaltyAward\"} 1"));
    }
}
