use crate::{
    abstract_trait::order_token::repository::{
        DynOrderTokenCommandRepository, DynOrderTokenQueryRepository,
    },
    domain::requests::order_token::{CreateOrderTokenRecordRequest, TokenDraft},
    model::order_token::{OrderToken, StationType, TokenPriority, TokenStatus},
    service::counters::{OrderCounters, SideEffect},
};
use chrono::{DateTime, Utc};
use shared::{errors::ServiceError, utils::DynClock};
use tracing::{error, info, warn};

const STATIONS: [StationType; 2] = [StationType::Bar, StationType::Kitchen];

/// `{B|K}-YYYYMMDD-###`.
pub fn token_code(station: StationType, at: DateTime<Utc>, suffix: u32) -> String {
    format!(
        "{}-{}-{:03}",
        station.code_prefix(),
        at.format("%Y%m%d"),
        suffix % 1000
    )
}

/// Positions of the lines routed to each station, in line order.
pub fn partition(stations: &[Option<StationType>]) -> Vec<(StationType, Vec<usize>)> {
    STATIONS
        .iter()
        .map(|station| {
            let positions = stations
                .iter()
                .enumerate()
                .filter(|(_, s)| **s == Some(*station))
                .map(|(pos, _)| pos)
                .collect::<Vec<_>>();
            (*station, positions)
        })
        .filter(|(_, positions)| !positions.is_empty())
        .collect()
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: OrderToken,
    pub order_item_ids: Vec<i32>,
}

/// Splits order lines into bar and kitchen tickets.
#[derive(Clone)]
pub struct TokenDispatcher {
    query: DynOrderTokenQueryRepository,
    command: DynOrderTokenCommandRepository,
    clock: DynClock,
    counters: OrderCounters,
}

impl TokenDispatcher {
    pub fn new(
        query: DynOrderTokenQueryRepository,
        command: DynOrderTokenCommandRepository,
        clock: DynClock,
        counters: OrderCounters,
    ) -> Self {
        Self {
            query,
            command,
            clock,
            counters,
        }
    }

    /// One pending draft per station that has lines; `stations[i]` classifies line `i`.
    pub async fn plan(&self, stations: &[Option<StationType>]) -> Vec<TokenDraft> {
        let mut drafts = Vec::new();

        for (station, item_positions) in partition(stations) {
            let token_code = self.next_code(station).await;
            drafts.push(TokenDraft {
                token_code,
                station_type: station,
                priority: TokenPriority::Normal,
                item_positions,
            });
        }

        drafts
    }

    /// Retires the order's pending tokens and issues fresh ones for `lines`.
    ///
    /// `lines` pairs each persisted order item id with its station, in item order.
    pub async fn dispatch(
        &self,
        order_id: i32,
        lines: &[(i32, Option<StationType>)],
    ) -> Result<Vec<IssuedToken>, ServiceError> {
        let stations: Vec<Option<StationType>> = lines.iter().map(|(_, s)| *s).collect();
        let drafts = self.plan(&stations).await;
        let now = self.clock.now();

        let records: Vec<CreateOrderTokenRecordRequest> = drafts
            .iter()
            .map(|draft| CreateOrderTokenRecordRequest {
                order_id,
                token_code: draft.token_code.clone(),
                station_type: draft.station_type,
                priority: draft.priority,
                order_item_ids: draft.item_positions.iter().map(|&pos| lines[pos].0).collect(),
                created_at: now,
            })
            .collect();

        let tokens = self
            .command
            .replace_active_for_order(order_id, &records, now)
            .await?;

        info!("🎫 Dispatched {} tokens for order {}", tokens.len(), order_id);
        for token in &tokens {
            self.counters.token_issued(token.station_type);
        }

        Ok(tokens
            .into_iter()
            .zip(records)
            .map(|(token, record)| IssuedToken {
                token,
                order_item_ids: record.order_item_ids,
            })
            .collect())
    }

    pub async fn retire(&self, order_id: i32) {
        match self
            .command
            .retire_active_for_order(order_id, self.clock.now())
            .await
        {
            Ok(count) => info!("🎫 Retired {} tokens of order {}", count, order_id),
            Err(e) => {
                self.counters.side_effect_failed(SideEffect::TokenRetire);
                error!("❌ Failed to retire tokens of order {}: {:?}", order_id, e);
            }
        }
    }

    /// Marks pending tokens DELIVERED one by one; failures are logged per token.
    pub async fn mark_delivered(&self, tokens: &[OrderToken]) -> usize {
        let now = self.clock.now();
        let mut delivered = 0;

        for token in tokens.iter().filter(|t| t.is_active()) {
            match self
                .command
                .update_status(token.id, TokenStatus::Delivered, now)
                .await
            {
                Ok(_) => delivered += 1,
                Err(e) => {
                    self.counters.side_effect_failed(SideEffect::TokenDelivery);
                    error!(
                        "❌ Failed to mark token {} of order {} delivered: {:?}",
                        token.token_code, token.order_id, e
                    );
                }
            }
        }

        delivered
    }

    async fn next_code(&self, station: StationType) -> String {
        let now = self.clock.now();

        let primary = token_code(station, now, now.timestamp_subsec_millis());
        if !self.code_taken(&primary).await {
            return primary;
        }

        let fallback = token_code(station, now, now.timestamp_subsec_micros());
        if self.code_taken(&fallback).await {
            warn!("⚠️ Token code {} collides too; issuing it anyway", fallback);
        }
        fallback
    }

    async fn code_taken(&self, code: &str) -> bool {
        match self.query.code_exists(code).await {
            Ok(taken) => taken,
            Err(e) => {
                warn!("⚠️ Could not check token code {}: {:?}", code, e);
                false
            }
        }
    }
}
