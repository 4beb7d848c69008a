use crate::{
    abstract_trait::{
        customer::repository::DynCustomerQueryRepository,
        discount::repository::DynDiscountQueryRepository,
        item::repository::DynItemQueryRepository,
        order::{
            repository::{DynOrderCommandRepository, DynOrderQueryRepository},
            service::OrderCommandServiceTrait,
        },
        order_item::repository::DynOrderItemQueryRepository,
        order_token::repository::DynOrderTokenQueryRepository,
    },
    domain::{
        requests::{
            order::{
                CreateOrderRecordRequest, CreateOrderRequest, ItemReconciliation,
                OrderItemRecord, OrderItemRequest, UpdateOrderRecordRequest, UpdateOrderRequest,
            },
            order_token::{TokenDraft, TokenPlan},
            reference::normalize_refs,
        },
        response::{
            api::ApiResponse,
            order::{OrderResponse, OrderResponseDeleteAt},
            order_token::OrderTokenResponse,
        },
    },
    model::{
        discount::Discount,
        item::MenuItem,
        order::{Order as OrderModel, OrderStatus},
        order_token::StationType,
        table::Table,
    },
    service::{
        counters::{OrderCounters, SideEffect},
        discount::DiscountCalculator,
        loyalty::LoyaltyLedger,
        order::{OrderAssembler, cache},
        table::TableRegistry,
        token::TokenDispatcher,
    },
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use rust_decimal::Decimal;
use shared::{
    cache::CacheStore,
    errors::ServiceError,
    utils::{DynClock, Metrics, ServiceTracing, TracingContext},
};
use std::{collections::HashMap, sync::Arc};
use tracing::{error, info, warn};
use validator::Validate;

#[derive(Clone)]
pub struct OrderCommandService {
    command: DynOrderCommandRepository,
    query: DynOrderQueryRepository,
    order_item_query: DynOrderItemQueryRepository,
    order_token_query: DynOrderTokenQueryRepository,
    item_query: DynItemQueryRepository,
    customer_query: DynCustomerQueryRepository,
    discount_query: DynDiscountQueryRepository,
    tables: TableRegistry,
    tokens: TokenDispatcher,
    loyalty: LoyaltyLedger,
    assembler: OrderAssembler,
    cache_store: Arc<CacheStore>,
    clock: DynClock,
    counters: OrderCounters,
    tracing: ServiceTracing,
}

pub struct OrderCommandServiceDeps {
    pub command: DynOrderCommandRepository,
    pub query: DynOrderQueryRepository,
    pub order_item_query: DynOrderItemQueryRepository,
    pub order_token_query: DynOrderTokenQueryRepository,
    pub item_query: DynItemQueryRepository,
    pub customer_query: DynCustomerQueryRepository,
    pub discount_query: DynDiscountQueryRepository,
    pub tables: TableRegistry,
    pub tokens: TokenDispatcher,
    pub loyalty: LoyaltyLedger,
    pub assembler: OrderAssembler,
    pub cache_store: Arc<CacheStore>,
    pub clock: DynClock,
    pub counters: OrderCounters,
}

/// Validated, priced item lines ready to persist.
struct PricedLines {
    records: Vec<OrderItemRecord>,
    stations: Vec<Option<StationType>>,
    subtotal: Decimal,
}

impl OrderCommandService {
    pub fn new(deps: OrderCommandServiceDeps, registry: &mut Registry) -> Result<Self> {
        let OrderCommandServiceDeps {
            command,
            query,
            order_item_query,
            order_token_query,
            item_query,
            customer_query,
            discount_query,
            tables,
            tokens,
            loyalty,
            assembler,
            cache_store,
            clock,
            counters,
        } = deps;

        let metrics = Metrics::new();
        metrics.register(registry, "order_command_service");
        counters.register(registry);

        Ok(Self {
            command,
            query,
            order_item_query,
            order_token_query,
            item_query,
            customer_query,
            discount_query,
            tables,
            tokens,
            loyalty,
            assembler,
            cache_store,
            clock,
            counters,
            tracing: ServiceTracing::new("order-command-service", metrics),
        })
    }

    async fn load_order(&self, id: i32) -> Result<OrderModel, ServiceError> {
        self.query
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("order {id}")))
    }

    fn ensure_mutable(order: &OrderModel) -> Result<(), ServiceError> {
        if order.is_trashed() {
            return Err(ServiceError::InvalidState(format!(
                "order {} is in the trash",
                order.order_id
            )));
        }
        if order.status.is_terminal() {
            return Err(ServiceError::InvalidState(format!(
                "order {} is already {}",
                order.order_id,
                order.status.as_str()
            )));
        }
        Ok(())
    }

    /// `ORD-YYMMDD###`, numbered by orders already created that UTC day.
    async fn next_order_id(&self, now: DateTime<Utc>) -> Result<String, ServiceError> {
        let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let end = start + Duration::days(1);

        let count = self.query.count_created_between(start, end).await?;

        Ok(format!("ORD-{}{:03}", now.format("%y%m%d"), count + 1))
    }

    async fn find_customer(&self, id: Option<i32>) -> Result<Option<i32>, ServiceError> {
        let Some(id) = id else {
            return Ok(None);
        };

        let found = self.customer_query.find_by_ids(&[id]).await?;
        if found.is_empty() {
            return Err(ServiceError::NotFound(format!("customer {id}")));
        }
        Ok(Some(id))
    }

    async fn find_discount(&self, id: Option<i32>) -> Result<Option<Discount>, ServiceError> {
        let Some(id) = id else {
            return Ok(None);
        };

        self.discount_query
            .find_by_ids(&[id])
            .await?
            .into_iter()
            .next()
            .map(Some)
            .ok_or_else(|| ServiceError::NotFound(format!("discount {id}")))
    }

    async fn load_menu(&self, item_ids: &[i32]) -> Result<HashMap<i32, MenuItem>, ServiceError> {
        let menu: HashMap<i32, MenuItem> = self
            .item_query
            .find_by_ids(item_ids)
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();

        if let Some(missing) = item_ids.iter().find(|id| !menu.contains_key(*id)) {
            return Err(ServiceError::NotFound(format!("item {missing}")));
        }
        Ok(menu)
    }

    /// Resolves menu items and variations, then prices every line.
    async fn price_lines(&self, lines: &[OrderItemRequest]) -> Result<PricedLines, ServiceError> {
        let mut item_ids: Vec<i32> = lines.iter().map(|l| l.item_id).collect();
        item_ids.sort_unstable();
        item_ids.dedup();
        let menu = self.load_menu(&item_ids).await?;

        let variation_ids: Vec<i32> = lines.iter().filter_map(|l| l.variation_id).collect();
        if !variation_ids.is_empty() {
            let variations = self.item_query.find_variations_by_ids(&variation_ids).await?;
            for line in lines {
                if let Some(variation_id) = line.variation_id
                    && !variations
                        .iter()
                        .any(|v| v.id == variation_id && v.item_id == line.item_id)
                {
                    return Err(ServiceError::NotFound(format!(
                        "variation {variation_id} of item {}",
                        line.item_id
                    )));
                }
            }
        }

        let mut records = Vec::with_capacity(lines.len());
        let mut stations = Vec::with_capacity(lines.len());
        let mut subtotal = Decimal::ZERO;

        for line in lines {
            let total_price = DiscountCalculator::line_total(line.unit_price, line.quantity);
            subtotal += total_price;

            stations.push(
                menu.get(&line.item_id)
                    .and_then(|item| item.category_type.station()),
            );
            records.push(OrderItemRecord {
                id: line.id,
                item_id: line.item_id,
                variation_id: line.variation_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
                total_price,
            });
        }

        Ok(PricedLines {
            records,
            stations,
            subtotal,
        })
    }

    async fn invalidate(&self) {
        self.cache_store.invalidate(cache::ORDER_PATTERN).await;
    }

    fn count_issued<'a>(&self, drafts: impl IntoIterator<Item = &'a TokenDraft>) {
        for draft in drafts {
            self.counters.token_issued(draft.station_type);
        }
    }

    async fn respond(&self, order: OrderModel) -> Result<OrderResponse, ServiceError> {
        Ok(self.assembler.assemble_one(order).await?)
    }

    async fn create(&self, req: &CreateOrderRequest) -> Result<OrderResponse, ServiceError> {
        req.validate()?;

        let table_ids = normalize_refs(&req.tables);
        let tables = self.tables.resolve(&table_ids).await?;
        let customer_id = self.find_customer(req.customer.as_ref().map(|c| c.id())).await?;
        let discount = self.find_discount(req.discount.as_ref().map(|d| d.id())).await?;
        let lines = self.price_lines(&req.items).await?;

        let discount_amount = DiscountCalculator::compute(lines.subtotal, discount.as_ref());
        let now = self.clock.now();
        let order_id = self.next_order_id(now).await?;
        let tokens = self.tokens.plan(&lines.stations).await;

        let record = CreateOrderRecordRequest {
            order_id,
            order_type: req.order_type,
            status: OrderStatus::Pending,
            subtotal: lines.subtotal,
            discount_amount,
            total_amount: lines.subtotal - discount_amount,
            payment_method: req.payment_method,
            customer_id,
            user_id: req.user_id,
            discount_id: discount.as_ref().map(|d| d.id),
            table_ids,
            items: lines.records,
            tokens,
            created_at: now,
        };

        let order = self.command.create_order(&record).await?;
        self.counters.order_created(order.order_type);
        self.count_issued(&record.tokens);

        self.tables.reserve_for_order(&tables, order.status).await;
        self.invalidate().await;

        self.respond(order).await
    }

    async fn update(&self, req: &UpdateOrderRequest) -> Result<OrderResponse, ServiceError> {
        req.validate()?;

        let existing = self.load_order(req.id).await?;
        Self::ensure_mutable(&existing)?;

        let next_status = req.status.unwrap_or(existing.status);
        if !existing.status.can_transition_to(next_status) {
            return Err(ServiceError::InvalidState(format!(
                "order {} cannot go from {} to {}",
                existing.order_id,
                existing.status.as_str(),
                next_status.as_str()
            )));
        }

        let table_change: Option<(Vec<i32>, Vec<Table>)> = match &req.tables {
            Some(refs) => {
                let ids = normalize_refs(refs);
                let tables = self.tables.resolve(&ids).await?;
                Some((ids, tables))
            }
            None => None,
        };

        let customer_id = match req.customer.as_ref().map(|c| c.id()) {
            Some(id) if Some(id) != existing.customer_id => self.find_customer(Some(id)).await?,
            Some(id) => Some(id),
            None => existing.customer_id,
        };

        let requested_discount = req.discount.as_ref().map(|d| d.id());
        let discount_changed =
            requested_discount.is_some() && requested_discount != existing.discount_id;
        let discount_id = requested_discount.or(existing.discount_id);

        let mut subtotal = existing.subtotal;
        let mut reconciliation = None;
        let mut token_plan = TokenPlan::Keep;

        if let Some(lines) = &req.items {
            let current = self.order_item_query.find_by_order(existing.id).await?;

            if let Some(stray) = lines
                .iter()
                .filter_map(|l| l.id)
                .find(|id| !current.iter().any(|c| c.id == *id))
            {
                return Err(ServiceError::NotFound(format!(
                    "order item {stray} on order {}",
                    existing.order_id
                )));
            }

            let priced = self.price_lines(lines).await?;
            let removed_ids = current
                .iter()
                .map(|c| c.id)
                .filter(|id| !lines.iter().any(|l| l.id == Some(*id)))
                .collect();

            token_plan = if priced.records.is_empty() || next_status == OrderStatus::Cancelled {
                TokenPlan::RetireAll
            } else {
                TokenPlan::Replace(self.tokens.plan(&priced.stations).await)
            };

            subtotal = priced.subtotal;
            reconciliation = Some(ItemReconciliation {
                items: priced.records,
                removed_ids,
            });
        }

        let discount_amount = if discount_changed {
            let policy = self.find_discount(discount_id).await?;
            DiscountCalculator::compute(subtotal, policy.as_ref())
        } else if reconciliation.is_some() {
            match discount_id {
                None => Decimal::ZERO,
                Some(id) => match self.discount_query.find_by_ids(&[id]).await?.first() {
                    Some(policy) => DiscountCalculator::compute(subtotal, Some(policy)),
                    None => {
                        warn!(
                            "⚠️ Discount {} of order {} is gone; keeping the previous amount",
                            id, existing.order_id
                        );
                        existing.discount_amount
                    }
                },
            }
        } else {
            existing.discount_amount
        };

        let now = self.clock.now();
        let completing =
            next_status == OrderStatus::Completed && existing.status != OrderStatus::Completed;
        let completion_duration = if completing {
            Some((now - existing.created_at).num_minutes().max(0) as i32)
        } else {
            existing.completion_duration
        };

        let previous_tables = match &table_change {
            Some(_) => self.tables.tables_of(existing.id).await?,
            None => Vec::new(),
        };

        let record = UpdateOrderRecordRequest {
            id: existing.id,
            order_type: req.order_type.unwrap_or(existing.order_type),
            status: next_status,
            subtotal,
            discount_amount,
            total_amount: subtotal - discount_amount,
            payment_method: req.payment_method.or(existing.payment_method),
            completion_duration,
            customer_id,
            user_id: req.user_id.or(existing.user_id),
            discount_id,
            table_ids: table_change.as_ref().map(|(ids, _)| ids.clone()),
            items: reconciliation,
            tokens: token_plan,
            updated_at: now,
        };

        let order = self.command.update_order(&record).await?;
        self.counters.status_changed(existing.status, order.status);
        if let TokenPlan::Replace(drafts) = &record.tokens {
            self.count_issued(drafts);
        }

        // Everything below runs after commit and only logs on failure.
        if let Some((ids, tables)) = &table_change {
            let dropped: Vec<Table> = previous_tables
                .into_iter()
                .filter(|t| !ids.contains(&t.id))
                .collect();
            self.tables.release(&dropped).await;
            self.tables.reserve_for_order(tables, order.status).await;
        }

        if order.status.is_terminal() {
            self.tables.release_from_order(order.id).await;
        }

        if order.status == OrderStatus::Cancelled {
            self.tokens.retire(order.id).await;
        }

        if completing {
            match self.order_token_query.find_by_order_ids(&[order.id]).await {
                Ok(tokens) => {
                    let delivered = self.tokens.mark_delivered(&tokens).await;
                    info!("🍽️ Delivered {} tokens of order {}", delivered, order.order_id);
                }
                Err(e) => {
                    self.counters.side_effect_failed(SideEffect::TokenDelivery);
                    error!(
                        "❌ Could not load tokens of completed order {}: {:?}",
                        order.order_id, e
                    );
                }
            }

            if let Some(customer_id) = order.customer_id {
                self.loyalty
                    .settle(customer_id, order.total_amount, req.redeem_amount)
                    .await;
            }
        }

        self.invalidate().await;

        self.respond(order).await
    }

    async fn trash(&self, id: i32) -> Result<OrderResponseDeleteAt, ServiceError> {
        let existing = self.load_order(id).await?;
        if existing.is_trashed() {
            return Err(ServiceError::InvalidState(format!(
                "order {} is already in the trash",
                existing.order_id
            )));
        }

        let order = self.command.trash_order(id, self.clock.now()).await?;

        // terminal orders already gave their tables back
        if !order.status.is_terminal() {
            self.tables.release_from_order(order.id).await;
        }
        self.invalidate().await;

        Ok(order.into())
    }

    async fn restore(&self, id: i32) -> Result<OrderResponseDeleteAt, ServiceError> {
        let existing = self.load_order(id).await?;
        if !existing.is_trashed() {
            return Err(ServiceError::InvalidState(format!(
                "order {} is not in the trash",
                existing.order_id
            )));
        }

        let order = self.command.restore_order(id).await?;

        // a live order takes back the tables trashing released
        if !order.status.is_terminal() {
            match self.tables.tables_of(order.id).await {
                Ok(tables) => {
                    self.tables.reserve_for_order(&tables, order.status).await;
                }
                Err(e) => {
                    self.counters.side_effect_failed(SideEffect::TableStatus);
                    error!(
                        "❌ Could not load tables of restored order {}: {:?}",
                        order.order_id, e
                    );
                }
            }
        }
        self.invalidate().await;

        Ok(order.into())
    }

    async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let existing = self.load_order(id).await?;
        if !existing.is_trashed() {
            return Err(ServiceError::InvalidState(format!(
                "order {} must be trashed before it can be deleted permanently",
                existing.order_id
            )));
        }

        self.command
            .delete_order(id)
            .await
            .map_err(|e| ServiceError::not_found_or_repo(e, format!("order {id}")))?;

        self.invalidate().await;
        Ok(())
    }

    async fn regenerate(&self, id: i32) -> Result<Vec<OrderTokenResponse>, ServiceError> {
        let existing = self.load_order(id).await?;
        Self::ensure_mutable(&existing)?;

        let items = self.order_item_query.find_by_order(id).await?;
        let mut item_ids: Vec<i32> = items.iter().map(|i| i.item_id).collect();
        item_ids.sort_unstable();
        item_ids.dedup();
        let menu = self.load_menu(&item_ids).await?;

        let lines: Vec<(i32, Option<StationType>)> = items
            .iter()
            .map(|i| {
                let station = menu
                    .get(&i.item_id)
                    .and_then(|item| item.category_type.station());
                (i.id, station)
            })
            .collect();

        let issued = self.tokens.dispatch(id, &lines).await?;
        self.invalidate().await;

        Ok(issued
            .into_iter()
            .map(|t| OrderTokenResponse::from_model(t.token, t.order_item_ids))
            .collect())
    }

    fn finish<T>(
        &self,
        ctx: &TracingContext,
        result: &Result<T, ServiceError>,
        success: &str,
    ) {
        match result {
            Ok(_) => self.tracing.complete_success(ctx, success),
            Err(e) => self.tracing.complete_error(ctx, &e.to_string()),
        }
    }
}

#[async_trait]
impl OrderCommandServiceTrait for OrderCommandService {
    async fn create_order(
        &self,
        req: &CreateOrderRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        info!(
            "🏗️ Creating {} order with {} items",
            req.order_type.as_str(),
            req.items.len()
        );

        let ctx = self.tracing.start(
            "CreateOrder",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("operation", "create"),
                KeyValue::new("order.type", req.order_type.as_str()),
                KeyValue::new("order.items", req.items.len() as i64),
            ],
        );

        let result = self.create(req).await;
        self.finish(&ctx, &result, "Order created");

        let order = result?;
        info!("✅ Order {} created, total {}", order.order_id, order.total_amount);

        Ok(ApiResponse::success("Order created successfully", order))
    }

    async fn update_order(
        &self,
        req: &UpdateOrderRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        info!("🔄 Updating order {}", req.id);

        let ctx = self.tracing.start(
            "UpdateOrder",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("operation", "update"),
                KeyValue::new("order.id", req.id as i64),
            ],
        );

        let result = self.update(req).await;
        self.finish(&ctx, &result, "Order updated");

        let order = result?;
        info!("✅ Order {} is {}", order.order_id, order.status.as_str());

        Ok(ApiResponse::success("Order updated successfully", order))
    }

    async fn trash_order(
        &self,
        id: i32,
    ) -> Result<ApiResponse<OrderResponseDeleteAt>, ServiceError> {
        info!("🗑️ Trashing order {}", id);

        let ctx = self.tracing.start(
            "TrashOrder",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("operation", "trash"),
                KeyValue::new("order.id", id as i64),
            ],
        );

        let result = self.trash(id).await;
        self.finish(&ctx, &result, "Order trashed");

        Ok(ApiResponse::success("Order trashed successfully", result?))
    }

    async fn restore_order(
        &self,
        id: i32,
    ) -> Result<ApiResponse<OrderResponseDeleteAt>, ServiceError> {
        info!("♻️ Restoring order {}", id);

        let ctx = self.tracing.start(
            "RestoreOrder",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("operation", "restore"),
                KeyValue::new("order.id", id as i64),
            ],
        );

        let result = self.restore(id).await;
        self.finish(&ctx, &result, "Order restored");

        Ok(ApiResponse::success("Order restored successfully", result?))
    }

    async fn delete_order(&self, id: i32) -> Result<ApiResponse<()>, ServiceError> {
        info!("🧨 Permanently deleting order {}", id);

        let ctx = self.tracing.start(
            "DeleteOrder",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("operation", "delete"),
                KeyValue::new("order.id", id as i64),
            ],
        );

        let result = self.delete(id).await;
        self.finish(&ctx, &result, "Order deleted permanently");
        result?;

        Ok(ApiResponse::success("Order deleted permanently", ()))
    }

    async fn restore_all_orders(&self) -> Result<ApiResponse<u64>, ServiceError> {
        let ctx = self.tracing.start(
            "RestoreAllOrders",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("operation", "restore_all"),
            ],
        );

        let result = self.command.restore_all_orders().await.map_err(ServiceError::from);
        self.finish(&ctx, &result, "Trashed orders restored");
        let restored = result?;

        self.invalidate().await;
        Ok(ApiResponse::success(
            format!("{restored} orders restored"),
            restored,
        ))
    }

    async fn delete_all_trashed_orders(&self) -> Result<ApiResponse<u64>, ServiceError> {
        let ctx = self.tracing.start(
            "DeleteAllTrashedOrders",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("operation", "delete_all"),
            ],
        );

        let result = self
            .command
            .delete_all_trashed_orders()
            .await
            .map_err(ServiceError::from);
        self.finish(&ctx, &result, "Trashed orders deleted");
        let deleted = result?;

        self.invalidate().await;
        Ok(ApiResponse::success(
            format!("{deleted} orders deleted permanently"),
            deleted,
        ))
    }

    async fn regenerate_tokens(
        &self,
        id: i32,
    ) -> Result<ApiResponse<Vec<OrderTokenResponse>>, ServiceError> {
        info!("🎫 Regenerating tokens for order {}", id);

        let ctx = self.tracing.start(
            "RegenerateOrderTokens",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("operation", "regenerate_tokens"),
                KeyValue::new("order.id", id as i64),
            ],
        );

        let result = self.regenerate(id).await;
        self.finish(&ctx, &result, "Tokens regenerated");

        Ok(ApiResponse::success("Tokens regenerated successfully", result?))
    }
}
