//! In-memory stand-ins for every repository, wired into real services.
//!
//! The store mirrors the Postgres repositories closely enough for the
//! order lifecycle: soft deletes, item positions, token retirement, and
//! table links. Failure switches let tests break the best-effort side
//! effects on purpose.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use order::{
    abstract_trait::{
        customer::repository::{CustomerCommandRepositoryTrait, CustomerQueryRepositoryTrait},
        discount::repository::DiscountQueryRepositoryTrait,
        item::repository::ItemQueryRepositoryTrait,
        order::repository::{OrderCommandRepositoryTrait, OrderQueryRepositoryTrait},
        order_item::repository::OrderItemQueryRepositoryTrait,
        order_token::repository::{
            OrderTokenCommandRepositoryTrait, OrderTokenQueryRepositoryTrait,
        },
        table::repository::{TableCommandRepositoryTrait, TableQueryRepositoryTrait},
    },
    domain::requests::{
        order::{
            CreateOrderRecordRequest, CreateOrderRequest, FindAllOrder, OrderItemRecord,
            OrderItemRequest, OrderSortField, SortDirection, UpdateOrderRecordRequest,
        },
        order_token::{CreateOrderTokenRecordRequest, TokenDraft, TokenPlan},
        reference::EntityRef,
    },
    model::{
        customer::Customer,
        discount::{Discount, DiscountType},
        item::{CategoryType, ItemVariation, MenuItem},
        order::{Order, OrderStatus, OrderStatusCount, OrderType},
        order_item::OrderItem,
        order_token::{OrderToken, OrderTokenItem, StationType, TokenPriority, TokenStatus},
        table::{OrderTable, Table, TableStatus},
    },
    service::{
        counters::OrderCounters,
        loyalty::{LoyaltyLedger, RateLoyaltyPolicy},
        order::{
            OrderAssembler, OrderAssemblerDeps, OrderCommandService, OrderCommandServiceDeps,
            OrderQueryService,
        },
        table::TableRegistry,
        token::TokenDispatcher,
    },
};
use prometheus_client::registry::Registry;
use rust_decimal::Decimal;
use shared::{
    cache::{CacheStore, MemoryCacheBackend},
    errors::RepositoryError,
    utils::FixedClock,
};
use std::{
    collections::BTreeMap,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
};

pub fn opening_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).unwrap()
}

#[derive(Default)]
pub struct Db {
    seq: i32,
    pub orders: BTreeMap<i32, Order>,
    pub order_tables: Vec<(i32, i32)>,
    pub items: BTreeMap<i32, OrderItem>,
    pub tokens: BTreeMap<i32, OrderToken>,
    pub token_items: Vec<OrderTokenItem>,
    pub tables: BTreeMap<i32, Table>,
    pub menu: BTreeMap<i32, MenuItem>,
    pub variations: BTreeMap<i32, ItemVariation>,
    pub customers: BTreeMap<i32, Customer>,
    pub discounts: BTreeMap<i32, Discount>,
}

impl Db {
    fn next_id(&mut self) -> i32 {
        self.seq += 1;
        self.seq
    }

    fn item_ids_of(&self, order_id: i32) -> Vec<i32> {
        let mut items: Vec<&OrderItem> =
            self.items.values().filter(|i| i.order_id == order_id).collect();
        items.sort_by_key(|i| (i.position, i.id));
        items.iter().map(|i| i.id).collect()
    }

    fn retire_pending(&mut self, order_id: i32, at: DateTime<Utc>) -> u64 {
        let mut retired = 0;
        for token in self
            .tokens
            .values_mut()
            .filter(|t| t.order_id == order_id && t.status == TokenStatus::Pending)
        {
            token.status = TokenStatus::Cancelled;
            token.updated_at = at;
            retired += 1;
        }
        retired
    }

    fn insert_token(
        &mut self,
        order_id: i32,
        code: &str,
        station: StationType,
        priority: TokenPriority,
        item_ids: &[i32],
        at: DateTime<Utc>,
    ) -> i32 {
        let id = self.next_id();
        self.tokens.insert(
            id,
            OrderToken {
                id,
                order_id,
                token_code: code.to_string(),
                station_type: station,
                status: TokenStatus::Pending,
                priority,
                created_at: at,
                updated_at: at,
            },
        );
        for (position, order_item_id) in item_ids.iter().enumerate() {
            self.token_items.push(OrderTokenItem {
                token_id: id,
                order_item_id: *order_item_id,
                position: position as i32,
            });
        }
        id
    }

    fn insert_drafts(
        &mut self,
        order_id: i32,
        drafts: &[TokenDraft],
        item_ids: &[i32],
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        for draft in drafts {
            let covered = draft
                .item_positions
                .iter()
                .map(|&pos| item_ids.get(pos).copied())
                .collect::<Option<Vec<i32>>>()
                .ok_or_else(|| RepositoryError::Custom("position outside the order".into()))?;
            self.insert_token(
                order_id,
                &draft.token_code,
                draft.station_type,
                draft.priority,
                &covered,
                at,
            );
        }
        Ok(())
    }

    fn insert_item(
        &mut self,
        order_id: i32,
        record: &OrderItemRecord,
        position: usize,
        at: DateTime<Utc>,
    ) -> i32 {
        let id = self.next_id();
        self.items.insert(
            id,
            OrderItem {
                id,
                order_id,
                item_id: record.item_id,
                variation_id: record.variation_id,
                quantity: record.quantity,
                unit_price: record.unit_price,
                total_price: record.total_price,
                position: position as i32,
                created_at: at,
                updated_at: at,
            },
        );
        id
    }

    fn purge(&mut self, order_id: i32) {
        let token_ids: Vec<i32> = self
            .tokens
            .values()
            .filter(|t| t.order_id == order_id)
            .map(|t| t.id)
            .collect();
        self.token_items.retain(|ti| !token_ids.contains(&ti.token_id));
        self.tokens.retain(|_, t| t.order_id != order_id);
        self.items.retain(|_, i| i.order_id != order_id);
        self.order_tables.retain(|(o, _)| *o != order_id);
        self.orders.remove(&order_id);
    }

    fn link_tables(&mut self, order_id: i32, table_ids: &[i32]) -> Result<(), RepositoryError> {
        if let Some(missing) = table_ids.iter().find(|id| !self.tables.contains_key(*id)) {
            return Err(RepositoryError::ForeignKey(format!("table {missing}")));
        }
        for table_id in table_ids {
            self.order_tables.push((order_id, *table_id));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    db: Mutex<Db>,
    pub fail_token_status: AtomicBool,
    pub fail_loyalty: AtomicBool,
    pub fail_table_status: AtomicBool,
}

impl MemoryStore {
    pub fn db(&self) -> MutexGuard<'_, Db> {
        self.db.lock().unwrap()
    }

    pub fn seed_table(&self, number: &str, status: TableStatus) -> i32 {
        let mut db = self.db();
        let id = db.next_id();
        db.tables.insert(
            id,
            Table {
                id,
                table_number: number.to_string(),
                capacity: 4,
                location: Some("main hall".to_string()),
                status,
                created_at: opening_time(),
                updated_at: opening_time(),
            },
        );
        id
    }

    pub fn seed_item(&self, name: &str, price: Decimal, category: CategoryType) -> i32 {
        let mut db = self.db();
        let id = db.next_id();
        db.menu.insert(
            id,
            MenuItem {
                id,
                name: name.to_string(),
                price,
                category_id: match category {
                    CategoryType::Bar => 1,
                    CategoryType::Kitchen => 2,
                    CategoryType::Other => 3,
                },
                category_type: category,
            },
        );
        id
    }

    pub fn seed_variation(&self, item_id: i32, name: &str, price: Decimal) -> i32 {
        let mut db = self.db();
        let id = db.next_id();
        db.variations.insert(
            id,
            ItemVariation {
                id,
                item_id,
                name: name.to_string(),
                price,
            },
        );
        id
    }

    pub fn seed_customer(&self, name: &str, points: i64) -> i32 {
        let mut db = self.db();
        let id = db.next_id();
        db.customers.insert(
            id,
            Customer {
                id,
                name: name.to_string(),
                phone: None,
                email: None,
                loyalty_points: points,
                created_at: opening_time(),
                updated_at: opening_time(),
                deleted_at: None,
            },
        );
        id
    }

    pub fn seed_discount(&self, name: &str, discount_type: DiscountType, value: Decimal) -> i32 {
        let mut db = self.db();
        let id = db.next_id();
        db.discounts.insert(
            id,
            Discount {
                id,
                name: name.to_string(),
                discount_type,
                value,
                created_at: opening_time(),
                updated_at: opening_time(),
                deleted_at: None,
            },
        );
        id
    }

    pub fn table_status(&self, id: i32) -> TableStatus {
        self.db().tables[&id].status
    }

    pub fn customer_points(&self, id: i32) -> i64 {
        self.db().customers[&id].loyalty_points
    }

    pub fn order_row(&self, id: i32) -> Option<Order> {
        self.db().orders.get(&id).cloned()
    }

    pub fn tokens_of(&self, order_id: i32) -> Vec<OrderToken> {
        self.db()
            .tokens
            .values()
            .filter(|t| t.order_id == order_id)
            .cloned()
            .collect()
    }

    pub fn active_tokens_of(&self, order_id: i32) -> Vec<OrderToken> {
        self.tokens_of(order_id)
            .into_iter()
            .filter(|t| t.status == TokenStatus::Pending)
            .collect()
    }

    pub fn items_of(&self, order_id: i32) -> Vec<OrderItem> {
        self.db()
            .items
            .values()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect()
    }

    pub fn token_item_links(&self) -> usize {
        self.db().token_items.len()
    }

    fn page(&self, req: &FindAllOrder, keep: impl Fn(&Order) -> bool) -> (Vec<Order>, i64) {
        let db = self.db();
        let search = req.search.trim().to_lowercase();

        let mut rows: Vec<Order> = db
            .orders
            .values()
            .filter(|o| keep(*o))
            .filter(|o| search.is_empty() || o.order_id.to_lowercase().contains(&search))
            .filter(|o| req.status.is_none_or(|s| o.status == s))
            .filter(|o| req.order_type.is_none_or(|t| o.order_type == t))
            .filter(|o| req.customer_id.is_none_or(|c| o.customer_id == Some(c)))
            .filter(|o| {
                req.table_id
                    .is_none_or(|t| db.order_tables.contains(&(o.id, t)))
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            let primary = match req.sort_by {
                OrderSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                OrderSortField::TotalAmount => a.total_amount.cmp(&b.total_amount),
                OrderSortField::OrderId => a.order_id.cmp(&b.order_id),
            };
            primary.then(a.id.cmp(&b.id))
        });
        if req.sort_order == SortDirection::Desc {
            rows.reverse();
        }

        let total = rows.len() as i64;
        let offset = ((req.page - 1).max(0) * req.page_size) as usize;
        let page = rows
            .into_iter()
            .skip(offset)
            .take(req.page_size as usize)
            .collect();

        (page, total)
    }
}

#[async_trait]
impl OrderCommandRepositoryTrait for MemoryStore {
    async fn create_order(&self, req: &CreateOrderRecordRequest) -> Result<Order, RepositoryError> {
        let mut db = self.db();
        let id = db.next_id();

        db.link_tables(id, &req.table_ids)?;

        let order = Order {
            id,
            order_id: req.order_id.clone(),
            order_type: req.order_type,
            status: req.status,
            subtotal: req.subtotal,
            discount_amount: req.discount_amount,
            total_amount: req.total_amount,
            payment_method: req.payment_method,
            completion_duration: None,
            customer_id: req.customer_id,
            user_id: req.user_id,
            discount_id: req.discount_id,
            created_at: req.created_at,
            updated_at: req.created_at,
            deleted_at: None,
        };
        db.orders.insert(id, order.clone());

        let item_ids: Vec<i32> = req
            .items
            .iter()
            .enumerate()
            .map(|(pos, record)| db.insert_item(id, record, pos, req.created_at))
            .collect();

        db.insert_drafts(id, &req.tokens, &item_ids, req.created_at)?;

        Ok(order)
    }

    async fn update_order(&self, req: &UpdateOrderRecordRequest) -> Result<Order, RepositoryError> {
        let mut db = self.db();

        let order = {
            let order = db.orders.get_mut(&req.id).ok_or(RepositoryError::NotFound)?;
            order.order_type = req.order_type;
            order.status = req.status;
            order.subtotal = req.subtotal;
            order.discount_amount = req.discount_amount;
            order.total_amount = req.total_amount;
            order.payment_method = req.payment_method;
            order.completion_duration = req.completion_duration;
            order.customer_id = req.customer_id;
            order.user_id = req.user_id;
            order.discount_id = req.discount_id;
            order.updated_at = req.updated_at;
            order.clone()
        };

        if let Some(table_ids) = &req.table_ids {
            db.order_tables.retain(|(o, _)| *o != order.id);
            db.link_tables(order.id, table_ids)?;
        }

        let mut item_ids = None;
        if let Some(recon) = &req.items {
            db.token_items
                .retain(|ti| !recon.removed_ids.contains(&ti.order_item_id));
            db.items.retain(|id, _| !recon.removed_ids.contains(id));

            let mut ids = Vec::with_capacity(recon.items.len());
            for (position, record) in recon.items.iter().enumerate() {
                match record.id {
                    Some(existing) => {
                        let item = db
                            .items
                            .get_mut(&existing)
                            .filter(|i| i.order_id == order.id)
                            .ok_or(RepositoryError::NotFound)?;
                        item.item_id = record.item_id;
                        item.variation_id = record.variation_id;
                        item.quantity = record.quantity;
                        item.unit_price = record.unit_price;
                        item.total_price = record.total_price;
                        item.position = position as i32;
                        item.updated_at = req.updated_at;
                        ids.push(existing);
                    }
                    None => ids.push(db.insert_item(order.id, record, position, req.updated_at)),
                }
            }
            item_ids = Some(ids);
        }

        match &req.tokens {
            TokenPlan::Keep => {}
            TokenPlan::RetireAll => {
                db.retire_pending(order.id, req.updated_at);
            }
            TokenPlan::Replace(drafts) => {
                let ids = item_ids.unwrap_or_else(|| db.item_ids_of(order.id));
                db.retire_pending(order.id, req.updated_at);
                db.insert_drafts(order.id, drafts, &ids, req.updated_at)?;
            }
        }

        Ok(order)
    }

    async fn trash_order(&self, id: i32, deleted_at: DateTime<Utc>) -> Result<Order, RepositoryError> {
        let mut db = self.db();
        let order = db
            .orders
            .get_mut(&id)
            .filter(|o| o.deleted_at.is_none())
            .ok_or(RepositoryError::NotFound)?;
        order.deleted_at = Some(deleted_at);
        Ok(order.clone())
    }

    async fn restore_order(&self, id: i32) -> Result<Order, RepositoryError> {
        let mut db = self.db();
        let order = db
            .orders
            .get_mut(&id)
            .filter(|o| o.deleted_at.is_some())
            .ok_or(RepositoryError::NotFound)?;
        order.deleted_at = None;
        Ok(order.clone())
    }

    async fn delete_order(&self, id: i32) -> Result<(), RepositoryError> {
        let mut db = self.db();
        if !db.orders.get(&id).is_some_and(|o| o.deleted_at.is_some()) {
            return Err(RepositoryError::NotFound);
        }
        db.purge(id);
        Ok(())
    }

    async fn restore_all_orders(&self) -> Result<u64, RepositoryError> {
        let mut db = self.db();
        let mut restored = 0;
        for order in db.orders.values_mut().filter(|o| o.deleted_at.is_some()) {
            order.deleted_at = None;
            restored += 1;
        }
        Ok(restored)
    }

    async fn delete_all_trashed_orders(&self) -> Result<u64, RepositoryError> {
        let mut db = self.db();
        let ids: Vec<i32> = db
            .orders
            .values()
            .filter(|o| o.deleted_at.is_some())
            .map(|o| o.id)
            .collect();
        for id in &ids {
            db.purge(*id);
        }
        Ok(ids.len() as u64)
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for MemoryStore {
    async fn find_all(&self, req: &FindAllOrder) -> Result<(Vec<Order>, i64), RepositoryError> {
        Ok(self.page(req, |_| true))
    }

    async fn find_active(&self, req: &FindAllOrder) -> Result<(Vec<Order>, i64), RepositoryError> {
        Ok(self.page(req, |o| o.deleted_at.is_none()))
    }

    async fn find_trashed(&self, req: &FindAllOrder) -> Result<(Vec<Order>, i64), RepositoryError> {
        Ok(self.page(req, |o| o.deleted_at.is_some()))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Order>, RepositoryError> {
        Ok(self.order_row(id))
    }

    async fn count_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        Ok(self
            .db()
            .orders
            .values()
            .filter(|o| o.created_at >= start && o.created_at < end)
            .count() as i64)
    }

    async fn summary(&self) -> Result<Vec<OrderStatusCount>, RepositoryError> {
        let db = self.db();
        let statuses = [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ];

        Ok(statuses
            .into_iter()
            .filter_map(|status| {
                let rows: Vec<&Order> = db
                    .orders
                    .values()
                    .filter(|o| o.deleted_at.is_none() && o.status == status)
                    .collect();
                (!rows.is_empty()).then(|| OrderStatusCount {
                    status,
                    total: rows.len() as i64,
                    revenue: rows.iter().map(|o| o.total_amount).sum(),
                })
            })
            .collect())
    }
}

#[async_trait]
impl OrderItemQueryRepositoryTrait for MemoryStore {
    async fn find_by_order(&self, order_id: i32) -> Result<Vec<OrderItem>, RepositoryError> {
        let mut items = self.items_of(order_id);
        items.sort_by_key(|i| (i.position, i.id));
        Ok(items)
    }

    async fn find_by_order_ids(&self, order_ids: &[i32]) -> Result<Vec<OrderItem>, RepositoryError> {
        let mut items: Vec<OrderItem> = self
            .db()
            .items
            .values()
            .filter(|i| order_ids.contains(&i.order_id))
            .cloned()
            .collect();
        items.sort_by_key(|i| (i.order_id, i.position, i.id));
        Ok(items)
    }
}

#[async_trait]
impl OrderTokenCommandRepositoryTrait for MemoryStore {
    async fn replace_active_for_order(
        &self,
        order_id: i32,
        tokens: &[CreateOrderTokenRecordRequest],
        at: DateTime<Utc>,
    ) -> Result<Vec<OrderToken>, RepositoryError> {
        let mut db = self.db();
        db.retire_pending(order_id, at);

        let ids: Vec<i32> = tokens
            .iter()
            .map(|t| {
                db.insert_token(
                    order_id,
                    &t.token_code,
                    t.station_type,
                    t.priority,
                    &t.order_item_ids,
                    t.created_at,
                )
            })
            .collect();

        Ok(ids.iter().map(|id| db.tokens[id].clone()).collect())
    }

    async fn retire_active_for_order(
        &self,
        order_id: i32,
        at: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        Ok(self.db().retire_pending(order_id, at))
    }

    async fn update_status(
        &self,
        token_id: i32,
        status: TokenStatus,
        at: DateTime<Utc>,
    ) -> Result<OrderToken, RepositoryError> {
        if self.fail_token_status.load(Ordering::SeqCst) {
            return Err(RepositoryError::Custom("token store unavailable".into()));
        }

        let mut db = self.db();
        let token = db.tokens.get_mut(&token_id).ok_or(RepositoryError::NotFound)?;
        token.status = status;
        token.updated_at = at;
        Ok(token.clone())
    }
}

#[async_trait]
impl OrderTokenQueryRepositoryTrait for MemoryStore {
    async fn code_exists(&self, token_code: &str) -> Result<bool, RepositoryError> {
        Ok(self.db().tokens.values().any(|t| t.token_code == token_code))
    }

    async fn find_by_order_ids(&self, order_ids: &[i32]) -> Result<Vec<OrderToken>, RepositoryError> {
        let mut tokens: Vec<OrderToken> = self
            .db()
            .tokens
            .values()
            .filter(|t| order_ids.contains(&t.order_id))
            .cloned()
            .collect();
        tokens.sort_by_key(|t| (t.order_id, t.id));
        Ok(tokens)
    }

    async fn find_items_by_token_ids(
        &self,
        token_ids: &[i32],
    ) -> Result<Vec<OrderTokenItem>, RepositoryError> {
        let mut links: Vec<OrderTokenItem> = self
            .db()
            .token_items
            .iter()
            .filter(|ti| token_ids.contains(&ti.token_id))
            .cloned()
            .collect();
        links.sort_by_key(|ti| (ti.token_id, ti.position));
        Ok(links)
    }
}

#[async_trait]
impl TableCommandRepositoryTrait for MemoryStore {
    async fn update_status(&self, id: i32, status: TableStatus) -> Result<Table, RepositoryError> {
        if self.fail_table_status.load(Ordering::SeqCst) {
            return Err(RepositoryError::Custom("table store unavailable".into()));
        }

        let mut db = self.db();
        let table = db.tables.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        table.status = status;
        Ok(table.clone())
    }
}

#[async_trait]
impl TableQueryRepositoryTrait for MemoryStore {
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Table>, RepositoryError> {
        let db = self.db();
        Ok(ids.iter().filter_map(|id| db.tables.get(id).cloned()).collect())
    }

    async fn find_by_order(&self, order_id: i32) -> Result<Vec<Table>, RepositoryError> {
        let db = self.db();
        Ok(db
            .order_tables
            .iter()
            .filter(|(o, _)| *o == order_id)
            .filter_map(|(_, t)| db.tables.get(t).cloned())
            .collect())
    }

    async fn find_by_order_ids(&self, order_ids: &[i32]) -> Result<Vec<OrderTable>, RepositoryError> {
        let db = self.db();
        Ok(db
            .order_tables
            .iter()
            .filter(|(o, _)| order_ids.contains(o))
            .filter_map(|(o, t)| {
                db.tables.get(t).map(|table| OrderTable {
                    order_id: *o,
                    table: table.clone(),
                })
            })
            .collect())
    }
}

#[async_trait]
impl ItemQueryRepositoryTrait for MemoryStore {
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<MenuItem>, RepositoryError> {
        let db = self.db();
        Ok(ids.iter().filter_map(|id| db.menu.get(id).cloned()).collect())
    }

    async fn find_variations_by_ids(&self, ids: &[i32]) -> Result<Vec<ItemVariation>, RepositoryError> {
        let db = self.db();
        Ok(ids
            .iter()
            .filter_map(|id| db.variations.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl CustomerCommandRepositoryTrait for MemoryStore {
    async fn redeem_points(&self, id: i32, points: i64) -> Result<Customer, RepositoryError> {
        if self.fail_loyalty.load(Ordering::SeqCst) {
            return Err(RepositoryError::Custom("loyalty ledger unavailable".into()));
        }

        let mut db = self.db();
        let customer = db.customers.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        if customer.loyalty_points < points {
            return Err(RepositoryError::Conflict(format!(
                "customer {id} has {} points, needs {points}",
                customer.loyalty_points
            )));
        }
        customer.loyalty_points -= points;
        Ok(customer.clone())
    }

    async fn award_points(&self, id: i32, points: i64) -> Result<Customer, RepositoryError> {
        if self.fail_loyalty.load(Ordering::SeqCst) {
            return Err(RepositoryError::Custom("loyalty ledger unavailable".into()));
        }

        let mut db = self.db();
        let customer = db.customers.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        customer.loyalty_points += points;
        Ok(customer.clone())
    }
}

#[async_trait]
impl CustomerQueryRepositoryTrait for MemoryStore {
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Customer>, RepositoryError> {
        let db = self.db();
        Ok(ids
            .iter()
            .filter_map(|id| db.customers.get(id).filter(|c| c.deleted_at.is_none()).cloned())
            .collect())
    }
}

#[async_trait]
impl DiscountQueryRepositoryTrait for MemoryStore {
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Discount>, RepositoryError> {
        let db = self.db();
        Ok(ids
            .iter()
            .filter_map(|id| db.discounts.get(id).filter(|d| d.deleted_at.is_none()).cloned())
            .collect())
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub cache: Arc<MemoryCacheBackend>,
    pub clock: Arc<FixedClock>,
    pub counters: OrderCounters,
    pub command: OrderCommandService,
    pub query: OrderQueryService,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let cache = Arc::new(MemoryCacheBackend::new());
        let clock = Arc::new(FixedClock::new(opening_time()));
        let cache_store = Arc::new(CacheStore::new(cache.clone()));
        let counters = OrderCounters::default();
        let mut registry = Registry::default();

        let assembler = OrderAssembler::new(OrderAssemblerDeps {
            items: store.clone(),
            tokens: store.clone(),
            tables: store.clone(),
            customers: store.clone(),
            discounts: store.clone(),
        });

        let command = OrderCommandService::new(
            OrderCommandServiceDeps {
                command: store.clone(),
                query: store.clone(),
                order_item_query: store.clone(),
                order_token_query: store.clone(),
                item_query: store.clone(),
                customer_query: store.clone(),
                discount_query: store.clone(),
                tables: TableRegistry::new(store.clone(), store.clone(), counters.clone()),
                tokens: TokenDispatcher::new(
                    store.clone(),
                    store.clone(),
                    clock.clone(),
                    counters.clone(),
                ),
                loyalty: LoyaltyLedger::new(
                    store.clone(),
                    Arc::new(RateLoyaltyPolicy::default()),
                    counters.clone(),
                ),
                assembler: assembler.clone(),
                cache_store: cache_store.clone(),
                clock: clock.clone(),
                counters: counters.clone(),
            },
            &mut registry,
        )
        .unwrap();

        let query =
            OrderQueryService::new(store.clone(), assembler, cache_store, &mut registry).unwrap();

        Self {
            store,
            cache,
            clock,
            counters,
            command,
            query,
        }
    }

    /// Moves time forward so token codes issued next get a fresh suffix.
    pub fn tick(&self, by: Duration) {
        self.clock.advance(by);
    }
}

pub fn line(item_id: i32, quantity: i32, unit_price: Decimal) -> OrderItemRequest {
    OrderItemRequest {
        id: None,
        item_id,
        variation_id: None,
        quantity,
        unit_price,
    }
}

pub fn existing_line(id: i32, item_id: i32, quantity: i32, unit_price: Decimal) -> OrderItemRequest {
    OrderItemRequest {
        id: Some(id),
        ..line(item_id, quantity, unit_price)
    }
}

pub fn dine_in(tables: &[i32], items: Vec<OrderItemRequest>) -> CreateOrderRequest {
    CreateOrderRequest {
        order_type: OrderType::DineIn,
        tables: tables.iter().copied().map(EntityRef::from).collect(),
        customer: None,
        user_id: Some(7),
        discount: None,
        payment_method: None,
        items,
    }
}

pub fn takeaway(items: Vec<OrderItemRequest>) -> CreateOrderRequest {
    CreateOrderRequest {
        order_type: OrderType::Takeaway,
        ..dine_in(&[], items)
    }
}

/// A small bar + kitchen menu with one free table.
pub struct Menu {
    pub lemonade: i32,
    pub burger: i32,
    pub napkins: i32,
    pub t1: i32,
}

pub fn seed_menu(store: &MemoryStore) -> Menu {
    Menu {
        lemonade: store.seed_item("Lemonade", Decimal::new(450, 2), CategoryType::Bar),
        burger: store.seed_item("Burger", Decimal::new(900, 2), CategoryType::Kitchen),
        napkins: store.seed_item("Napkins", Decimal::new(50, 2), CategoryType::Other),
        t1: store.seed_table("T1", TableStatus::Available),
    }
}
