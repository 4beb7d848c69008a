use crate::{
    abstract_trait::{
        customer::repository::DynCustomerQueryRepository,
        discount::repository::DynDiscountQueryRepository,
        order_item::repository::DynOrderItemQueryRepository,
        order_token::repository::DynOrderTokenQueryRepository,
        table::repository::DynTableQueryRepository,
    },
    domain::response::{
        customer::CustomerResponse, discount::DiscountResponse, order::OrderResponse,
        order_item::OrderItemResponse, order_token::OrderTokenResponse, table::TableResponse,
    },
    model::order::Order as OrderModel,
};
use shared::errors::RepositoryError;
use std::collections::HashMap;

pub struct OrderAssemblerDeps {
    pub items: DynOrderItemQueryRepository,
    pub tokens: DynOrderTokenQueryRepository,
    pub tables: DynTableQueryRepository,
    pub customers: DynCustomerQueryRepository,
    pub discounts: DynDiscountQueryRepository,
}

/// Loads the relations of a batch of orders with one query per relation.
#[derive(Clone)]
pub struct OrderAssembler {
    items: DynOrderItemQueryRepository,
    tokens: DynOrderTokenQueryRepository,
    tables: DynTableQueryRepository,
    customers: DynCustomerQueryRepository,
    discounts: DynDiscountQueryRepository,
}

impl OrderAssembler {
    pub fn new(deps: OrderAssemblerDeps) -> Self {
        let OrderAssemblerDeps {
            items,
            tokens,
            tables,
            customers,
            discounts,
        } = deps;

        Self {
            items,
            tokens,
            tables,
            customers,
            discounts,
        }
    }

    pub async fn assemble_one(&self, order: OrderModel) -> Result<OrderResponse, RepositoryError> {
        let mut assembled = self.assemble(vec![order]).await?;
        assembled.pop().ok_or(RepositoryError::NotFound)
    }

    pub async fn assemble(
        &self,
        orders: Vec<OrderModel>,
    ) -> Result<Vec<OrderResponse>, RepositoryError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
        let customer_ids = distinct(orders.iter().filter_map(|o| o.customer_id));
        let discount_ids = distinct(orders.iter().filter_map(|o| o.discount_id));

        let mut items_by_order: HashMap<i32, Vec<OrderItemResponse>> = HashMap::new();
        for item in self.items.find_by_order_ids(&order_ids).await? {
            items_by_order
                .entry(item.order_id)
                .or_default()
                .push(item.into());
        }

        let mut tables_by_order: HashMap<i32, Vec<TableResponse>> = HashMap::new();
        for row in self.tables.find_by_order_ids(&order_ids).await? {
            tables_by_order
                .entry(row.order_id)
                .or_default()
                .push(row.table.into());
        }

        let tokens = self.tokens.find_by_order_ids(&order_ids).await?;
        let token_ids: Vec<i32> = tokens.iter().map(|t| t.id).collect();
        let mut items_by_token: HashMap<i32, Vec<i32>> = HashMap::new();
        for link in self.tokens.find_items_by_token_ids(&token_ids).await? {
            items_by_token
                .entry(link.token_id)
                .or_default()
                .push(link.order_item_id);
        }
        let mut tokens_by_order: HashMap<i32, Vec<OrderTokenResponse>> = HashMap::new();
        for token in tokens {
            let covered = items_by_token.remove(&token.id).unwrap_or_default();
            tokens_by_order
                .entry(token.order_id)
                .or_default()
                .push(OrderTokenResponse::from_model(token, covered));
        }

        let customers: HashMap<i32, CustomerResponse> = self
            .customers
            .find_by_ids(&customer_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c.into()))
            .collect();

        let discounts: HashMap<i32, DiscountResponse> = self
            .discounts
            .find_by_ids(&discount_ids)
            .await?
            .into_iter()
            .map(|d| (d.id, d.into()))
            .collect();

        Ok(orders
            .into_iter()
            .map(|order| {
                let id = order.id;
                let customer = order.customer_id.and_then(|c| customers.get(&c).cloned());
                let discount = order.discount_id.and_then(|d| discounts.get(&d).cloned());

                let mut response = OrderResponse::from(order);
                response.customer = customer;
                response.discount = discount;
                response.items = items_by_order.remove(&id).unwrap_or_default();
                response.tables = tables_by_order.remove(&id).unwrap_or_default();
                response.tokens = tokens_by_order.remove(&id).unwrap_or_default();
                response
            })
            .collect())
    }
}

fn distinct(ids: impl Iterator<Item = i32>) -> Vec<i32> {
    let mut out: Vec<i32> = ids.collect();
    out.sort_unstable();
    out.dedup();
    out
}
