use crate::{
    abstract_trait::{
        customer::repository::{DynCustomerCommandRepository, DynCustomerQueryRepository},
        discount::repository::DynDiscountQueryRepository,
        item::repository::DynItemQueryRepository,
        order::repository::{DynOrderCommandRepository, DynOrderQueryRepository},
        order_item::repository::DynOrderItemQueryRepository,
        order_token::repository::{DynOrderTokenCommandRepository, DynOrderTokenQueryRepository},
        table::repository::{DynTableCommandRepository, DynTableQueryRepository},
    },
    config::myconfig::LoyaltySettings,
    repository::{
        customer::{CustomerCommandRepository, CustomerQueryRepository},
        discount::DiscountQueryRepository,
        item::ItemQueryRepository,
        order::{OrderCommandRepository, OrderQueryRepository},
        order_item::OrderItemQueryRepository,
        order_token::{OrderTokenCommandRepository, OrderTokenQueryRepository},
        table::{TableCommandRepository, TableQueryRepository},
    },
    service::{
        counters::OrderCounters,
        loyalty::{DynLoyaltyPolicy, LoyaltyLedger, RateLoyaltyPolicy},
        order::{
            OrderAssembler, OrderAssemblerDeps, OrderCommandService, OrderCommandServiceDeps,
            OrderQueryService,
        },
        table::TableRegistry,
        token::TokenDispatcher,
    },
};
use anyhow::{Context, Result};
use prometheus_client::registry::Registry;
use shared::{
    cache::{CacheStore, RedisCacheBackend},
    config::{ConnectionPool, RedisClient},
    utils::{DynClock, SystemClock},
};
use std::{fmt, sync::Arc};

#[derive(Clone)]
pub struct DependenciesInject {
    pub order_query: OrderQueryService,
    pub order_command: OrderCommandService,
}

impl fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("order_query", &"OrderQueryService")
            .field("order_command", &"OrderCommandService")
            .finish()
    }
}

#[derive(Clone)]
pub struct DependenciesInjectDeps {
    pub pool: ConnectionPool,
    pub redis: RedisClient,
    pub loyalty: LoyaltySettings,
}

impl DependenciesInject {
    pub fn new(deps: DependenciesInjectDeps, registry: &mut Registry) -> Result<Self> {
        let DependenciesInjectDeps {
            pool,
            redis,
            loyalty,
        } = deps;

        let order_query_repo: DynOrderQueryRepository =
            Arc::new(OrderQueryRepository::new(pool.clone()));
        let order_command_repo: DynOrderCommandRepository =
            Arc::new(OrderCommandRepository::new(pool.clone()));
        let order_item_query_repo: DynOrderItemQueryRepository =
            Arc::new(OrderItemQueryRepository::new(pool.clone()));
        let order_token_query_repo: DynOrderTokenQueryRepository =
            Arc::new(OrderTokenQueryRepository::new(pool.clone()));
        let order_token_command_repo: DynOrderTokenCommandRepository =
            Arc::new(OrderTokenCommandRepository::new(pool.clone()));
        let table_query_repo: DynTableQueryRepository =
            Arc::new(TableQueryRepository::new(pool.clone()));
        let table_command_repo: DynTableCommandRepository =
            Arc::new(TableCommandRepository::new(pool.clone()));
        let item_query_repo: DynItemQueryRepository =
            Arc::new(ItemQueryRepository::new(pool.clone()));
        let customer_query_repo: DynCustomerQueryRepository =
            Arc::new(CustomerQueryRepository::new(pool.clone()));
        let customer_command_repo: DynCustomerCommandRepository =
            Arc::new(CustomerCommandRepository::new(pool.clone()));
        let discount_query_repo: DynDiscountQueryRepository =
            Arc::new(DiscountQueryRepository::new(pool));

        let cache = Arc::new(CacheStore::new(Arc::new(RedisCacheBackend::new(
            redis.pool.clone(),
        ))));
        let clock: DynClock = Arc::new(SystemClock);
        let counters = OrderCounters::default();

        let policy: DynLoyaltyPolicy = Arc::new(RateLoyaltyPolicy::new(
            loyalty.points_per_unit,
            loyalty.units_per_point,
        ));

        let assembler = OrderAssembler::new(OrderAssemblerDeps {
            items: order_item_query_repo.clone(),
            tokens: order_token_query_repo.clone(),
            tables: table_query_repo.clone(),
            customers: customer_query_repo.clone(),
            discounts: discount_query_repo.clone(),
        });

        let order_query = OrderQueryService::new(
            order_query_repo.clone(),
            assembler.clone(),
            cache.clone(),
            registry,
        )
        .context("failed initialize order query")?;

        let order_command_deps = OrderCommandServiceDeps {
            command: order_command_repo,
            query: order_query_repo,
            order_item_query: order_item_query_repo,
            order_token_query: order_token_query_repo.clone(),
            item_query: item_query_repo,
            customer_query: customer_query_repo,
            discount_query: discount_query_repo,
            tables: TableRegistry::new(table_query_repo, table_command_repo, counters.clone()),
            tokens: TokenDispatcher::new(
                order_token_query_repo,
                order_token_command_repo,
                clock.clone(),
                counters.clone(),
            ),
            loyalty: LoyaltyLedger::new(customer_command_repo, policy, counters.clone()),
            assembler,
            cache_store: cache,
            clock,
            counters,
        };

        let order_command = OrderCommandService::new(order_command_deps, registry)
            .context("failed initialize order command")?;

        Ok(Self {
            order_query,
            order_command,
        })
    }
}
