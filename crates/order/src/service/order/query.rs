use crate::{
    abstract_trait::order::{repository::DynOrderQueryRepository, service::OrderQueryServiceTrait},
    domain::{
        requests::order::FindAllOrder,
        response::{
            api::{ApiResponse, ApiResponsePagination},
            order::{OrderResponse, OrderSummaryResponse},
            pagination::Pagination,
        },
    },
    service::order::{OrderAssembler, cache},
};
use anyhow::Result;
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    cache::CacheStore,
    errors::ServiceError,
    utils::{Metrics, ServiceTracing},
};
use std::sync::Arc;
use tracing::{error, info};
use validator::Validate;

#[derive(Clone, Copy)]
enum ListScope {
    All,
    Active,
    Trashed,
}

impl ListScope {
    fn name(self) -> &'static str {
        match self {
            ListScope::All => "find_all",
            ListScope::Active => "find_active",
            ListScope::Trashed => "find_trashed",
        }
    }
}

#[derive(Clone)]
pub struct OrderQueryService {
    query: DynOrderQueryRepository,
    assembler: OrderAssembler,
    cache_store: Arc<CacheStore>,
    tracing: ServiceTracing,
}

impl OrderQueryService {
    pub fn new(
        query: DynOrderQueryRepository,
        assembler: OrderAssembler,
        cache_store: Arc<CacheStore>,
        registry: &mut Registry,
    ) -> Result<Self> {
        let metrics = Metrics::new();
        metrics.register(registry, "order_query_service");

        Ok(Self {
            query,
            assembler,
            cache_store,
            tracing: ServiceTracing::new("order-query-service", metrics),
        })
    }

    async fn find_page(
        &self,
        scope: ListScope,
        req: &FindAllOrder,
    ) -> Result<ApiResponsePagination<Vec<OrderResponse>>, ServiceError> {
        info!(
            "📦 Finding orders ({}) | Page: {}, Size: {}, Search: '{}'",
            scope.name(), req.page, req.page_size, req.search
        );
        let tracing_ctx = self.tracing.start(
            scope.name(),
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("page", req.page as i64),
                KeyValue::new("page_size", req.page_size as i64),
                KeyValue::new("search", req.search.clone()),
            ],
        );

        if let Err(e) = req.validate() {
            let err = ServiceError::from(e);
            self.tracing
                .complete_error(&tracing_ctx, &err.to_string());
            return Err(err);
        }

        let cache_key = cache::list_key(scope.name(), req);

        if let Some(cached) = self
            .cache_store
            .get_from_cache::<ApiResponsePagination<Vec<OrderResponse>>>(&cache_key)
            .await
        {
            let log_message = format!("✅ Found {} cached orders", cached.data.len());
            self.tracing
                .complete_success(&tracing_ctx, &log_message);
            return Ok(cached);
        }

        let fetched = match scope {
            ListScope::All => self.query.find_all(req).await,
            ListScope::Active => self.query.find_active(req).await,
            ListScope::Trashed => self.query.find_trashed(req).await,
        };

        let loaded = match fetched {
            Ok((orders, total)) => self
                .assembler
                .assemble(orders)
                .await
                .map(|data| (data, total)),
            Err(e) => Err(e),
        };

        let (data, total) = match loaded {
            Ok(res) => res,
            Err(e) => {
                let log_message = format!("❌ Failed to find orders: {e:?}");
                error!("{log_message}");
                self.tracing
                    .complete_error(&tracing_ctx, &log_message);
                return Err(ServiceError::Repo(e));
            }
        };

        let response = ApiResponsePagination {
            status: "success".to_string(),
            message: "Orders retrieved successfully".to_string(),
            data,
            pagination: Pagination::new(req.page, req.page_size, total),
        };

        self.cache_store
            .set_to_cache(&cache_key, &response, cache::read_ttl())
            .await;

        let log_message = format!("Found {} orders (total: {total})", response.data.len());
        self.tracing
            .complete_success(&tracing_ctx, &log_message);

        Ok(response)
    }
}

#[async_trait]
impl OrderQueryServiceTrait for OrderQueryService {
    async fn find_all(
        &self,
        req: &FindAllOrder,
    ) -> Result<ApiResponsePagination<Vec<OrderResponse>>, ServiceError> {
        self.find_page(ListScope::All, req).await
    }

    async fn find_active(
        &self,
        req: &FindAllOrder,
    ) -> Result<ApiResponsePagination<Vec<OrderResponse>>, ServiceError> {
        self.find_page(ListScope::Active, req).await
    }

    async fn find_trashed(
        &self,
        req: &FindAllOrder,
    ) -> Result<ApiResponsePagination<Vec<OrderResponse>>, ServiceError> {
        self.find_page(ListScope::Trashed, req).await
    }

    async fn find_by_id(&self, id: i32) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        info!("🔍 Finding order by ID: {}", id);
        let tracing_ctx = self.tracing.start(
            "find_by_id",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("order.id", id as i64),
            ],
        );

        let cache_key = cache::detail_key(id);

        if let Some(cached) = self
            .cache_store
            .get_from_cache::<ApiResponse<OrderResponse>>(&cache_key)
            .await
        {
            let log_message = format!("✅ Found order {} in cache", cached.data.order_id);
            self.tracing
                .complete_success(&tracing_ctx, &log_message);
            return Ok(cached);
        }

        let order = match self.query.find_by_id(id).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                let log_message = format!("Order {id} not found");
                self.tracing
                    .complete_error(&tracing_ctx, &log_message);
                return Err(ServiceError::NotFound(format!("order {id}")));
            }
            Err(e) => {
                let log_message = format!("❌ Failed to fetch order {id}: {e:?}");
                error!("{log_message}");
                self.tracing
                    .complete_error(&tracing_ctx, &log_message);
                return Err(ServiceError::Repo(e));
            }
        };

        let data = match self.assembler.assemble_one(order).await {
            Ok(data) => data,
            Err(e) => {
                let log_message = format!("❌ Failed to load relations of order {id}: {e:?}");
                error!("{log_message}");
                self.tracing
                    .complete_error(&tracing_ctx, &log_message);
                return Err(ServiceError::Repo(e));
            }
        };

        let response = ApiResponse::success("Order retrieved successfully", data);

        self.cache_store
            .set_to_cache(&cache_key, &response, cache::read_ttl())
            .await;

        self.tracing
            .complete_success(&tracing_ctx, "Order retrieved");

        Ok(response)
    }

    async fn summary(&self) -> Result<ApiResponse<OrderSummaryResponse>, ServiceError> {
        let tracing_ctx = self
            .tracing
            .start("summary", vec![KeyValue::new("component", "order")]);

        if let Some(cached) = self
            .cache_store
            .get_from_cache::<ApiResponse<OrderSummaryResponse>>(cache::SUMMARY_KEY)
            .await
        {
            self.tracing
                .complete_success(&tracing_ctx, "✅ Order summary served from cache");
            return Ok(cached);
        }

        let rows = match self.query.summary().await {
            Ok(rows) => rows,
            Err(e) => {
                let log_message = format!("❌ Failed to summarize orders: {e:?}");
                error!("{log_message}");
                self.tracing
                    .complete_error(&tracing_ctx, &log_message);
                return Err(ServiceError::Repo(e));
            }
        };

        let response =
            ApiResponse::success("Order summary retrieved successfully", OrderSummaryResponse::from(rows));

        self.cache_store
            .set_to_cache(cache::SUMMARY_KEY, &response, cache::summary_ttl())
            .await;

        self.tracing
            .complete_success(&tracing_ctx, "Order summary computed");

        Ok(response)
    }
}
