use crate::{
    abstract_trait::table::repository::{DynTableCommandRepository, DynTableQueryRepository},
    model::{
        order::OrderStatus,
        table::{Table, TableStatus},
    },
    service::counters::{OrderCounters, SideEffect},
};
use shared::errors::ServiceError;
use tracing::{error, info};

/// Occupancy bookkeeping for physical tables.
///
/// Occupying skips RESERVED tables, and only OCCUPIED tables are released;
/// a table under MAINTENANCE is taken like an AVAILABLE one.
#[derive(Clone)]
pub struct TableRegistry {
    query: DynTableQueryRepository,
    command: DynTableCommandRepository,
    counters: OrderCounters,
}

impl TableRegistry {
    pub fn new(
        query: DynTableQueryRepository,
        command: DynTableCommandRepository,
        counters: OrderCounters,
    ) -> Self {
        Self {
            query,
            command,
            counters,
        }
    }

    /// Loads every table in `ids`, failing on the first one that does not exist.
    pub async fn resolve(&self, ids: &[i32]) -> Result<Vec<Table>, ServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found = self.query.find_by_ids(ids).await?;

        let mut tables = Vec::with_capacity(ids.len());
        for id in ids {
            match found.iter().find(|t| t.id == *id) {
                Some(table) => tables.push(table.clone()),
                None => return Err(ServiceError::NotFound(format!("table {id}"))),
            }
        }

        Ok(tables)
    }

    pub async fn tables_of(&self, order_id: i32) -> Result<Vec<Table>, ServiceError> {
        Ok(self.query.find_by_order(order_id).await?)
    }

    /// Marks `tables` OCCUPIED for an order still in progress.
    pub async fn reserve_for_order(&self, tables: &[Table], status: OrderStatus) -> Vec<Table> {
        if status.is_terminal() {
            return tables.to_vec();
        }

        let mut result = Vec::with_capacity(tables.len());
        for table in tables {
            if matches!(table.status, TableStatus::Reserved | TableStatus::Occupied) {
                result.push(table.clone());
                continue;
            }
            result.push(self.set_status(table, TableStatus::Occupied).await);
        }
        result
    }

    pub async fn release(&self, tables: &[Table]) {
        for table in tables.iter().filter(|t| t.status == TableStatus::Occupied) {
            self.set_status(table, TableStatus::Available).await;
        }
    }

    pub async fn release_from_order(&self, order_id: i32) {
        match self.query.find_by_order(order_id).await {
            Ok(tables) => self.release(&tables).await,
            Err(e) => {
                self.counters.side_effect_failed(SideEffect::TableStatus);
                error!("❌ Could not load tables of order {} for release: {:?}", order_id, e);
            }
        }
    }

    async fn set_status(&self, table: &Table, status: TableStatus) -> Table {
        match self.command.update_status(table.id, status).await {
            Ok(updated) => {
                info!("🪑 Table {} {:?} -> {:?}", table.table_number, table.status, status);
                updated
            }
            Err(e) => {
                self.counters.side_effect_failed(SideEffect::TableStatus);
                error!(
                    "❌ Failed to move table {} to {:?}: {:?}",
                    table.table_number, status, e
                );
                table.clone()
            }
        }
    }
}
