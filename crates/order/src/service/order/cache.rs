use crate::domain::requests::order::FindAllOrder;
use chrono::Duration;

pub const ORDER_PATTERN: &str = "orders:*";
pub const SUMMARY_KEY: &str = "orders:summary";

pub fn read_ttl() -> Duration {
    Duration::hours(1)
}

pub fn summary_ttl() -> Duration {
    Duration::minutes(30)
}

/// Key covering every field that shapes a listing.
pub fn list_key(scope: &str, req: &FindAllOrder) -> String {
    fn opt<T: std::fmt::Debug>(value: &Option<T>) -> String {
        value
            .as_ref()
            .map(|v| format!("{v:?}"))
            .unwrap_or_else(|| "-".to_string())
    }

    format!(
        "orders:{scope}:page:{}:size:{}:search:{}:status:{}:type:{}:customer:{}:table:{}:sort:{:?}:{:?}",
        req.page,
        req.page_size,
        req.search.trim(),
        opt(&req.status),
        opt(&req.order_type),
        opt(&req.customer_id),
        opt(&req.table_id),
        req.sort_by,
        req.sort_order,
    )
}

pub fn detail_key(id: i32) -> String {
    format!("orders:find_by_id:{id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::order::OrderStatus;
    use shared::cache::glob_match;

    #[test]
    fn list_keys_differ_per_filter() {
        let base = FindAllOrder::default();
        let completed = FindAllOrder {
            status: Some(OrderStatus::Completed),
            ..FindAllOrder::default()
        };
        let page_two = FindAllOrder {
            page: 2,
            ..FindAllOrder::default()
        };

        let a = list_key("find_all", &base);
        let b = list_key("find_all", &completed);
        let c = list_key("find_all", &page_two);

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, list_key("find_active", &base));
    }

    #[test]
    fn every_key_falls_under_the_namespace() {
        for key in [
            list_key("find_trashed", &FindAllOrder::default()),
            detail_key(9),
            SUMMARY_KEY.to_string(),
        ] {
            assert!(glob_match(ORDER_PATTERN, &key), "{key}");
        }
    }
}
