//! Shop metrics returned by the admin shop endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};
use crate::record::{lenient, promote_alias, record_id};

/// Platform-wide shop metrics.
///
/// Only the headline numbers are typed; everything else (top products,
/// monthly series) is kept as raw JSON for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopAnalytics {
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_revenue: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_orders: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_products: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_stores: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub pending_orders: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_commission: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ShopAnalytics {
    pub fn from_value(value: Value) -> DomainResult<Self> {
        let mut map = into_object(value, "shop analytics")?;
        promote_alias(&mut map, "totalRevenue", &["totalSales"]);
        promote_alias(&mut map, "totalCommission", &["commission"]);
        serde_json::from_value(Value::Object(map)).map_err(|e| DomainError::malformed(e.to_string()))
    }

    /// Headline metrics that are present, as label/value pairs.
    pub fn headline(&self) -> Vec<(&'static str, f64)> {
        [
            ("Revenue", self.total_revenue),
            ("Orders", self.total_orders),
            ("Pending orders", self.pending_orders),
            ("Products", self.total_products),
            ("Stores", self.total_stores),
            ("Commission", self.total_commission),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| (label, v)))
        .collect()
    }
}

/// A single store's shop summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub store_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub owner_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_products: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_orders: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_revenue: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StoreSummary {
    pub fn from_value(value: Value) -> DomainResult<Self> {
        let mut map = into_object(value, "store summary")?;
        let id = record_id(&map);
        map.remove("_id");
        map.insert("id".to_string(), id.map(Value::String).unwrap_or(Value::Null));
        promote_alias(&mut map, "storeName", &["name"]);
        promote_alias(&mut map, "totalRevenue", &["totalSales"]);
        serde_json::from_value(Value::Object(map)).map_err(|e| DomainError::malformed(e.to_string()))
    }
}

fn into_object(value: Value, what: &str) -> DomainResult<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(DomainError::malformed(format!("{} is not an object", what))),
    }
}

/// Outcome of looking up a store's shop record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StoreLookup {
    Found(StoreSummary),
    /// The backend has no shop for this store yet.
    NeedsRegistration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_analytics_accepts_strings_and_aliases() {
        let analytics = ShopAnalytics::from_value(json!({
            "totalSales": "1520.5",
            "totalOrders": 42,
            "topProducts": [{"name": "Bat"}]
        }))
        .unwrap();

        assert_eq!(analytics.total_revenue, Some(1520.5));
        assert_eq!(analytics.total_orders, Some(42.0));
        assert!(analytics.extra.contains_key("topProducts"));
        assert_eq!(analytics.headline().len(), 2);
    }

    #[test]
    fn test_both_spellings_do_not_conflict() {
        let analytics =
            ShopAnalytics::from_value(json!({"totalRevenue": 10, "totalSales": 7})).unwrap();

        assert_eq!(analytics.total_revenue, Some(10.0));
        assert_eq!(analytics.extra["totalSales"], 7);
    }

    #[test]
    fn test_store_summary() {
        let store =
            StoreSummary::from_value(json!({"_id": "s1", "name": "Acme", "totalProducts": 3}))
                .unwrap();

        assert_eq!(store.id.as_deref(), Some("s1"));
        assert_eq!(store.store_name.as_deref(), Some("Acme"));
        assert_eq!(store.total_products, Some(3.0));
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(StoreSummary::from_value(json!([1, 2])).is_err());
    }
}
