use super::util::with_retry;
use crate::core::cache::Cache;
use crate::core::valuation::ValuationProvider;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error};

pub const DEFAULT_WAREHOUSE_URL: &str = "https://warehouse.stakehouse.dev";

/// Valuation record served by the national sold-homes warehouse gateway.
/// `estimated_value` is null for records the pricing model has not covered
/// yet; those are treated the same as a missing property.
#[derive(Debug, Deserialize)]
struct ValuationRecord {
    #[serde(rename = "property_id")]
    _property_id: String,
    estimated_value: Option<f64>,
}

/// REST adapter over the warehouse gateway's single-property valuation
/// endpoint (`GET /v1/properties/{id}/valuation`).
pub struct WarehouseProvider {
    base_url: String,
    cache: Arc<Cache<String, f64>>,
}

impl WarehouseProvider {
    pub fn new(base_url: &str, cache: Arc<Cache<String, f64>>) -> Self {
        Self {
            base_url: base_url.to_string(),
            cache,
        }
    }
}

#[async_trait]
impl ValuationProvider for WarehouseProvider {
    async fn current_value(&self, property_id: &str) -> anyhow::Result<Option<f64>> {
        if let Some(cached) = self.cache.get(&property_id.to_string()).await {
            return Ok(Some(cached));
        }

        let url = format!("{}/v1/properties/{}/valuation", self.base_url, property_id);
        let response = with_retry(|| async { reqwest::get(&url).await }, 3, 500)
            .await
            .context("Valuation request failed")?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!(property_id, "Warehouse has no record for property");
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .context("Valuation request returned an error status")?;

        let response_text = response
            .text()
            .await
            .context("Failed to get response text")?;

        let record: ValuationRecord = match serde_json::from_str(&response_text) {
            Ok(data) => data,
            Err(e) => {
                error!(
                    error = ?e,
                    response = %response_text,
                    "Failed to parse valuation response"
                );
                return Err(e).context("Failed to parse valuation response");
            }
        };

        match record.estimated_value {
            Some(value) => {
                self.cache.put(property_id.to_string(), value).await;
                Ok(Some(value))
            }
            None => {
                debug!(property_id, "Warehouse record has no estimated value");
                Ok(None)
            }
        }
    }
}
