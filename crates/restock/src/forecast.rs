use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use novastock_core::{BranchId, DomainError, ForecastId, MAX_PREDICTED_DEMAND, ProductId};

/// A forecast ledger row waiting to be appended (not yet assigned an id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewForecast {
    pub product_id: ProductId,
    pub branch_id: BranchId,
    pub forecast_date: NaiveDate,
    pub predicted_demand: u32,
    pub model_version: String,
}

impl NewForecast {
    pub fn new(
        product_id: ProductId,
        branch_id: BranchId,
        forecast_date: NaiveDate,
        predicted_demand: u32,
        model_version: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if predicted_demand > MAX_PREDICTED_DEMAND {
            return Err(DomainError::validation(format!(
                "predicted_demand {predicted_demand} exceeds {MAX_PREDICTED_DEMAND}"
            )));
        }
        let model_version = model_version.into();
        if model_version.trim().is_empty() {
            return Err(DomainError::validation("model_version cannot be empty"));
        }
        Ok(Self {
            product_id,
            branch_id,
            forecast_date,
            predicted_demand,
            model_version,
        })
    }

    /// Attach the ledger-assigned sequence number.
    pub fn into_stored(self, forecast_id: ForecastId) -> Forecast {
        Forecast {
            forecast_id,
            product_id: self.product_id,
            branch_id: self.branch_id,
            forecast_date: self.forecast_date,
            predicted_demand: self.predicted_demand,
            model_version: self.model_version,
        }
    }
}

/// A persisted forecast ledger row (append-only, never updated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    pub forecast_id: ForecastId,
    pub product_id: ProductId,
    pub branch_id: BranchId,
    pub forecast_date: NaiveDate,
    pub predicted_demand: u32,
    pub model_version: String,
}

impl Forecast {
    /// Ordering key for "current forecast" selection: latest date, then
    /// highest sequence number.
    pub fn recency_key(&self) -> (NaiveDate, ForecastId) {
        (self.forecast_date, self.forecast_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn rejects_demand_above_cap() {
        let err = NewForecast::new(
            ProductId::new(1),
            BranchId::new(1),
            date(1),
            MAX_PREDICTED_DEMAND + 1,
            "v1.0",
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn recency_prefers_date_then_sequence() {
        let a = NewForecast::new(ProductId::new(1), BranchId::new(1), date(2), 10, "v1.0")
            .unwrap()
            .into_stored(ForecastId::new(1));
        let b = NewForecast::new(ProductId::new(1), BranchId::new(1), date(1), 10, "v1.0")
            .unwrap()
            .into_stored(ForecastId::new(2));
        let c = NewForecast::new(ProductId::new(1), BranchId::new(1), date(2), 10, "v1.0")
            .unwrap()
            .into_stored(ForecastId::new(3));
        let latest = [a, b, c.clone()]
            .into_iter()
            .max_by_key(|f| f.recency_key())
            .unwrap();
        assert_eq!(latest, c);
    }
}
