use serde::{Deserialize, Serialize};

use crate::result::PredictError;

/// Number of model inputs: `[price, promotion, branch, product, seasonality]`.
pub const FEATURE_COUNT: usize = 5;

/// A single prediction request, in external (un-encoded) form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandFeatures {
    pub price: f64,
    pub promotion: bool,
    pub branch: String,
    pub product: String,
    pub seasonality: String,
}

impl DemandFeatures {
    /// Build and validate a feature record.
    ///
    /// `promotion` is the raw 0/1 flag as supplied by callers.
    pub fn new(
        price: f64,
        promotion: u8,
        branch: impl Into<String>,
        product: impl Into<String>,
        seasonality: impl Into<String>,
    ) -> Result<Self, PredictError> {
        if !price.is_finite() || price < 0.0 {
            return Err(PredictError::invalid_feature(
                "price",
                "must be a finite, non-negative number",
            ));
        }

        let promotion = match promotion {
            0 => false,
            1 => true,
            other => {
                return Err(PredictError::invalid_feature(
                    "promotion",
                    format!("must be 0 or 1 (got {other})"),
                ));
            }
        };

        let branch = non_empty("branch", branch.into())?;
        let product = non_empty("product", product.into())?;
        let seasonality = non_empty("seasonality", seasonality.into())?;

        Ok(Self {
            price,
            promotion,
            branch,
            product,
            seasonality,
        })
    }
}

fn non_empty(field: &'static str, value: String) -> Result<String, PredictError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PredictError::invalid_feature(field, "cannot be empty"));
    }
    Ok(trimmed.to_string())
}
