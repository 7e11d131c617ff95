use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The grouping key used by a review-score aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingDimension {
    Product,
    Category,
    PaymentType,
}

impl RatingDimension {
    /// Human-readable axis label for the grouping key.
    pub fn label(&self) -> &'static str {
        match self {
            RatingDimension::Product => "Product ID",
            RatingDimension::Category => "Category Name",
            RatingDimension::PaymentType => "Payment Method",
        }
    }
}

/// One of the three RFM columns a customer table can be ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RfmMetric {
    Recency,
    Frequency,
    Monetary,
}

impl FromStr for RfmMetric {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recency" => Ok(RfmMetric::Recency),
            "frequency" => Ok(RfmMetric::Frequency),
            "monetary" => Ok(RfmMetric::Monetary),
            other => Err(CoreError::UnknownVariant {
                kind: "RFM metric",
                value: other.to_string(),
            }),
        }
    }
}

/// The dashboard sections, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Overview,
    Regions,
    ProductRatings,
    Rfm,
    PaymentMethods,
}

impl Panel {
    pub const ALL: [Panel; 5] = [
        Panel::Overview,
        Panel::Regions,
        Panel::ProductRatings,
        Panel::Rfm,
        Panel::PaymentMethods,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Panel::Overview => "Overview",
            Panel::Regions => "Top 10 Regions",
            Panel::ProductRatings => "Product Ratings",
            Panel::Rfm => "RFM Analysis",
            Panel::PaymentMethods => "Payment Method Ratings",
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Panel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "overview" => Ok(Panel::Overview),
            "regions" => Ok(Panel::Regions),
            "product_ratings" | "products" => Ok(Panel::ProductRatings),
            "rfm" => Ok(Panel::Rfm),
            "payment_methods" | "payments" => Ok(Panel::PaymentMethods),
            other => Err(CoreError::UnknownVariant {
                kind: "panel",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_parsing_accepts_aliases() {
        assert_eq!("payment-methods".parse::<Panel>().unwrap(), Panel::PaymentMethods);
        assert_eq!("Products".parse::<Panel>().unwrap(), Panel::ProductRatings);
        assert!("charts".parse::<Panel>().is_err());
    }

    #[test]
    fn test_rfm_metric_parsing() {
        assert_eq!("MONETARY".parse::<RfmMetric>().unwrap(), RfmMetric::Monetary);
        let err = "loyalty".parse::<RfmMetric>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown RFM metric 'loyalty'");
    }
}
