use std::fmt;

use serde::Serialize;

pub const REFERENCE_YEAR: i32 = 2025;
pub const MIN_MODEL_YEAR: i32 = 2000;
pub const DEFAULT_BASE_PRICE: i64 = 3_000_000;
pub const DEPRECIATION_PER_YEAR: i64 = 200_000;
pub const HIGH_MILEAGE_KM: u32 = 100_000;
pub const MEDIUM_MILEAGE_KM: u32 = 50_000;
pub const HIGH_MILEAGE_PENALTY: i64 = 500_000;
pub const MEDIUM_MILEAGE_PENALTY: i64 = 250_000;
pub const PRICE_FLOOR: u64 = 500_000;
pub const CURRENCY: &str = "Rs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Brand {
    Toyota,
    Honda,
    Suzuki,
    Bmw,
    Mercedes,
    /// Listed on the site but without a dedicated base price.
    Other(String),
}

impl Brand {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "toyota" => Brand::Toyota,
            "honda" => Brand::Honda,
            "suzuki" => Brand::Suzuki,
            "bmw" => Brand::Bmw,
            "mercedes" => Brand::Mercedes,
            _ => Brand::Other(raw.trim().to_string()),
        }
    }

    pub fn base_price(&self) -> i64 {
        match self {
            Brand::Toyota => 3_500_000,
            Brand::Honda => 4_000_000,
            Brand::Suzuki => 2_500_000,
            Brand::Bmw => 8_000_000,
            Brand::Mercedes => 9_000_000,
            Brand::Other(_) => DEFAULT_BASE_PRICE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Condition {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "excellent" => Some(Condition::Excellent),
            "good" => Some(Condition::Good),
            "fair" => Some(Condition::Fair),
            "poor" => Some(Condition::Poor),
            _ => None,
        }
    }

    pub fn coefficient(self) -> f64 {
        match self {
            Condition::Excellent => 1.10,
            Condition::Good => 1.00,
            Condition::Fair => 0.85,
            Condition::Poor => 0.70,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValuationInput {
    pub brand: Brand,
    pub model_year: i32,
    pub mileage_km: u32,
    pub condition: Condition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValuationResult {
    pub estimated_price: u64,
    pub currency: &'static str,
}

impl ValuationResult {
    /// `Rs 2,500,000`
    pub fn display(&self) -> String {
        format!("{} {}", self.currency, group_thousands(self.estimated_price))
    }
}

impl fmt::Display for ValuationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

fn mileage_penalty(mileage_km: u32) -> i64 {
    if mileage_km > HIGH_MILEAGE_KM {
        HIGH_MILEAGE_PENALTY
    } else if mileage_km > MEDIUM_MILEAGE_KM {
        MEDIUM_MILEAGE_PENALTY
    } else {
        0
    }
}

/// Market estimate for a car. Deterministic, and never below [`PRICE_FLOOR`].
///
/// Depreciation and the mileage penalty may drive the running price negative;
/// only the final figure is clamped.
pub fn estimate(input: &ValuationInput) -> ValuationResult {
    let age = i64::from(REFERENCE_YEAR - input.model_year);
    let adjusted = input.brand.base_price()
        - age * DEPRECIATION_PER_YEAR
        - mileage_penalty(input.mileage_km);
    let price = (adjusted as f64 * input.condition.coefficient()).max(PRICE_FLOOR as f64);

    ValuationResult {
        estimated_price: price.round() as u64,
        currency: CURRENCY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(brand: &str, model_year: i32, mileage_km: u32, condition: Condition) -> ValuationInput {
        ValuationInput {
            brand: Brand::parse(brand),
            model_year,
            mileage_km,
            condition,
        }
    }

    #[test]
    fn recent_toyota_in_good_condition() {
        let result = estimate(&input("toyota", 2020, 40_000, Condition::Good));
        assert_eq!(result.estimated_price, 2_500_000);
        assert_eq!(result.display(), "Rs 2,500,000");
    }

    #[test]
    fn old_high_mileage_car_hits_the_floor() {
        let result = estimate(&input("suzuki", 2000, 200_000, Condition::Poor));
        assert_eq!(result.estimated_price, PRICE_FLOOR);
        assert_eq!(result.display(), "Rs 500,000");
    }

    #[test]
    fn mileage_bands_are_exclusive_at_their_bounds() {
        let at_medium = estimate(&input("honda", 2025, 50_000, Condition::Good));
        let over_medium = estimate(&input("honda", 2025, 50_001, Condition::Good));
        let at_high = estimate(&input("honda", 2025, 100_000, Condition::Good));
        let over_high = estimate(&input("honda", 2025, 100_001, Condition::Good));
        assert_eq!(at_medium.estimated_price, 4_000_000);
        assert_eq!(over_medium.estimated_price, 3_750_000);
        assert_eq!(at_high.estimated_price, 3_750_000);
        assert_eq!(over_high.estimated_price, 3_500_000);
    }

    #[test]
    fn condition_coefficients_apply_after_adjustments() {
        let excellent = estimate(&input("honda", 2018, 60_000, Condition::Excellent));
        assert_eq!(excellent.estimated_price, 2_585_000);
        let fair = estimate(&input("mercedes", 2024, 120_000, Condition::Fair));
        assert_eq!(fair.estimated_price, 7_055_000);
    }

    #[test]
    fn unknown_brands_use_default_base_price() {
        let result = estimate(&input("Kia", 2025, 0, Condition::Good));
        assert_eq!(result.estimated_price, 3_000_000);
        assert_eq!(Brand::parse(" BMW "), Brand::Bmw);
        assert_eq!(Brand::parse("Kia"), Brand::Other("Kia".to_string()));
    }

    #[test]
    fn grouping_handles_short_numbers() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(12_345_678), "12,345,678");
    }
}
