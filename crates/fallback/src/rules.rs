//! Heuristic Pricing Rules

use dataset::CarFeatures;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Brand tier used for the brand premium
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrandTier {
    Luxury,
    MidTier,
    Standard,
}

impl BrandTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrandTier::Luxury => "luxury",
            BrandTier::MidTier => "mid_tier",
            BrandTier::Standard => "standard",
        }
    }
}

/// Coefficients of the heuristic price formula
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackRules {
    pub base: f64,
    /// Per model year after `reference_year`
    pub per_year: f64,
    pub reference_year: i32,
    /// Per kilometre below `mileage_ceiling`
    pub per_km_below_ceiling: f64,
    pub mileage_ceiling: u32,
    /// Per litre of displacement
    pub per_litre: f64,
    pub per_horsepower: f64,
    pub luxury_brands: Vec<String>,
    pub luxury_premium: f64,
    pub mid_tier_brands: Vec<String>,
    pub mid_tier_premium: f64,
    pub automatic_premium: f64,
    pub fuel_premium_types: Vec<String>,
    pub fuel_premium: f64,
    /// Jitter factor range `[low, high)`
    pub jitter: (f64, f64),
    /// No estimate goes below this
    pub floor: f64,
}

impl Default for FallbackRules {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            base: 300_000.0,
            per_year: 50_000.0,
            reference_year: 2010,
            per_km_below_ceiling: 2.0,
            mileage_ceiling: 100_000,
            per_litre: 100_000.0,
            per_horsepower: 1_000.0,
            luxury_brands: strings(&["BMW", "Mercedes", "Audi", "Mercedes-Benz"]),
            luxury_premium: 1_000_000.0,
            mid_tier_brands: strings(&["Toyota", "Honda", "Hyundai", "Ford"]),
            mid_tier_premium: 200_000.0,
            automatic_premium: 50_000.0,
            fuel_premium_types: strings(&["Diesel", "Electric"]),
            fuel_premium: 30_000.0,
            jitter: (0.8, 1.2),
            floor: 300_000.0,
        }
    }
}

/// Rule-based price estimator used when no trained model is available
#[derive(Debug, Clone, Default)]
pub struct FallbackEstimator {
    rules: FallbackRules,
}

impl FallbackEstimator {
    pub fn new(rules: FallbackRules) -> Self {
        Self { rules }
    }

    /// Tier of a brand. Exact, case-sensitive match.
    pub fn brand_tier(&self, brand: &str) -> BrandTier {
        if self.rules.luxury_brands.iter().any(|b| b == brand) {
            BrandTier::Luxury
        } else if self.rules.mid_tier_brands.iter().any(|b| b == brand) {
            BrandTier::MidTier
        } else {
            BrandTier::Standard
        }
    }

    /// Deterministic part of the estimate
    pub fn base_price(&self, features: &CarFeatures) -> f64 {
        let r = &self.rules;

        let years_newer = (features.year - r.reference_year).max(0) as f64;
        let km_below = r.mileage_ceiling.saturating_sub(features.mileage) as f64;

        let brand_premium = match self.brand_tier(&features.brand) {
            BrandTier::Luxury => r.luxury_premium,
            BrandTier::MidTier => r.mid_tier_premium,
            BrandTier::Standard => 0.0,
        };
        let transmission_premium = if features.transmission == "Automatic" {
            r.automatic_premium
        } else {
            0.0
        };
        let fuel_premium = if r.fuel_premium_types.iter().any(|f| *f == features.fuel_type) {
            r.fuel_premium
        } else {
            0.0
        };

        r.base
            + years_newer * r.per_year
            + km_below * r.per_km_below_ceiling
            + features.engine_size * r.per_litre
            + features.horsepower as f64 * r.per_horsepower
            + brand_premium
            + transmission_premium
            + fuel_premium
    }

    /// Estimate with a random jitter factor drawn from `rng`
    pub fn estimate<R: Rng + ?Sized>(&self, features: &CarFeatures, rng: &mut R) -> f64 {
        let (low, high) = self.rules.jitter;
        let factor = if high > low { rng.gen_range(low..high) } else { low };
        self.estimate_with_factor(features, factor)
    }

    /// Estimate with an explicit jitter factor
    pub fn estimate_with_factor(&self, features: &CarFeatures, factor: f64) -> f64 {
        let base = self.base_price(features);
        let price = (base * factor).max(self.rules.floor);
        debug!(
            "Fallback estimate for {} {} {}: base {:.0} x {:.3} = {:.0}",
            features.year, features.brand, features.model, base, factor, price
        );
        price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn car(brand: &str, year: i32, mileage: u32, hp: u32) -> CarFeatures {
        CarFeatures {
            brand: brand.to_string(),
            model: "Test".to_string(),
            year,
            mileage,
            fuel_type: "Petrol".to_string(),
            transmission: "Manual".to_string(),
            engine_size: 1.5,
            horsepower: hp,
        }
    }

    #[test]
    fn test_base_price_formula() {
        let estimator = FallbackEstimator::default();
        let mut features = car("Toyota", 2020, 30_000, 150);
        features.transmission = "Automatic".to_string();
        features.fuel_type = "Diesel".to_string();
        features.engine_size = 2.0;

        // 300k + 10y*50k + 70k km*2 + 2.0L*100k + 150hp*1k + 200k + 50k + 30k
        let expected = 300_000.0 + 500_000.0 + 140_000.0 + 200_000.0 + 150_000.0 + 200_000.0 + 50_000.0 + 30_000.0;
        assert_eq!(estimator.base_price(&features), expected);
    }

    #[test]
    fn test_old_high_mileage_terms_clamp_to_zero() {
        let estimator = FallbackEstimator::default();
        let features = car("Tata", 2005, 250_000, 0);
        // Only base and engine size contribute
        assert_eq!(estimator.base_price(&features), 300_000.0 + 150_000.0);
    }

    #[test]
    fn test_brand_tiers_are_exact_match() {
        let estimator = FallbackEstimator::default();
        assert_eq!(estimator.brand_tier("BMW"), BrandTier::Luxury);
        assert_eq!(estimator.brand_tier("Mercedes-Benz"), BrandTier::Luxury);
        assert_eq!(estimator.brand_tier("Honda"), BrandTier::MidTier);
        assert_eq!(estimator.brand_tier("bmw"), BrandTier::Standard);
        assert_eq!(estimator.brand_tier("Maruti"), BrandTier::Standard);
    }

    #[test]
    fn test_floor_applies() {
        let estimator = FallbackEstimator::default();
        let mut features = car("Tata", 2000, 500_000, 10);
        features.engine_size = 0.5;
        // base 360k, jittered to 288k
        assert_eq!(estimator.estimate_with_factor(&features, 0.8), 300_000.0);
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let estimator = FallbackEstimator::default();
        let features = car("Audi", 2021, 10_000, 250);
        let base = estimator.base_price(&features);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let price = estimator.estimate(&features, &mut rng);
            assert!(price >= base * 0.8 && price < base * 1.2);
        }
    }

    proptest! {
        #[test]
        fn prop_base_price_monotonic_in_year(
            year in 1990i32..2040,
            step in 1i32..10,
            mileage in 0u32..300_000,
            hp in 0u32..1000,
        ) {
            let estimator = FallbackEstimator::default();
            let older = estimator.base_price(&car("Ford", year, mileage, hp));
            let newer = estimator.base_price(&car("Ford", year + step, mileage, hp));
            prop_assert!(newer >= older);
        }

        #[test]
        fn prop_base_price_monotonic_in_horsepower(
            hp in 0u32..1000,
            step in 1u32..500,
            year in 1990i32..2040,
        ) {
            let estimator = FallbackEstimator::default();
            let weaker = estimator.base_price(&car("Kia", year, 40_000, hp));
            let stronger = estimator.base_price(&car("Kia", year, 40_000, hp + step));
            prop_assert!(stronger > weaker);
        }

        #[test]
        fn prop_estimate_never_below_floor(
            year in 1950i32..2040,
            mileage in 0u32..2_000_000,
            factor in 0.8f64..1.2,
        ) {
            let estimator = FallbackEstimator::default();
            let price = estimator.estimate_with_factor(&car("Lada", year, mileage, 60), factor);
            prop_assert!(price >= 300_000.0);
        }
    }
}
