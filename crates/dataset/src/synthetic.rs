//! Seeded Synthetic Car Listings
//!
//! Produces a reproducible dataset with the same brand catalogue and price
//! structure as the reference listings: brand base price, luxury multiplier,
//! age and mileage depreciation, transmission and fuel adjustments, and a
//! ±15% market noise term.

use crate::{CarFeatures, CarRecord};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use tracing::debug;

/// Brand catalogue: (brand, base price, models)
const CATALOGUE: &[(&str, f64, &[&str])] = &[
    ("Toyota", 1_200_000.0, &["Camry", "Corolla", "Fortuner", "Innova", "Swift", "Civic"]),
    ("Honda", 1_100_000.0, &["Civic", "City", "Accord", "Swift", "CR-V"]),
    ("Hyundai", 900_000.0, &["i20", "Creta", "Verna", "Venue"]),
    ("Maruti", 600_000.0, &["Swift", "Baleno", "Brezza", "Dzire", "Ertiga"]),
    ("BMW", 5_500_000.0, &["X5", "X1", "3 Series", "5 Series"]),
    ("Mercedes", 6_000_000.0, &["C-Class", "E-Class", "S-Class", "GLC"]),
    ("Audi", 5_200_000.0, &["A4", "A6", "Q3", "Q5"]),
    ("Ford", 850_000.0, &["EcoSport", "Figo", "Endeavour"]),
    ("Tata", 750_000.0, &["Nexon", "Harrier", "Tiago", "Safari"]),
    ("Mahindra", 950_000.0, &["Scorpio", "Thar", "XUV700", "XUV300"]),
];

const LUXURY_BRANDS: &[&str] = &["BMW", "Mercedes", "Audi"];

const FUEL_TYPES: &[(&str, f64)] = &[
    ("Petrol", 0.50),
    ("Diesel", 0.35),
    ("CNG", 0.10),
    ("Electric", 0.05),
];

const TRANSMISSIONS: &[(&str, f64)] = &[("Manual", 0.45), ("Automatic", 0.55)];

/// Lowest listed price
const PRICE_FLOOR: f64 = 300_000.0;

/// Seeded generator of synthetic car listings
pub struct SyntheticGenerator {
    rng: StdRng,
}

impl SyntheticGenerator {
    /// Create a generator with a fixed seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate `count` labelled records
    pub fn generate(&mut self, count: usize) -> Vec<CarRecord> {
        debug!("Generating {} synthetic car records", count);
        (0..count).map(|_| self.next_record()).collect()
    }

    fn next_record(&mut self) -> CarRecord {
        let (brand, base_price, models) = CATALOGUE[self.rng.gen_range(0..CATALOGUE.len())];
        let model = models[self.rng.gen_range(0..models.len())];
        let year = self.rng.gen_range(2010..2025);
        let mileage = self.rng.gen_range(10_000..150_000);
        let fuel_type = Self::pick_weighted(&mut self.rng, FUEL_TYPES);
        let transmission = Self::pick_weighted(&mut self.rng, TRANSMISSIONS);
        let engine_size = (self.rng.gen_range(1.0..4.0_f64) * 10.0).round() / 10.0;
        let horsepower = self.rng.gen_range(80..450);

        let mut price = base_price;
        if LUXURY_BRANDS.contains(&brand) {
            price *= 1.8;
        }
        price *= (year - 2010) as f64 / 15.0 + 0.6;
        price *= (-(mileage as f64) / 100_000.0).exp();
        if transmission == "Automatic" {
            price *= 1.25;
        }
        match fuel_type {
            "Electric" => price *= 1.6,
            "CNG" => price *= 0.85,
            _ => {}
        }
        price *= self.rng.gen_range(0.85..1.15);
        let price = ((price / 1000.0).floor() * 1000.0).max(PRICE_FLOOR);

        CarRecord {
            features: CarFeatures {
                brand: brand.to_string(),
                model: model.to_string(),
                year,
                mileage,
                fuel_type: fuel_type.to_string(),
                transmission: transmission.to_string(),
                engine_size,
                horsepower,
            },
            price,
        }
    }

    fn pick_weighted<'a>(rng: &mut StdRng, choices: &[(&'a str, f64)]) -> &'a str {
        let total: f64 = choices.iter().map(|(_, w)| w).sum();
        let mut target = rng.gen_range(0.0..total);
        for &(value, weight) in choices {
            if target < weight {
                return value;
            }
            target -= weight;
        }
        choices[choices.len() - 1].0
    }
}
