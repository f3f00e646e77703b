//! Car Record Repository

use crate::{load_csv, CarRecord, DatasetError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, info};

/// Summary statistics over the whole dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub total_cars: usize,
    pub avg_price: i64,
    pub min_price: i64,
    pub max_price: i64,
    pub avg_year: i64,
    pub avg_mileage: i64,
    /// Rounded to one decimal place
    pub avg_engine_size: f64,
    pub avg_horsepower: i64,
}

/// Occurrence count of a categorical value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Filters for the similar-cars search. Empty strings are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimilarCarsQuery {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub limit: usize,
}

/// Read-only in-memory repository of car listings
#[derive(Debug, Clone, Default)]
pub struct CarRepository {
    records: Vec<CarRecord>,
}

impl CarRepository {
    /// Create a repository over the given records
    pub fn new(records: Vec<CarRecord>) -> Self {
        info!("Creating car repository with {} records", records.len());
        Self { records }
    }

    /// Load the repository from a CSV file
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        load_csv(path).map(Self::new)
    }

    /// All records
    pub fn records(&self) -> &[CarRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Descriptive statistics, `None` for an empty dataset
    pub fn stats(&self) -> Option<DatasetStats> {
        if self.records.is_empty() {
            return None;
        }

        let min_price = self.records.iter().map(|r| r.price).fold(f64::MAX, f64::min);
        let max_price = self.records.iter().map(|r| r.price).fold(f64::MIN, f64::max);

        Some(DatasetStats {
            total_cars: self.records.len(),
            avg_price: self.mean_of(|r| r.price).round() as i64,
            min_price: min_price.round() as i64,
            max_price: max_price.round() as i64,
            avg_year: self.mean_of(|r| r.features.year as f64).round() as i64,
            avg_mileage: self.mean_of(|r| r.features.mileage as f64).round() as i64,
            avg_engine_size: (self.mean_of(|r| r.features.engine_size) * 10.0).round() / 10.0,
            avg_horsepower: self.mean_of(|r| r.features.horsepower as f64).round() as i64,
        })
    }

    /// Year range as (min, max)
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let min = self.records.iter().map(|r| r.features.year).min()?;
        let max = self.records.iter().map(|r| r.features.year).max()?;
        Some((min, max))
    }

    /// Listings per fuel type, most frequent first
    pub fn fuel_counts(&self) -> Vec<CategoryCount> {
        Self::value_counts(self.records.iter().map(|r| r.features.fuel_type.as_str()))
    }

    /// Listings per transmission, most frequent first
    pub fn transmission_counts(&self) -> Vec<CategoryCount> {
        Self::value_counts(self.records.iter().map(|r| r.features.transmission.as_str()))
    }

    /// The `n` most listed brands
    pub fn top_brands(&self, n: usize) -> Vec<CategoryCount> {
        let mut counts = Self::value_counts(self.records.iter().map(|r| r.features.brand.as_str()));
        counts.truncate(n);
        counts
    }

    /// Sorted unique brands
    pub fn brands(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.features.brand.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted unique models of an exact brand
    pub fn models_for(&self, brand: &str) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| r.features.brand == brand)
            .map(|r| r.features.model.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Listings matching the query, newest first then cheapest first.
    ///
    /// Brand, fuel type and transmission match case-insensitively; model
    /// matches as a case-insensitive substring.
    pub fn similar(&self, query: &SimilarCarsQuery) -> Vec<CarRecord> {
        let wanted = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_lowercase)
        };
        let brand = wanted(&query.brand);
        let model = wanted(&query.model);
        let fuel = wanted(&query.fuel_type);
        let transmission = wanted(&query.transmission);

        let mut matches: Vec<&CarRecord> = self
            .records
            .iter()
            .filter(|r| brand.as_ref().map_or(true, |b| r.features.brand.to_lowercase() == *b))
            .filter(|r| model.as_ref().map_or(true, |m| r.features.model.to_lowercase().contains(m.as_str())))
            .filter(|r| fuel.as_ref().map_or(true, |f| r.features.fuel_type.to_lowercase() == *f))
            .filter(|r| {
                transmission
                    .as_ref()
                    .map_or(true, |t| r.features.transmission.to_lowercase() == *t)
            })
            .collect();

        matches.sort_by(|a, b| {
            b.features
                .year
                .cmp(&a.features.year)
                .then_with(|| a.price.total_cmp(&b.price))
        });

        debug!("Similar cars query matched {} records", matches.len());
        matches.into_iter().take(query.limit).cloned().collect()
    }

    fn mean_of(&self, f: impl Fn(&CarRecord) -> f64) -> f64 {
        self.records.iter().map(f).sum::<f64>() / self.records.len() as f64
    }

    fn value_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<CategoryCount> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for v in values {
            *counts.entry(v).or_insert(0) += 1;
        }

        let mut counts: Vec<CategoryCount> = counts
            .into_iter()
            .map(|(name, count)| CategoryCount {
                name: name.to_string(),
                count,
            })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        counts
    }
}
