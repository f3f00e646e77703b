//! CSV Loading

use crate::{CarFeatures, CarRecord, DatasetError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Flat CSV row layout: `brand,model,year,mileage,fuel_type,transmission,engine_size,horsepower,price`
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    brand: String,
    model: String,
    year: i32,
    mileage: u32,
    fuel_type: String,
    transmission: String,
    engine_size: f64,
    horsepower: u32,
    price: f64,
}

impl From<CsvRow> for CarRecord {
    fn from(row: CsvRow) -> Self {
        CarRecord {
            features: CarFeatures {
                brand: row.brand,
                model: row.model,
                year: row.year,
                mileage: row.mileage,
                fuel_type: row.fuel_type,
                transmission: row.transmission,
                engine_size: row.engine_size,
                horsepower: row.horsepower,
            },
            price: row.price,
        }
    }
}

impl From<&CarRecord> for CsvRow {
    fn from(record: &CarRecord) -> Self {
        let f = &record.features;
        CsvRow {
            brand: f.brand.clone(),
            model: f.model.clone(),
            year: f.year,
            mileage: f.mileage,
            fuel_type: f.fuel_type.clone(),
            transmission: f.transmission.clone(),
            engine_size: f.engine_size,
            horsepower: f.horsepower,
            price: record.price,
        }
    }
}

/// Load car records from a CSV file with a header row.
///
/// Rows that fail to parse or carry a non-finite price or engine size are
/// skipped with a warning; an I/O failure or a file without a single usable
/// row is an error.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<CarRecord>, DatasetError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut reader = csv::Reader::from_reader(std::io::BufReader::new(file));
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
        match row {
            Ok(row) => {
                let record = CarRecord::from(row);
                if record.is_finite() {
                    records.push(record);
                } else {
                    skipped += 1;
                    debug!("Skipping CSV row {}: non-finite price or engine size", line + 2);
                }
            }
            Err(e) => {
                skipped += 1;
                debug!("Skipping CSV row {}: {}", line + 2, e);
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {} malformed rows in {}", skipped, path.display());
    }
    if records.is_empty() {
        return Err(DatasetError::Empty);
    }

    info!("Loaded {} car records from {}", records.len(), path.display());
    Ok(records)
}

/// Write car records to a CSV file with a header row
pub fn write_csv(path: impl AsRef<Path>, records: &[CarRecord]) -> Result<(), DatasetError> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }
    writer.flush().map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    info!("Wrote {} car records to {}", records.len(), path.display());
    Ok(())
}
