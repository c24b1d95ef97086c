//! Vehicle history records.
//!
//! A [`VehicleRecord`] is what gets minted: identity of the vehicle plus the
//! two facts a buyer cares about, the last inspection and the odometer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Date format of `last_inspection`.
pub const INSPECTION_DATE_FORMAT: &str = "%Y-%m-%d";

/// A vehicle's history snapshot.
///
/// Serializes to the metadata JSON carried in a token's URI. Field names on
/// the wire are `vehicle`, `brand`, `model`, `year`, `lastInspection` and
/// `mileage`, in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Vehicle identification number.
    #[serde(rename = "vehicle")]
    pub vin: String,
    /// Manufacturer.
    pub brand: String,
    /// Model name.
    pub model: String,
    /// Model year.
    pub year: i32,
    /// Date of the last inspection, `YYYY-MM-DD`.
    #[serde(rename = "lastInspection")]
    pub last_inspection: String,
    /// Odometer reading in kilometres.
    pub mileage: u64,
}

impl VehicleRecord {
    /// Build a record, trimming the text fields.
    #[must_use]
    pub fn new(
        vin: &str,
        brand: &str,
        model: &str,
        year: i32,
        last_inspection: &str,
        mileage: u64,
    ) -> Self {
        Self {
            vin: vin.trim().to_string(),
            brand: brand.trim().to_string(),
            model: model.trim().to_string(),
            year,
            last_inspection: last_inspection.trim().to_string(),
            mileage,
        }
    }

    /// Check that every required field is present and the inspection date
    /// is a real calendar date.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVehicle`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("vin", &self.vin),
            ("brand", &self.brand),
            ("model", &self.model),
            ("last inspection date", &self.last_inspection),
        ] {
            if value.trim().is_empty() {
                return Err(Error::invalid_vehicle(field, "a value is required"));
            }
        }

        self.inspection_date()?;
        Ok(())
    }

    /// Parse `last_inspection` as a date.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVehicle`] if it is not `YYYY-MM-DD`.
    pub fn inspection_date(&self) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(self.last_inspection.trim(), INSPECTION_DATE_FORMAT).map_err(
            |e| {
                Error::invalid_vehicle(
                    "last inspection date",
                    format!("'{}' is not a YYYY-MM-DD date ({e})", self.last_inspection),
                )
            },
        )
    }

    /// Short heading such as `Toyota Camry (2020)`.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} {} ({})", self.brand, self.model, self.year)
    }
}
