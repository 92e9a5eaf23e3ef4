use crate::error::PlanError;
use crate::reagent::Stage;
use crate::well::PlateFormat;
use serde::{Deserialize, Serialize};
use std::fs;

/// Run parameters for the planner.
///
/// Field defaults match the 384-well low dead volume Echo plates the tool
/// was written for: 50 units of usable volume per source well, 1 unit per
/// transfer, and the I/M/T building-block categories with T pipetted in the
/// second stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub rows: u8,
    pub columns: u16,
    /// Usable volume of one source well (total volume minus dead volume).
    pub source_well_capacity: u32,
    /// Volume drawn per transfer, in the same unit as the capacity.
    pub transfer_volume: u32,
    /// Category letters, in band order on a shared source plate.
    pub categories: Vec<char>,
    /// Categories dispensed in the second pipetting stage; the remaining
    /// categories run in the first.
    pub late_categories: Vec<char>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            rows: 16,
            columns: 24,
            source_well_capacity: 50,
            transfer_volume: 1,
            categories: vec!['I', 'M', 'T'],
            late_categories: vec!['T'],
        }
    }
}

impl PlannerConfig {
    pub fn load_from_path(path: &str) -> Result<Self, PlanError> {
        let text = fs::read_to_string(path)
            .map_err(|e| PlanError::Configuration(format!("Could not read config file '{path}': {e}")))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| PlanError::Configuration(format!("Could not parse config JSON '{path}': {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if self.rows == 0 || self.rows > 26 {
            return Err(PlanError::Configuration(format!(
                "Plate rows must be between 1 and 26, got {}",
                self.rows
            )));
        }
        if self.columns == 0 {
            return Err(PlanError::Configuration("Plate needs at least one column".to_string()));
        }
        if self.transfer_volume == 0 {
            return Err(PlanError::Configuration("Transfer volume must be at least 1".to_string()));
        }
        if self.categories.is_empty() {
            return Err(PlanError::Configuration("No reagent categories configured".to_string()));
        }
        for (i, category) in self.categories.iter().enumerate() {
            if self.categories[..i].contains(category) {
                return Err(PlanError::Configuration(format!(
                    "Duplicate reagent category '{category}'"
                )));
            }
        }
        for category in &self.late_categories {
            if !self.categories.contains(category) {
                return Err(PlanError::Configuration(format!(
                    "Late category '{category}' is not in the category list"
                )));
            }
        }
        Ok(())
    }

    pub fn plate_format(&self) -> PlateFormat {
        PlateFormat {
            rows: self.rows,
            columns: self.columns,
        }
    }

    /// Which pipetting stage a category belongs to, or `None` for a
    /// category letter that is not configured at all.
    pub fn stage_of(&self, category: char) -> Option<Stage> {
        if !self.categories.contains(&category) {
            None
        } else if self.late_categories.contains(&category) {
            Some(Stage::Second)
        } else {
            Some(Stage::First)
        }
    }
}
