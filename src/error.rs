use crate::reagent::ReagentCode;
use crate::well::WellAddress;
use serde::Serialize;
use std::error::Error;
use std::fmt;

/// Structural failures that abort a planning run before any output exists.
#[derive(Debug)]
pub enum PlanError {
    /// Run parameters that can never produce a valid plan, e.g. a source
    /// well too small for a single transfer.
    Configuration(String),
    /// Demand exceeds even the one-plate-per-category fallback layout.
    CapacityExceeded(String),
    /// Structurally bad target layout input.
    MalformedInput(String),
    Io(std::io::Error),
    Csv(csv::Error),
}

impl Error for PlanError {}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlanError::Configuration(msg) => write!(f, "Configuration error: {msg}"),
            PlanError::CapacityExceeded(msg) => write!(f, "Capacity exceeded: {msg}"),
            PlanError::MalformedInput(msg) => write!(f, "Malformed input: {msg}"),
            PlanError::Io(e) => write!(f, "I/O error: {e}"),
            PlanError::Csv(e) => write!(f, "CSV error: {e}"),
        }
    }
}

impl From<std::io::Error> for PlanError {
    fn from(err: std::io::Error) -> Self {
        PlanError::Io(err)
    }
}

impl From<csv::Error> for PlanError {
    fn from(err: csv::Error) -> Self {
        PlanError::Csv(err)
    }
}

/// Per-demand-unit problems collected during matching. These never abort
/// the run; they are returned with the transfers so the caller sees the
/// full set at once and decides whether partial output is acceptable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Diagnostic {
    /// A required reagent had no source well with a draw left.
    UnmetDemand {
        reagent: ReagentCode,
        target_plate: usize,
        target_well: WellAddress,
    },
    /// A reagent whose category letter is not configured; no transfer is
    /// created for it.
    UnknownReagent {
        reagent: ReagentCode,
        target_plate: usize,
        target_well: WellAddress,
    },
}

impl Diagnostic {
    pub fn is_unmet_demand(&self) -> bool {
        matches!(self, Diagnostic::UnmetDemand { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Diagnostic::UnmetDemand {
                reagent,
                target_plate,
                target_well,
            } => write!(
                f,
                "No source well left for '{reagent}', required in plate {target_plate} well {target_well}"
            ),
            Diagnostic::UnknownReagent {
                reagent,
                target_plate,
                target_well,
            } => write!(
                f,
                "Unknown reagent category for '{reagent}' in plate {target_plate} well {target_well}"
            ),
        }
    }
}
