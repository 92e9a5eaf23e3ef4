use crate::config::PlannerConfig;
use crate::error::Diagnostic;
use crate::plate::{SourceLayout, TargetPlate};
use crate::reagent::{ReagentCode, Stage};
use crate::well::WellAddress;
use serde::Serialize;
use std::collections::BTreeMap;

/// One instructed liquid movement from a source well into a target well.
/// The transfer volume is a single run-wide setting and is attached when
/// the transfer list is serialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub source_plate: usize,
    pub source_well: WellAddress,
    pub target_plate: usize,
    pub target_well: WellAddress,
    pub reagent: ReagentCode,
}

/// Remaining draws per source well. Owned by the matcher for the duration
/// of one matching pass and discarded afterward.
pub struct SourceLedger {
    /// Indexed in parallel with the layout's plate list.
    loads: Vec<BTreeMap<WellAddress, u32>>,
}

impl SourceLedger {
    pub fn new(layout: &SourceLayout, transfers_per_well: u32) -> Self {
        let loads = layout
            .plates
            .iter()
            .map(|plate| plate.wells.keys().map(|well| (*well, transfers_per_well)).collect())
            .collect();
        Self { loads }
    }

    pub fn remaining(&self, plate_idx: usize, well: &WellAddress) -> u32 {
        self.loads
            .get(plate_idx)
            .and_then(|plate| plate.get(well))
            .copied()
            .unwrap_or(0)
    }

    /// Commit one draw. Only called for wells [`find_source`] reported
    /// eligible, so the counter never wraps below zero.
    fn draw(&mut self, plate_idx: usize, well: &WellAddress) {
        if let Some(load) = self.loads.get_mut(plate_idx).and_then(|plate| plate.get_mut(well)) {
            *load = load.saturating_sub(1);
        }
    }
}

/// First source well holding `code` with a draw left, scanning plates and
/// wells in allocation order. Searching is separate from the mutation that
/// commits the draw.
fn find_source(
    layout: &SourceLayout,
    ledger: &SourceLedger,
    code: &ReagentCode,
) -> Option<(usize, WellAddress)> {
    for (plate_idx, plate) in layout.plates.iter().enumerate() {
        for (well, assigned) in &plate.wells {
            if assigned == code && ledger.remaining(plate_idx, well) > 0 {
                return Some((plate_idx, *well));
            }
        }
    }
    None
}

/// Transfers per stage plus everything that could not be matched.
#[derive(Clone, Debug, Default)]
pub struct MatchOutcome {
    pub stage_one: Vec<Transfer>,
    pub stage_two: Vec<Transfer>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Greedily match every (target well, reagent) demand unit to a source
/// well, depleting source loads as it goes.
///
/// A single deterministic pass: target plates in discovery order, wells in
/// row-major order, reagents in declared order. Unknown categories and
/// unsatisfiable demand become diagnostics, never silent drops.
pub fn match_transfers(
    layout: &SourceLayout,
    targets: &[TargetPlate],
    config: &PlannerConfig,
    transfers_per_well: u32,
) -> MatchOutcome {
    let mut ledger = SourceLedger::new(layout, transfers_per_well);
    let mut outcome = MatchOutcome::default();

    for target in targets {
        for (target_well, codes) in &target.wells {
            for code in codes {
                let Some(stage) = config.stage_of(code.category()) else {
                    outcome.diagnostics.push(Diagnostic::UnknownReagent {
                        reagent: code.clone(),
                        target_plate: target.number,
                        target_well: *target_well,
                    });
                    continue;
                };
                let Some((plate_idx, source_well)) = find_source(layout, &ledger, code) else {
                    outcome.diagnostics.push(Diagnostic::UnmetDemand {
                        reagent: code.clone(),
                        target_plate: target.number,
                        target_well: *target_well,
                    });
                    continue;
                };
                ledger.draw(plate_idx, &source_well);
                let transfer = Transfer {
                    source_plate: layout.plates[plate_idx].number,
                    source_well,
                    target_plate: target.number,
                    target_well: *target_well,
                    reagent: code.clone(),
                };
                match stage {
                    Stage::First => outcome.stage_one.push(transfer),
                    Stage::Second => outcome.stage_two.push(transfer),
                }
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plate::SourcePlate;

    fn code(s: &str) -> ReagentCode {
        ReagentCode::parse(s).unwrap()
    }

    fn source_plate(number: usize, wells: &[(&str, &str)]) -> SourcePlate {
        SourcePlate {
            number,
            label: "source".to_string(),
            wells: wells
                .iter()
                .map(|(well, reagent)| (well.parse().unwrap(), code(reagent)))
                .collect(),
        }
    }

    fn target_plate(number: usize, wells: &[(&str, &[&str])]) -> TargetPlate {
        let mut plate = TargetPlate::new(number, format!("plate{number}"));
        for (well, codes) in wells {
            plate
                .wells
                .insert(well.parse().unwrap(), codes.iter().map(|c| code(c)).collect());
        }
        plate
    }

    #[test]
    fn test_two_well_scenario() {
        // Wells requesting I1,T1 and I1,M2 against dedicated source wells:
        // three transfers, two in stage 1, one in stage 2.
        let layout = SourceLayout {
            plates: vec![source_plate(1, &[("A1", "I1"), ("F1", "M2"), ("K1", "T1")])],
        };
        let targets = vec![target_plate(1, &[("A1", &["I1", "T1"]), ("A2", &["I1", "M2"])])];
        let outcome = match_transfers(&layout, &targets, &PlannerConfig::default(), 50);
        assert_eq!(outcome.stage_one.len(), 2);
        assert_eq!(outcome.stage_two.len(), 1);
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(outcome.stage_one[0].reagent, code("I1"));
        assert_eq!(outcome.stage_one[0].source_well, "A1".parse().unwrap());
        assert_eq!(outcome.stage_two[0].reagent, code("T1"));
    }

    #[test]
    fn test_depletion_moves_to_next_well() {
        // Two source wells for I1 with 2 draws each: the first two demand
        // units drain A1, the next two drain A2.
        let layout = SourceLayout {
            plates: vec![source_plate(1, &[("A1", "I1"), ("A2", "I1")])],
        };
        let targets = vec![target_plate(
            1,
            &[("A1", &["I1"]), ("A2", &["I1"]), ("A3", &["I1"]), ("A4", &["I1"])],
        )];
        let outcome = match_transfers(&layout, &targets, &PlannerConfig::default(), 2);
        assert!(outcome.diagnostics.is_empty());
        let sources: Vec<String> = outcome
            .stage_one
            .iter()
            .map(|t| t.source_well.to_string())
            .collect();
        assert_eq!(sources, ["A1", "A1", "A2", "A2"]);
    }

    #[test]
    fn test_capacity_conservation() {
        // 120 demand units over three wells with 50 draws each consume
        // 50+50+20.
        let layout = SourceLayout {
            plates: vec![source_plate(1, &[("A1", "I1"), ("A2", "I1"), ("A3", "I1")])],
        };
        let mut target = TargetPlate::new(1, "plate1");
        let format = crate::well::PlateFormat::default();
        for well in format.wells_row_major().take(120) {
            target.wells.insert(well, vec![code("I1")]);
        }
        let outcome = match_transfers(&layout, &[target], &PlannerConfig::default(), 50);
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(outcome.stage_one.len(), 120);
        let draws_from = |well: &str| {
            outcome
                .stage_one
                .iter()
                .filter(|t| t.source_well == well.parse().unwrap())
                .count()
        };
        assert_eq!(draws_from("A1"), 50);
        assert_eq!(draws_from("A2"), 50);
        assert_eq!(draws_from("A3"), 20);
    }

    #[test]
    fn test_unmet_demand_is_reported() {
        let layout = SourceLayout {
            plates: vec![source_plate(1, &[("A1", "I1")])],
        };
        let targets = vec![target_plate(1, &[("A1", &["I1"]), ("A2", &["I1"])])];
        let outcome = match_transfers(&layout, &targets, &PlannerConfig::default(), 1);
        assert_eq!(outcome.stage_one.len(), 1);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.diagnostics[0].is_unmet_demand());
    }

    #[test]
    fn test_unknown_reagent_is_reported_not_matched() {
        let layout = SourceLayout {
            plates: vec![source_plate(1, &[("A1", "I1")])],
        };
        let targets = vec![target_plate(1, &[("A1", &["I1", "X9"])])];
        let outcome = match_transfers(&layout, &targets, &PlannerConfig::default(), 50);
        assert_eq!(outcome.stage_one.len(), 1);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(!outcome.diagnostics[0].is_unmet_demand());
    }

    #[test]
    fn test_exact_code_match_only() {
        // I1 demand must not draw from an I12 well.
        let layout = SourceLayout {
            plates: vec![source_plate(1, &[("A1", "I12")])],
        };
        let targets = vec![target_plate(1, &[("A1", &["I1"])])];
        let outcome = match_transfers(&layout, &targets, &PlannerConfig::default(), 50);
        assert!(outcome.stage_one.is_empty());
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.diagnostics[0].is_unmet_demand());
    }

    #[test]
    fn test_scans_plates_in_allocation_order() {
        let layout = SourceLayout {
            plates: vec![source_plate(1, &[("A1", "M2")]), source_plate(2, &[("A1", "I1")])],
        };
        let targets = vec![target_plate(1, &[("A1", &["I1"])])];
        let outcome = match_transfers(&layout, &targets, &PlannerConfig::default(), 50);
        assert_eq!(outcome.stage_one.len(), 1);
        assert_eq!(outcome.stage_one[0].source_plate, 2);
    }
}
