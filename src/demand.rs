use crate::error::PlanError;
use crate::plate::TargetPlate;
use crate::reagent::ReagentCode;
use std::collections::BTreeMap;

/// Reagent code → total transfer count required across all target wells.
pub type DemandMap = BTreeMap<ReagentCode, u32>;

/// Count how often every reagent is requested across all target plates.
///
/// Each code listed in a well is one demand unit. A well that is present
/// but lists no codes is rejected as malformed rather than skipped, so a
/// stray empty cell in the input cannot silently shrink the plan.
pub fn aggregate_demand(plates: &[TargetPlate]) -> Result<DemandMap, PlanError> {
    let mut demand = DemandMap::new();
    for plate in plates {
        for (well, codes) in &plate.wells {
            if codes.is_empty() {
                return Err(PlanError::MalformedInput(format!(
                    "Plate {} well {} lists no reagent codes",
                    plate.number, well
                )));
            }
            for code in codes {
                *demand.entry(code.clone()).or_insert(0) += 1;
            }
        }
    }
    Ok(demand)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plate(number: usize, wells: &[(&str, &[&str])]) -> TargetPlate {
        let mut plate = TargetPlate::new(number, format!("plate{number}"));
        for (well, codes) in wells {
            plate.wells.insert(
                well.parse().unwrap(),
                codes.iter().map(|c| ReagentCode::parse(c).unwrap()).collect(),
            );
        }
        plate
    }

    #[test]
    fn test_counts_across_plates() {
        let plates = vec![
            plate(1, &[("A1", &["I1", "T1"]), ("A2", &["I1", "M2"])]),
            plate(2, &[("B1", &["I1"])]),
        ];
        let demand = aggregate_demand(&plates).unwrap();
        assert_eq!(demand[&ReagentCode::parse("I1").unwrap()], 3);
        assert_eq!(demand[&ReagentCode::parse("M2").unwrap()], 1);
        assert_eq!(demand[&ReagentCode::parse("T1").unwrap()], 1);
        assert_eq!(demand.len(), 3);
    }

    #[test]
    fn test_empty_plate_list() {
        assert!(aggregate_demand(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_well_without_codes() {
        let mut bad = TargetPlate::new(1, "plate1");
        bad.wells.insert("C3".parse().unwrap(), vec![]);
        let err = aggregate_demand(&[bad]).unwrap_err();
        assert!(err.to_string().contains("C3"));
    }
}
