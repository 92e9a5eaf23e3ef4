use crate::error::PlanError;
use crate::matcher::Transfer;
use crate::plate::{SourcePlate, TargetPlate};
use crate::reagent::ReagentCode;
use crate::well::{PlateFormat, WellAddress, row_letter};
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Barcode prefixes expected by the instrument software.
pub const SOURCE_BARCODE_PREFIX: &str = "Source";
pub const TARGET_BARCODE_PREFIX: &str = "Synthesis";

/// Import one target plate layout CSV.
///
/// The file is in plate-grid format: a header row of column numbers, then
/// one row per plate row, the row letter first. Non-empty cells list the
/// required reagent codes, comma separated. Empty cells are empty wells.
pub fn read_target_plate(path: &Path, number: usize, format: &PlateFormat) -> Result<TargetPlate> {
    let file = File::open(path)
        .with_context(|| format!("Could not open target layout '{}'", path.display()))?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut wells: BTreeMap<WellAddress, Vec<ReagentCode>> = BTreeMap::new();
    let mut seen_rows = vec![false; format.rows as usize];
    let mut header_skipped = false;
    for result in rdr.records() {
        let record =
            result.with_context(|| format!("Bad CSV line in '{}'", path.display()))?;
        if !header_skipped {
            // first row holds the column numbers
            header_skipped = true;
            continue;
        }
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let mut fields = record.iter();
        let label = fields.next().unwrap_or("").trim();
        let mut label_chars = label.chars();
        let (letter, rest) = (label_chars.next(), label_chars.next());
        let row = match (letter, rest) {
            (Some(letter), None) => format.row_index(letter).ok_or_else(|| {
                PlanError::MalformedInput(format!(
                    "'{}': row label '{label}' is outside a plate with {} rows",
                    path.display(),
                    format.rows
                ))
            })?,
            _ => {
                return Err(PlanError::MalformedInput(format!(
                    "'{}': expected a single row letter, got '{label}'",
                    path.display()
                ))
                .into());
            }
        };
        if seen_rows[row as usize] {
            return Err(PlanError::MalformedInput(format!(
                "'{}': duplicate row '{label}'",
                path.display()
            ))
            .into());
        }
        seen_rows[row as usize] = true;

        for (offset, cell) in fields.enumerate() {
            if cell.trim().is_empty() {
                continue;
            }
            let column = offset as u16 + 1;
            if column > format.columns {
                return Err(PlanError::MalformedInput(format!(
                    "'{}': row {label} has content in column {column}, plate only has {}",
                    path.display(),
                    format.columns
                ))
                .into());
            }
            let codes = cell
                .split(',')
                .map(|piece| {
                    ReagentCode::parse(piece).map_err(|e| {
                        PlanError::MalformedInput(format!(
                            "'{}': well {label}{column}: {e}",
                            path.display()
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            wells.insert(WellAddress::new(row, column), codes);
        }
    }

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| format!("plate{number}"));
    Ok(TargetPlate {
        number,
        name,
        wells,
    })
}

/// Import a batch of target layouts, numbering them 1..n in the given
/// (discovery) order.
pub fn read_target_plates(paths: &[PathBuf], format: &PlateFormat) -> Result<Vec<TargetPlate>> {
    paths
        .iter()
        .enumerate()
        .map(|(idx, path)| read_target_plate(path, idx + 1, format))
        .collect()
}

/// Write one cherry-pick file in the instrument's expected column layout.
pub fn write_transfer_list(
    path: &Path,
    transfers: &[Transfer],
    volume: u32,
) -> Result<(), PlanError> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "Source Barcode",
        "Source Well",
        "Destination Barcode",
        "Destination Well",
        "Volume",
    ])?;
    for transfer in transfers {
        wtr.write_record([
            format!("{SOURCE_BARCODE_PREFIX}{}", transfer.source_plate),
            transfer.source_well.to_string(),
            format!("{TARGET_BARCODE_PREFIX}{}", transfer.target_plate),
            transfer.target_well.to_string(),
            volume.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write one source plate in the same plate-grid format the target layouts
/// use, so the lab can print it as a filling instruction.
pub fn write_source_plate(
    path: &Path,
    plate: &SourcePlate,
    format: &PlateFormat,
) -> Result<(), PlanError> {
    let mut wtr = csv::Writer::from_path(path)?;
    let mut header = vec![String::new()];
    header.extend((1..=format.columns).map(|column| column.to_string()));
    wtr.write_record(&header)?;
    for row in 0..format.rows {
        let mut record = vec![row_letter(row).to_string()];
        for column in 1..=format.columns {
            let well = WellAddress::new(row, column);
            record.push(
                plate
                    .wells
                    .get(&well)
                    .map(|code| code.as_str().to_string())
                    .unwrap_or_default(),
            );
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_target_plate() {
        let dir = tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            "plate1.csv",
            ",1,2,3\nA,\"I1,T1\",,M2\nB,,I2,\n",
        );
        let format = PlateFormat::default();
        let plate = read_target_plate(&path, 1, &format).unwrap();
        assert_eq!(plate.number, 1);
        assert_eq!(plate.name, "plate1");
        assert_eq!(plate.wells.len(), 3);
        let a1 = &plate.wells[&"A1".parse().unwrap()];
        assert_eq!(a1.len(), 2);
        assert_eq!(a1[0].as_str(), "I1");
        assert_eq!(a1[1].as_str(), "T1");
        assert_eq!(plate.wells[&"A3".parse().unwrap()][0].as_str(), "M2");
        assert_eq!(plate.wells[&"B2".parse().unwrap()][0].as_str(), "I2");
    }

    #[test]
    fn test_read_trims_codes_and_skips_blank_lines() {
        let dir = tempdir().unwrap();
        let path = write_fixture(dir.path(), "p.csv", ",1,2\n,,\nA,\" I1 , M2 \",\n");
        let plate = read_target_plate(&path, 1, &PlateFormat::default()).unwrap();
        let a1 = &plate.wells[&"A1".parse().unwrap()];
        assert_eq!(a1[0].as_str(), "I1");
        assert_eq!(a1[1].as_str(), "M2");
    }

    #[test]
    fn test_read_rejects_empty_code() {
        let dir = tempdir().unwrap();
        let path = write_fixture(dir.path(), "p.csv", ",1\nA,\"I1,,M2\"\n");
        let err = read_target_plate(&path, 1, &PlateFormat::default()).unwrap_err();
        assert!(err.to_string().contains("A1"));
    }

    #[test]
    fn test_read_rejects_unknown_row() {
        let dir = tempdir().unwrap();
        let path = write_fixture(dir.path(), "p.csv", ",1\nZ,I1\n");
        let format = PlateFormat {
            rows: 8,
            columns: 12,
        };
        let err = read_target_plate(&path, 1, &format).unwrap_err();
        assert!(err.to_string().contains("row label 'Z'"));
    }

    #[test]
    fn test_read_rejects_duplicate_row() {
        let dir = tempdir().unwrap();
        let path = write_fixture(dir.path(), "p.csv", ",1\nA,I1\nA,I2\n");
        let err = read_target_plate(&path, 1, &PlateFormat::default()).unwrap_err();
        assert!(err.to_string().contains("duplicate row"));
    }

    #[test]
    fn test_read_rejects_column_overflow() {
        let dir = tempdir().unwrap();
        let path = write_fixture(dir.path(), "p.csv", ",1,2\nA,,,I1\n");
        let format = PlateFormat {
            rows: 16,
            columns: 2,
        };
        let err = read_target_plate(&path, 1, &format).unwrap_err();
        assert!(err.to_string().contains("column 3"));
    }

    #[test]
    fn test_write_transfer_list() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("step1.csv");
        let transfers = vec![Transfer {
            source_plate: 1,
            source_well: "A1".parse().unwrap(),
            target_plate: 2,
            target_well: "B7".parse().unwrap(),
            reagent: ReagentCode::parse("I1").unwrap(),
        }];
        write_transfer_list(&path, &transfers, 1).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Source Barcode,Source Well,Destination Barcode,Destination Well,Volume"
        );
        assert_eq!(lines.next().unwrap(), "Source1,A1,Synthesis2,B7,1");
    }

    #[test]
    fn test_write_source_plate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("source_1.csv");
        let mut wells = BTreeMap::new();
        wells.insert("A1".parse().unwrap(), ReagentCode::parse("I1").unwrap());
        wells.insert("B3".parse().unwrap(), ReagentCode::parse("M2").unwrap());
        let plate = SourcePlate {
            number: 1,
            label: "source".to_string(),
            wells,
        };
        let format = PlateFormat {
            rows: 2,
            columns: 3,
        };
        write_source_plate(&path, &plate, &format).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, [",1,2,3", "A,I1,,", "B,,,M2"]);
    }

    #[test]
    fn test_written_layout_reads_back_as_target() {
        // A source layout printed to disk is a valid plate-grid file, so it
        // can be re-imported like any layout.
        let dir = tempdir().unwrap();
        let path = dir.path().join("source_1.csv");
        let mut wells = BTreeMap::new();
        wells.insert("A2".parse().unwrap(), ReagentCode::parse("T7").unwrap());
        let plate = SourcePlate {
            number: 1,
            label: "T".to_string(),
            wells,
        };
        let format = PlateFormat::default();
        write_source_plate(&path, &plate, &format).unwrap();
        let reread = read_target_plate(&path, 1, &format).unwrap();
        assert_eq!(reread.wells.len(), 1);
        assert_eq!(reread.wells[&"A2".parse().unwrap()][0].as_str(), "T7");
    }
}
