use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Letter label for a 0-based row index. Plates never exceed 26 rows.
pub fn row_letter(row: u8) -> char {
    (b'A' + row) as char
}

/// Position of a well on a plate, e.g. `B7`.
///
/// Ordering is row-major (row first, then column), so ordered collections
/// keyed by `WellAddress` iterate in the order wells are read off a plate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WellAddress {
    row: u8,
    column: u16,
}

impl WellAddress {
    /// `row` is 0-based, `column` is 1-based, matching plate labeling.
    pub fn new(row: u8, column: u16) -> Self {
        Self { row, column }
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn row_letter(&self) -> char {
        row_letter(self.row)
    }

    pub fn column(&self) -> u16 {
        self.column
    }
}

impl fmt::Display for WellAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.row_letter(), self.column)
    }
}

impl FromStr for WellAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let letter = chars
            .next()
            .ok_or_else(|| "Empty well address".to_string())?;
        if !letter.is_ascii_uppercase() {
            return Err(format!("Well address '{s}' does not start with a row letter"));
        }
        let column: u16 = chars
            .as_str()
            .parse()
            .map_err(|_| format!("Well address '{s}' has no valid column number"))?;
        if column == 0 {
            return Err(format!("Well address '{s}' uses column 0, columns are 1-based"));
        }
        Ok(Self {
            row: letter as u8 - b'A',
            column,
        })
    }
}

impl TryFrom<String> for WellAddress {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WellAddress> for String {
    fn from(well: WellAddress) -> Self {
        well.to_string()
    }
}

/// Row/column extent of a plate. The default is the 384-well format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateFormat {
    pub rows: u8,
    pub columns: u16,
}

impl Default for PlateFormat {
    fn default() -> Self {
        Self {
            rows: 16,
            columns: 24,
        }
    }
}

impl PlateFormat {
    pub fn well_count(&self) -> usize {
        self.rows as usize * self.columns as usize
    }

    pub fn contains(&self, well: &WellAddress) -> bool {
        well.row < self.rows && well.column >= 1 && well.column <= self.columns
    }

    /// 0-based row index for a letter label, if the plate has that row.
    pub fn row_index(&self, letter: char) -> Option<u8> {
        if !letter.is_ascii_uppercase() {
            return None;
        }
        let row = letter as u8 - b'A';
        (row < self.rows).then_some(row)
    }

    /// All wells of the plate, row by row, left to right.
    pub fn wells_row_major(&self) -> impl Iterator<Item = WellAddress> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| (1..=columns).map(move |column| WellAddress::new(row, column)))
    }

    /// Wells of a contiguous row band, in row-major order.
    pub fn band_wells(&self, rows: Range<u8>) -> impl Iterator<Item = WellAddress> {
        let columns = self.columns;
        rows.flat_map(move |row| (1..=columns).map(move |column| WellAddress::new(row, column)))
    }

    /// Split the rows into `count` contiguous bands. Boundaries sit at
    /// `(i * rows) / count`, so the last band absorbs any remainder.
    pub fn row_bands(&self, count: usize) -> Vec<Range<u8>> {
        let rows = self.rows as usize;
        (0..count)
            .map(|i| {
                let start = (i * rows / count) as u8;
                let end = ((i + 1) * rows / count) as u8;
                start..end
            })
            .collect()
    }
}
