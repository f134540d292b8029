use super::parser::RawRecord;
use crate::domain::{EMITTED_ROW_COUNT, GAIN_CORRECTED_COLUMNS, ParserResult, Slot};
use crate::modules::serialization::{write_literal, write_value};
use std::io::{self, Write};

/// Column never written to the table (the a0 term of the biquad section).
const SUPPRESSED_COLUMN: usize = 3;
/// Column preceded by a literal zero in the df1 layout `{b0, 0, b1, b2, a1, a2}`.
const ZERO_PADDED_COLUMN: usize = 1;
const ROW_INDENT: &str = "      ";
const BLOCK_OPEN: &str = "    { \n";
const BLOCK_CLOSE: &str = "    },\n";

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct GainPair {
    pub(super) g1: f64,
    pub(super) g2: f64,
}

impl GainPair {
    fn apply(self, value: f64) -> f64 {
        value * self.g1 * self.g2
    }
}

/// Emitted columns of one row, gain-corrected but not yet halved.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CoefficientRow {
    cells: Vec<(usize, f64)>,
}

impl CoefficientRow {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(ROW_INDENT.as_bytes())?;
        for &(column, value) in &self.cells {
            if column == ZERO_PADDED_COLUMN {
                write_literal(writer, "0")?;
            }
            write_value(writer, value / 2.0)?;
        }
        writer.write_all(b"\n")
    }
}

/// One slot's worth of table output: three rows inside a brace pair.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CoefficientBlock {
    slot: Slot,
    gains: GainPair,
    rows: Vec<CoefficientRow>,
}

impl CoefficientBlock {
    pub(super) fn from_record(record: &RawRecord) -> ParserResult<Self> {
        let gains = GainPair {
            g1: record.gain(4)?,
            g2: record.gain(7)?,
        };

        let mut corrected = Vec::with_capacity(GAIN_CORRECTED_COLUMNS);
        for column in 0..GAIN_CORRECTED_COLUMNS {
            corrected.push(gains.apply(record.value(1, column)?));
        }

        let width = record.leading_width();
        let mut rows = Vec::with_capacity(EMITTED_ROW_COUNT);
        for line_number in 1..=EMITTED_ROW_COUNT {
            let mut cells = Vec::with_capacity(width);
            for column in (0..width).filter(|column| *column != SUPPRESSED_COLUMN) {
                let value = match corrected.get(column) {
                    Some(value) if line_number == 1 => *value,
                    _ => record.value(line_number, column)?,
                };
                cells.push((column, value));
            }
            rows.push(CoefficientRow { cells });
        }

        Ok(Self {
            slot: record.slot(),
            gains,
            rows,
        })
    }

    pub(super) fn slot(&self) -> Slot {
        self.slot
    }

    pub(super) fn gains(&self) -> GainPair {
        self.gains
    }

    pub(super) fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub(super) fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(BLOCK_OPEN.as_bytes())?;
        for row in &self.rows {
            row.write_to(writer)?;
        }
        writer.write_all(BLOCK_CLOSE.as_bytes())
    }
}
