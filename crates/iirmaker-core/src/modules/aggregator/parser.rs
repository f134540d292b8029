use crate::domain::{GAIN_CORRECTED_COLUMNS, IirError, ParserResult, RECORD_LINE_COUNT, Slot};

/// Line-oriented view of one coefficient file.
///
/// Tokens stay as text until something consumes them, so columns that are
/// never emitted (column 3, lines 5 and 6) are not required to be numeric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RawRecord {
    slot: Slot,
    lines: Vec<Vec<String>>,
}

impl RawRecord {
    pub(super) fn tokenize(slot: Slot, source: &str) -> Self {
        let mut lines: Vec<Vec<String>> = universal_lines(source)
            .take(RECORD_LINE_COUNT)
            .map(|line| line.split_whitespace().map(str::to_string).collect())
            .collect();
        // Missing trailing lines read as empty rows.
        lines.resize_with(RECORD_LINE_COUNT, Vec::new);
        Self { slot, lines }
    }

    pub(super) fn slot(&self) -> Slot {
        self.slot
    }

    /// Width of line 1; every emitted row is walked to this many columns.
    pub(super) fn leading_width(&self) -> usize {
        self.lines[0].len()
    }

    /// First token of the 1-based `line_number`, parsed as a gain factor.
    pub(super) fn gain(&self, line_number: usize) -> ParserResult<f64> {
        let token = self.lines[line_number - 1].first().ok_or_else(|| {
            IirError::input_validation(
                "INPUT.RECORD_SHORT",
                format!(
                    "slot {} ('{}'): line {} has no gain token; a record needs {} lines",
                    self.slot,
                    self.slot.input_file_name(),
                    line_number,
                    RECORD_LINE_COUNT
                ),
            )
        })?;
        self.parse_token(line_number, 0, token)
    }

    pub(super) fn value(&self, line_number: usize, column: usize) -> ParserResult<f64> {
        let token = self.lines[line_number - 1].get(column).ok_or_else(|| {
            let (placeholder, detail) = if line_number == 1 {
                (
                    "INPUT.RECORD_SHORT",
                    format!("needs at least {} columns", GAIN_CORRECTED_COLUMNS),
                )
            } else {
                (
                    "INPUT.RECORD_ROW_WIDTH",
                    format!("must be as wide as line 1 ({} columns)", self.leading_width()),
                )
            };
            IirError::input_validation(
                placeholder,
                format!(
                    "slot {} ('{}'): line {} has no column {}; it {}",
                    self.slot,
                    self.slot.input_file_name(),
                    line_number,
                    column,
                    detail
                ),
            )
        })?;
        self.parse_token(line_number, column, token)
    }

    fn parse_token(&self, line_number: usize, column: usize, token: &str) -> ParserResult<f64> {
        token.parse::<f64>().map_err(|_| {
            IirError::input_validation(
                "INPUT.RECORD_TOKEN",
                format!(
                    "slot {} ('{}') line {} column {}: '{}' is not a number",
                    self.slot,
                    self.slot.input_file_name(),
                    line_number,
                    column,
                    token
                ),
            )
        })
    }
}

/// Splits on `\n`, `\r\n` and a lone `\r`, so classic Mac line endings
/// still yield one entry per line.
fn universal_lines(source: &str) -> impl Iterator<Item = &str> {
    source
        .split('\n')
        .flat_map(|line| line.strip_suffix('\r').unwrap_or(line).split('\r'))
}
