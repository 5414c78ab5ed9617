//! Spreadsheet rows to draft equipment records
//!
//! Columns are positional:
//!
//! | A | B | C | D | E | F | G | H | I | J |
//! |---|---|---|---|---|---|---|---|---|---|
//! | description | serial | unit | qty | internal company | vendor | rate type | rate value | received | calibration due |
//!
//! The first row is a header. Blank or malformed cells are replaced by
//! defaults instead of failing the batch.
use super::config::ImportConfig;
use super::record::{EquipmentRecord, OwnershipType, RateType};
use super::utils::{self, excel_serial_to_date, month_label, parse_date};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::str::FromStr;

const COL_DESCRIPTION: usize = 0;
const COL_SERIAL: usize = 1;
const COL_UNIT: usize = 2;
const COL_QTY: usize = 3;
const COL_INTERNAL_COMPANY: usize = 4;
const COL_RENTAL_COMPANY: usize = 5;
const COL_RATE_TYPE: usize = 6;
const COL_RATE_VALUE: usize = 7;
const COL_RECEIVED: usize = 8;
const COL_CALIBRATION_DUE: usize = 9;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

impl Cell {
    /// Trimmed, non-empty text content.
    fn text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) => Some(n.to_string()),
            Cell::Text(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            Cell::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }

    fn number(&self) -> Option<f64> {
        let n: Option<f64> = match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().replace(',', "").parse().ok(),
            _ => None,
        };
        n.filter(|n| n.is_finite())
    }

    /// Exact amount for the cell; thousands separators in text are ignored.
    fn amount(&self) -> Option<Decimal> {
        match self {
            Cell::Number(n) => Decimal::from_f64(*n),
            Cell::Text(s) => Decimal::from_str(&s.trim().replace(',', "")).ok(),
            _ => None,
        }
    }

    /// Calendar date for the cell, or `today` when it cannot be read.
    fn date_or(&self, today: NaiveDate) -> NaiveDate {
        let date = match self {
            Cell::Date(d) => Some(*d),
            Cell::Number(serial) => excel_serial_to_date(*serial),
            Cell::Text(s) => parse_date(s),
            Cell::Empty => None,
        };
        date.unwrap_or(today)
    }
}

fn column(row: &[Cell], index: usize) -> &Cell {
    static EMPTY: Cell = Cell::Empty;
    row.get(index).unwrap_or(&EMPTY)
}

/// Whole units, at least one.
fn quantity(cell: &Cell) -> u32 {
    let n = match cell {
        Cell::Text(s) => {
            let digits: String = s.trim().chars().take_while(char::is_ascii_digit).collect();
            digits.parse::<f64>().ok()
        }
        other => other.number(),
    };
    match n.map(f64::trunc) {
        Some(n) if n >= 1.0 && n <= u32::MAX as f64 => n as u32,
        _ => 1,
    }
}

/// Convert spreadsheet rows into records ready to be appended to the register.
///
/// Rows with neither a description nor a serial number are dropped. `sl_no`
/// numbers the kept rows from one; the caller renumbers on insertion.
pub fn parse_rows(
    rows: &[Vec<Cell>],
    ownership: OwnershipType,
    defaults: &ImportConfig,
    today: NaiveDate,
) -> anyhow::Result<Vec<EquipmentRecord>> {
    let mut records = Vec::new();

    for (line, row) in rows.iter().enumerate().skip(1) {
        let description = column(row, COL_DESCRIPTION).text();
        let serial_number = column(row, COL_SERIAL).text();
        if description.is_none() && serial_number.is_none() {
            tracing::debug!(line, "skipping row without description or serial number");
            continue;
        }

        let rate_type = match column(row, COL_RATE_TYPE).text() {
            Some(raw) => raw.parse::<RateType>().unwrap_or_else(|_| {
                tracing::debug!(line, rate_type = %raw, "unknown rate type, using Daily");
                RateType::Daily
            }),
            None => RateType::Daily,
        };
        let rate_value = match column(row, COL_RATE_VALUE).amount() {
            Some(value) if value < Decimal::ZERO => {
                tracing::debug!(line, rate_value = %value, "negative rate value, using 0");
                Decimal::ZERO
            }
            Some(value) => value,
            None => {
                if !matches!(column(row, COL_RATE_VALUE), Cell::Empty) {
                    tracing::debug!(line, "unreadable rate value, using 0");
                }
                Decimal::ZERO
            }
        };

        let received = column(row, COL_RECEIVED).date_or(today);
        let calibration_due = column(row, COL_CALIBRATION_DUE).date_or(today);

        let record = EquipmentRecord::new()
            .set_id(&utils::new_uuid_to_bech32("xl_")?)
            .set_sl_no(records.len() as u32 + 1)
            .set_description(&description.unwrap_or_else(|| defaults.default_description.clone()))
            .set_serial_number(
                &serial_number.unwrap_or_else(|| format!("TBD-{}", utils::short_code())),
            )
            .set_unit(
                &column(row, COL_UNIT)
                    .text()
                    .unwrap_or_else(|| defaults.default_unit.clone()),
                quantity(column(row, COL_QTY)),
            )
            .set_internal_company(
                &column(row, COL_INTERNAL_COMPANY)
                    .text()
                    .unwrap_or_else(|| defaults.default_internal_company.clone()),
            )
            .set_rental_company(
                &column(row, COL_RENTAL_COMPANY)
                    .text()
                    .unwrap_or_else(|| defaults.default_rental_company.clone()),
            )
            .set_ownership(ownership)
            .set_rate(rate_type, rate_value)
            .set_received(&received.format("%Y-%m-%d").to_string())
            .set_calibration_due(&calibration_due.format("%Y-%m-%d").to_string())
            .set_claim_month(&month_label(received))
            .set_remarks(&defaults.remarks);

        records.push(record);
    }

    tracing::info!(rows = rows.len().saturating_sub(1), imported = records.len(), "rows imported");
    Ok(records)
}

/// Split pasted delimited text (TSV from a sheet, or CSV) into text cells.
///
/// Double-quoted fields may contain the delimiter; `""` inside quotes is a
/// literal quote. Blank lines are ignored.
pub fn rows_from_delimited(text: &str, delimiter: char) -> Vec<Vec<Cell>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| split_fields(line, delimiter))
        .collect()
}

fn split_fields(line: &str, delimiter: char) -> Vec<Cell> {
    let mut cells = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            c if c == delimiter && !quoted => cells.push(to_cell(std::mem::take(&mut field))),
            c => field.push(c),
        }
    }
    cells.push(to_cell(field));
    cells
}

fn to_cell(field: String) -> Cell {
    if field.trim().is_empty() {
        Cell::Empty
    } else {
        Cell::Text(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_falls_back_to_one() {
        assert_eq!(quantity(&Cell::Number(3.0)), 3);
        assert_eq!(quantity(&Cell::Text("2 pcs".into())), 2);
        assert_eq!(quantity(&Cell::Text("0".into())), 1);
        assert_eq!(quantity(&Cell::Number(-4.0)), 1);
        assert_eq!(quantity(&Cell::Empty), 1);
    }

    #[test]
    fn amounts_are_exact() {
        assert_eq!(Cell::Text(" 1,200.50 ".into()).amount(), Some(Decimal::new(120050, 2)));
        assert_eq!(Cell::Number(0.1).amount(), Some(Decimal::new(1, 1)));
        assert_eq!(Cell::Text("n/a".into()).amount(), None);
        assert_eq!(Cell::Number(f64::NAN).amount(), None);
    }

    #[test]
    fn splits_quoted_fields() {
        let rows = rows_from_delimited("a,\"b, c\",,\"say \"\"hi\"\"\"\n\n", ',');
        assert_eq!(
            rows,
            vec![vec![
                Cell::Text("a".into()),
                Cell::Text("b, c".into()),
                Cell::Empty,
                Cell::Text("say \"hi\"".into()),
            ]]
        );
    }
}
