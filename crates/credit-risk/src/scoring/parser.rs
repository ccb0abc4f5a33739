use super::domain::{ApplicantFeatures, ApplicantRecord, REQUIRED_COLUMNS};
use std::io::Read;

/// Reasons an applicant batch is rejected before scoring. Every variant
/// rejects the whole batch.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },
    #[error("row {row}: column '{column}' must be a finite number (got '{value}')")]
    Type {
        row: usize,
        column: String,
        value: String,
    },
    #[error("row {row}: income must be greater than zero to compute loan-to-income (got {income})")]
    Division { row: usize, income: f64 },
    #[error("row {row}: {column} {constraint} (got {value})")]
    Validation {
        row: usize,
        column: &'static str,
        constraint: &'static str,
        value: f64,
    },
    #[error("batch exceeds the limit of {limit} rows")]
    BatchTooLarge { limit: usize },
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
}

impl ParseError {
    /// Columns implicated by the failure, for structured error payloads.
    pub fn columns(&self) -> Vec<String> {
        match self {
            ParseError::Schema { missing } => missing.clone(),
            ParseError::Type { column, .. } => vec![column.clone()],
            ParseError::Division { .. } => vec!["income".to_string()],
            ParseError::Validation { column, .. } => vec![column.to_string()],
            ParseError::BatchTooLarge { .. } | ParseError::Csv(_) => Vec::new(),
        }
    }
}

/// Reads a CSV batch, checking the header before any row and stopping at the
/// first invalid row.
pub fn parse_records<R: Read>(reader: R, limit: usize) -> Result<Vec<ApplicantRecord>, ParseError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect::<Vec<_>>();
    let positions = required_positions(&headers)?;

    let mut records = Vec::new();
    for (index, result) in csv_reader.records().enumerate() {
        if index >= limit {
            return Err(ParseError::BatchTooLarge { limit });
        }
        let row = result?;
        let values = row.iter().map(str::to_string).collect::<Vec<_>>();
        records.push(build_record(index + 1, &headers, &positions, values)?);
    }

    Ok(records)
}

/// Range checks shared by CSV intake and JSON prediction requests.
pub fn validate_features(row: usize, features: &ApplicantFeatures) -> Result<(), ParseError> {
    if features.income <= 0.0 {
        return Err(ParseError::Division {
            row,
            income: features.income,
        });
    }

    if !(0.0..=1.0).contains(&features.debt_to_income) {
        return Err(ParseError::Validation {
            row,
            column: "debt_to_income",
            constraint: "must be a fraction between 0 and 1",
            value: features.debt_to_income,
        });
    }

    if features.loan_amount < 0.0 {
        return Err(ParseError::Validation {
            row,
            column: "loan_amount",
            constraint: "must not be negative",
            value: features.loan_amount,
        });
    }

    if features.employment_length < 0.0 {
        return Err(ParseError::Validation {
            row,
            column: "employment_length",
            constraint: "must not be negative",
            value: features.employment_length,
        });
    }

    Ok(())
}

fn normalize_header(value: &str) -> String {
    value.replace(['\u{feff}', '\u{200b}'], "").trim().to_string()
}

fn required_positions(headers: &[String]) -> Result<[usize; 6], ParseError> {
    let mut positions = [0usize; 6];
    let mut missing = Vec::new();

    for (slot, column) in REQUIRED_COLUMNS.iter().enumerate() {
        match headers.iter().position(|header| header == column) {
            Some(position) => positions[slot] = position,
            None => missing.push(column.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(positions)
    } else {
        Err(ParseError::Schema { missing })
    }
}

fn build_record(
    row: usize,
    headers: &[String],
    positions: &[usize; 6],
    values: Vec<String>,
) -> Result<ApplicantRecord, ParseError> {
    let mut numbers = [0f64; 6];
    for (slot, column) in REQUIRED_COLUMNS.iter().enumerate() {
        let raw = values
            .get(positions[slot])
            .map(String::as_str)
            .unwrap_or_default();
        numbers[slot] = parse_number(raw).ok_or_else(|| ParseError::Type {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        })?;
    }

    let [age, income, loan_amount, credit_history, employment_length, debt_to_income] = numbers;
    let features = ApplicantFeatures {
        age,
        income,
        loan_amount,
        credit_history,
        employment_length,
        debt_to_income,
    };
    validate_features(row, &features)?;

    let columns = headers.iter().cloned().zip(values).collect();

    Ok(ApplicantRecord {
        row,
        features,
        columns,
    })
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[cfg(test)]
pub(crate) fn parse_number_for_tests(raw: &str) -> Option<f64> {
    parse_number(raw)
}
