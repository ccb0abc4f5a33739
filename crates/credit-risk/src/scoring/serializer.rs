use super::domain::ScoredApplicant;
use std::io::Write;

/// Columns appended after the uploaded ones.
pub const RESULT_COLUMNS: [&str; 4] = ["score", "risk_label", "decision", "explanation"];

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("no scored records to serialize")]
    EmptyDataset,
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV output: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV output is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Renders scored applicants as CSV text.
pub fn serialize(scored: &[ScoredApplicant]) -> Result<String, SerializeError> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, scored)?;
    Ok(String::from_utf8(buffer)?)
}

/// Streams scored applicants as CSV. The header is the first record's column
/// set; later rows lacking a column get an empty cell.
pub fn write_csv<W: Write>(writer: W, scored: &[ScoredApplicant]) -> Result<(), SerializeError> {
    let first = scored.first().ok_or(SerializeError::EmptyDataset)?;
    let input_columns = first
        .record
        .columns
        .iter()
        .map(|(name, _)| name.as_str())
        .filter(|name| !RESULT_COLUMNS.contains(name))
        .collect::<Vec<_>>();

    let mut csv_writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);

    csv_writer.write_record(input_columns.iter().copied().chain(RESULT_COLUMNS))?;

    for applicant in scored {
        let score = format!("{:.4}", applicant.score);
        let explanation = applicant.explanation_summary();
        let mut row = input_columns
            .iter()
            .map(|column| applicant.record.value(column).unwrap_or_default())
            .collect::<Vec<_>>();
        row.extend([
            score.as_str(),
            applicant.risk_label.label(),
            applicant.decision.label(),
            explanation.as_str(),
        ]);
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}
