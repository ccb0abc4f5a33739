use clap::Args;
use credit_risk::config::AppConfig;
use credit_risk::error::AppError;
use credit_risk::scoring::{
    parse_records, write_csv, BatchServiceError, BatchSummary, RiskLabel, ScoringEngine,
};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Applicant CSV with age, income, loan_amount, credit_history,
    /// employment_length and debt_to_income columns
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Where to write the scored CSV (defaults to stdout)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Number of factors listed in each explanation (2-5)
    #[arg(long, value_parser = clap::value_parser!(u8).range(2..=5))]
    pub(crate) explain_depth: Option<u8>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        input,
        output,
        explain_depth,
    } = args;

    let config = AppConfig::load()?;
    let depth = explain_depth
        .map(usize::from)
        .unwrap_or(config.scoring.explanation_depth);
    let engine = ScoringEngine::new(depth);

    let reader = BufReader::new(File::open(&input)?);
    let records =
        parse_records(reader, config.scoring.max_batch_rows).map_err(BatchServiceError::from)?;
    let scored = engine
        .evaluate_all(records)
        .map_err(BatchServiceError::from)?;
    let summary = BatchSummary::from_scored(&scored);

    match &output {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            write_csv(writer, &scored).map_err(BatchServiceError::from)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_csv(&mut handle, &scored).map_err(BatchServiceError::from)?;
            handle.flush()?;
        }
    }

    render_summary(&input, output.as_deref(), &summary)?;
    Ok(())
}

fn render_summary(input: &Path, output: Option<&Path>, summary: &BatchSummary) -> io::Result<()> {
    // Keep stdout clean for the CSV when no output file was given.
    match output {
        Some(_) => write_summary(&mut io::stdout().lock(), input, output, summary),
        None => write_summary(&mut io::stderr().lock(), input, output, summary),
    }
}

fn write_summary<W: Write>(
    out: &mut W,
    input: &Path,
    output: Option<&Path>,
    summary: &BatchSummary,
) -> io::Result<()> {
    writeln!(out, "Scored {} ({} rows)", input.display(), summary.rows_processed)?;
    for label in [RiskLabel::High, RiskLabel::Medium, RiskLabel::Low] {
        writeln!(
            out,
            "- {} risk: {} ({:.0}%) -> {}",
            label,
            summary.count(label),
            summary.share(label) * 100.0,
            label.decision()
        )?;
    }
    if let Some(path) = output {
        writeln!(out, "Results written to {}", path.display())?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> BatchSummary {
        BatchSummary {
            rows_processed: 4,
            high_risk: 1,
            medium_risk: 2,
            low_risk: 1,
        }
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn summary_lists_tiers_and_destination() {
        let mut buffer = Vec::new();
        write_summary(
            &mut buffer,
            Path::new("applicants.csv"),
            Some(Path::new("scored.csv")),
            &summary(),
        )
        .expect("summary written");

        let text = String::from_utf8(buffer).expect("utf-8");
        assert_eq!(
            text,
            "Scored applicants.csv (4 rows)\n\
- High risk: 1 (25%) -> Reject\n\
- Medium risk: 2 (50%) -> Review\n\
- Low risk: 1 (25%) -> Approve\n\
Results written to scored.csv\n"
        );
    }

    #[test]
    fn summary_write_failures_are_reported() {
        let error = write_summary(
            &mut ClosedPipe,
            Path::new("applicants.csv"),
            None,
            &summary(),
        )
        .expect_err("closed pipe");
        assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
    }
}
