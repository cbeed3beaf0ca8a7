//! Reporting boundary
//!
//! Reporters receive each model's results once its batch has settled, then
//! the aggregate once every model is done. Calls are strictly sequential.

use super::summary::{Aggregate, ModelSummary};
use super::verdict::CaseResult;
use crate::config::result_file_stem;
use crate::error::Result;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Sink for run results
pub trait Reporter: Send {
    /// Called once per model, in evaluation order
    fn report_model(&mut self, model: &str, results: &[CaseResult], summary: &ModelSummary)
    -> Result<()>;

    /// Called once after all models
    fn report_aggregate(&mut self, _aggregate: &Aggregate) -> Result<()> {
        Ok(())
    }
}

/// Human-readable progress lines
pub struct ConsoleReporter<W: Write + Send = std::io::Stdout> {
    out: W,
}

impl ConsoleReporter {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// `✅ id: all clear` or `❌ id: reason`
pub fn format_case_line(result: &CaseResult) -> String {
    let marker = if result.passed { "✅" } else { "❌" };
    let reason = result.reason.as_deref().unwrap_or("all clear");
    format!("{} {}: {}", marker, result.id, reason)
}

/// `model: passed/total (pct%)`
pub fn format_summary_line(model: &str, summary: &ModelSummary) -> String {
    format!(
        "{}: {}/{} ({:.2}%)",
        model,
        summary.passed,
        summary.total,
        summary.percentage()
    )
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn report_model(
        &mut self,
        model: &str,
        results: &[CaseResult],
        summary: &ModelSummary,
    ) -> Result<()> {
        writeln!(self.out, "\n=== {} ===", model)?;
        for result in results {
            writeln!(self.out, "{}", format_case_line(result))?;
            if !result.passed
                && let Some(calls) = &result.actual_calls
            {
                writeln!(self.out, "   actual calls: {}", serde_json::to_string(calls)?)?;
            }
        }
        writeln!(self.out, "{}", format_summary_line(model, summary))?;
        self.out.flush()?;
        Ok(())
    }

    fn report_aggregate(&mut self, aggregate: &Aggregate) -> Result<()> {
        if aggregate.len() > 1 {
            writeln!(self.out, "\n=== summary ===")?;
            for (model, summary) in aggregate.iter() {
                writeln!(self.out, "{}", format_summary_line(model, summary))?;
            }
            self.out.flush()?;
        }
        Ok(())
    }
}

/// Writes `<dir>/<model>.json` per model and `<dir>/summary.json`
pub struct JsonFileReporter {
    dir: PathBuf,
    written: HashMap<PathBuf, String>,
}

impl JsonFileReporter {
    pub const SUMMARY_FILE: &'static str = "summary.json";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: HashMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Result file for `model`. Path separators in the name are replaced.
    pub fn model_path(&self, model: &str) -> PathBuf {
        self.dir.join(format!("{}.json", result_file_stem(model)))
    }

    fn write_json<T: serde::Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(path, serde_json::to_string_pretty(value)?)?;
        info!(path = %path.display(), "Wrote results");
        Ok(())
    }
}

impl Reporter for JsonFileReporter {
    fn report_model(
        &mut self,
        model: &str,
        results: &[CaseResult],
        _summary: &ModelSummary,
    ) -> Result<()> {
        let path = self.model_path(model);
        if let Some(previous) = self.written.insert(path.clone(), model.to_string())
            && previous != model
        {
            warn!(
                path = %path.display(),
                previous = %previous,
                model = %model,
                "Result file already written for another model, overwriting"
            );
        }
        self.write_json(&path, results)
    }

    fn report_aggregate(&mut self, aggregate: &Aggregate) -> Result<()> {
        self.write_json(&self.dir.join(Self::SUMMARY_FILE), aggregate)
    }
}
