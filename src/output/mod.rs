//! JSON report persistence

use crate::error::Result;
use crate::logging::Logger;
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};

const QUERY_DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
const FILE_DATE_FORMAT: &str = "%d-%m-%Y_%H-%Mhs";

/// Writes `persons_total_report_*.json` files into one directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
    output: Logger,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>, output: Logger) -> Self {
        Self {
            dir: dir.into(),
            output,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a report stamped with the current local time
    pub fn write<T: Serialize>(&self, total_checked: usize, title: &str, data: &T) -> Result<PathBuf> {
        self.write_at(total_checked, title, data, chrono::Local::now().naive_local())
    }

    /// Write a report stamped with `now`
    pub fn write_at<T: Serialize>(
        &self,
        total_checked: usize,
        title: &str,
        data: &T,
        now: NaiveDateTime,
    ) -> Result<PathBuf> {
        let report = build_report(total_checked, title, serde_json::to_value(data)?, now);
        let path = self.dir.join(format!(
            "persons_total_report_{}_{}.json",
            title,
            now.format(FILE_DATE_FORMAT)
        ));

        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        report.serialize(&mut serializer)?;

        if let Err(e) = std::fs::write(&path, &buffer) {
            self.output.error(&format!("Error saving report: {}", e));
            return Err(e.into());
        }
        self.output
            .success(&format!("Final report saved in JSON file: {}", path.display()));
        Ok(path)
    }
}

/// `{"total_persons_checked", "<title>": {"total", "nits_list"}, "query_date"}` in that order
pub fn build_report(total_checked: usize, title: &str, data: Value, now: NaiveDateTime) -> Value {
    let total = match &data {
        Value::Object(map) => map.len(),
        Value::Array(items) => items.len(),
        Value::Null => 0,
        _ => 1,
    };

    let mut report = Map::new();
    report.insert("total_persons_checked".to_string(), json!(total_checked));
    report.insert(title.to_string(), json!({ "total": total, "nits_list": data }));
    report.insert(
        "query_date".to_string(),
        json!(now.format(QUERY_DATE_FORMAT).to_string()),
    );
    Value::Object(report)
}
