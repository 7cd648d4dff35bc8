//! # JSON Reporting Module / JSON 报告模块
//!
//! Serializes the whole suite report for CI dashboards and other consumers.
//! 为 CI 仪表盘和其他使用方序列化整个套件报告。

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::core::models::SuiteReport;

/// Writes `report` as pretty-printed JSON to `output_path`.
pub fn write_json_report(report: &SuiteReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize suite report")?;
    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report: {}", output_path.display()))
}
