//! # Reporting Module / 报告模块
//!
//! This module handles the generation and display of test reports in multiple formats:
//! the live console tree and final summary, a self-contained HTML report and a
//! machine-readable JSON report.
//!
//! 此模块处理多种格式的测试报告生成和显示：
//! 实时控制台树形输出与最终摘要、独立的 HTML 报告以及机器可读的 JSON 报告。

pub mod console;
pub mod html;
pub mod json;

// Re-export common reporting functions
pub use console::print_summary;
pub use html::generate_html_report;
pub use json::write_json_report;
