//! # Sim Test Runner Library / 仿真测试运行器库
//!
//! This library provides the core functionality for the `sim-test-runner` tool,
//! a regression test orchestrator for scientific simulation binaries. Every test
//! directory carries an input file whose `#@`-prefixed lines describe one or more
//! cases; each case is resolved into a command line, executed under a timeout,
//! optionally verified by an external checker and folded into suite statistics.
//!
//! 此库为 `sim-test-runner` 工具提供核心功能，
//! 这是一个面向科学仿真程序的回归测试编排器。每个测试目录包含一个输入文件，
//! 其中以 `#@` 开头的行描述一个或多个用例；每个用例被解析为命令行，在超时限制下执行，
//! 可选地由外部检查器验证，并汇总到套件统计中。
//!
//! ## Modules / 模块
//!
//! - `core` - Data models, configuration extraction, case resolution and the suite driver
//! - `infra` - Process spawning, file system helpers and host identity
//! - `reporting` - Console, HTML and JSON reports
//! - `cli` - Command-line interface
//!
//! - `core` - 数据模型、配置提取、用例解析和套件驱动
//! - `infra` - 进程派生、文件系统辅助功能和主机标识
//! - `reporting` - 控制台、HTML 和 JSON 报告
//! - `cli` - 命令行接口

pub mod cli;
pub mod commands;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use core::models;
pub use core::config;
pub use core::suite;

/// Picks the display language from the operating system locale.
/// 根据操作系统的区域设置选择显示语言。
pub fn init() {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    set_language(&locale);
}

/// Sets the active language, falling back to the bare language code and then to "en".
/// 设置当前语言，依次回退到语言代码和 "en"。
pub fn set_language(locale: &str) {
    let available_locales = rust_i18n::available_locales!();

    let lang = if available_locales.contains(&locale) {
        locale
    } else {
        locale
            .split('-')
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
    };

    rust_i18n::set_locale(lang);
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
