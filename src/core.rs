//! # Core Module / 核心模块
//!
//! This module contains the core functionality of the runner: data models,
//! embedded configuration, case resolution, execution, benchmark comparison,
//! statistics and the suite driver.
//!
//! 此模块包含运行器的核心功能：数据模型、内嵌配置、用例解析、执行、基准比较、统计和套件驱动。

pub mod benchmark;
pub mod case;
pub mod config;
pub mod execution;
pub mod models;
pub mod planner;
pub mod settings;
pub mod stats;
pub mod suite;

// Re-exports
pub use models::{RunId, RunResult, SuiteReport};
pub use planner::SuiteOptions;
pub use suite::Suite;
