//! # Commands Module / 命令模块
//!
//! Top-level commands reachable from the command line.
//! 可从命令行访问的顶层命令。

pub mod run;
