//! # Host Identity Module / 主机标识模块
//!
//! Resolves the local host name, which serves both as the default benchmark
//! environment tag and as part of the per-invocation run identifier.
//!
//! 解析本地主机名，它既作为默认的基准环境标签，也是每次调用的运行标识符的一部分。

use std::env;

const FALLBACK_HOSTNAME: &str = "localhost";

/// Returns the name of the local host.
///
/// Falls back to the `HOSTNAME`/`COMPUTERNAME` environment variables and finally
/// to `localhost` when the system name is empty or not valid Unicode.
///
/// 返回本地主机名。
/// 当系统主机名为空或不是有效 Unicode 时，回退到 `HOSTNAME`/`COMPUTERNAME` 环境变量，最后回退到 `localhost`。
pub fn hostname() -> String {
    let usable = |name: String| {
        let name = name.trim().to_string();
        (!name.is_empty()).then_some(name)
    };
    gethostname::gethostname()
        .into_string()
        .ok()
        .and_then(usable)
        .or_else(|| env::var("HOSTNAME").ok().and_then(usable))
        .or_else(|| env::var("COMPUTERNAME").ok().and_then(usable))
        .unwrap_or_else(|| FALLBACK_HOSTNAME.to_string())
}
