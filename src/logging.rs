// ==========================================
// 日志系统初始化
// ==========================================
// 基于 tracing / tracing-subscriber;
// 本 crate 是内嵌库,宿主进程可能已注册
// 全局 subscriber,初始化必须幂等
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 默认过滤指令: 外部 crate 保持 warn,本 crate 输出 info
const DEFAULT_DIRECTIVES: &str = "warn,rfcv_transform=info";

/// 初始化日志系统
///
/// 宿主已注册全局 subscriber 时静默让位
///
/// # 环境变量
/// - RUST_LOG: 覆盖默认过滤器
///   例如: RUST_LOG=rfcv_transform=trace
///
/// # 返回
/// 本次调用是否实际安装了 subscriber
pub fn init() -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init()
        .is_ok()
}

/// 初始化测试环境的日志系统
///
/// 本 crate 全量 debug 输出并绑定测试捕获 writer,可重复调用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("rfcv_transform=debug"))
        .with_test_writer()
        .try_init();
}
