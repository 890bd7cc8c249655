// 日志系统 - 同时输出到控制台和按天轮转的日志文件

use std::path::Path;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// 解析配置中的日志级别，无法识别时使用 INFO
pub fn parse_level(level: &str) -> tracing::Level {
    level.trim().parse().unwrap_or_else(|_| {
        eprintln!("无法识别的日志级别 {:?}，使用 info", level);
        tracing::Level::INFO
    })
}

/// 初始化日志系统
///
/// 返回的 guard 需要持有到进程退出，保证文件日志刷盘
pub fn init(log_dir: &Path, level: &str) -> Result<WorkerGuard> {
    // 创建日志目录
    std::fs::create_dir_all(log_dir)?;

    // 配置日志输出到文件（每天轮转）
    let file_appender = tracing_appender::rolling::daily(log_dir, "app.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // 同时输出到控制台和文件
    let writer = std::io::stdout.and(non_blocking);

    // 使用本地时区
    let timer = LocalTime::new(time::format_description::parse(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]",
    )?);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(parse_level(level))
        .with_writer(writer)
        .with_timer(timer)
        .with_ansi(cfg!(debug_assertions)) // release 版本不使用颜色代码
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    eprintln!("日志文件位置: {:?}", log_dir);
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), tracing::Level::DEBUG);
        assert_eq!(parse_level(" WARN "), tracing::Level::WARN);
        assert_eq!(parse_level("chatty"), tracing::Level::INFO);
    }
}
