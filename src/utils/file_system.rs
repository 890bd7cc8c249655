//! 文件系统操作工具
//!
//! 提供跨平台的应用数据、日志和图库目录定位

use std::path::PathBuf;

const APP_DIR_NAME: &str = "stamp-catalog";

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
}

/// 获取日志目录路径（跨平台）
///
/// - macOS: ~/Library/Logs/stamp-catalog
/// - Windows: %APPDATA%/stamp-catalog/logs
/// - Linux: ~/.local/share/stamp-catalog/logs
pub fn get_log_dir() -> PathBuf {
    if cfg!(target_os = "macos") {
        home_dir().join("Library/Logs").join(APP_DIR_NAME)
    } else if cfg!(target_os = "windows") {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join(APP_DIR_NAME).join("logs")
    } else {
        get_data_dir().join("logs")
    }
}

/// 获取应用数据目录（配置文件、数据库默认位置）
pub fn get_data_dir() -> PathBuf {
    if cfg!(target_os = "macos") {
        home_dir()
            .join("Library/Application Support")
            .join(APP_DIR_NAME)
    } else if cfg!(target_os = "windows") {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join(APP_DIR_NAME)
    } else {
        home_dir().join(".local/share").join(APP_DIR_NAME)
    }
}

/// 获取共享图库目录
///
/// 桌面平台落在用户的 Pictures 目录下
pub fn get_gallery_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        let profile = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(profile).join("Pictures").join(APP_DIR_NAME)
    } else {
        home_dir().join("Pictures").join(APP_DIR_NAME)
    }
}
