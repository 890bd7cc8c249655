// 数据模型模块 - 定义配置和平台相关的数据结构

use serde::{Deserialize, Serialize};

/// 默认的装饰图片地址模板
pub const DEFAULT_DECORATION_URL_TEMPLATE: &str = "https://res.caerux.com/stamp/{name}";

/// 宿主平台
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostPlatform {
    Android,
    Ios,
    Desktop,
}

impl HostPlatform {
    /// 根据编译目标推断当前平台
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            Self::Android
        } else if cfg!(target_os = "ios") {
            Self::Ios
        } else {
            Self::Desktop
        }
    }

    /// 写入共享存储前是否需要显式授权
    pub fn requires_storage_permission(&self) -> bool {
        matches!(self, Self::Android)
    }
}

impl Default for HostPlatform {
    fn default() -> Self {
        Self::current()
    }
}

/// 导出后导出视图的可见性策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PostExportVisibility {
    /// 只要尝试了写入图库就关闭视图（无论成败）
    #[default]
    CloseOnAttempt,
    /// 只有保存成功才关闭视图，失败时保持打开
    RemainOpen,
}

/// 确认对话框按钮布局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmButtons {
    #[default]
    OkOnly,
    OkCancel,
}

/// 导出设置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default)]
    pub post_export_visibility: PostExportVisibility,
    #[serde(default)]
    pub confirm_buttons: ConfirmButtons,
}

/// 应用配置（部分更新）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 数据库文件路径
    pub database_path: Option<String>,
    /// 快照产物目录
    pub artifacts_dir: Option<String>,
    /// 图库目录
    pub gallery_dir: Option<String>,
    /// 宿主平台
    pub host_platform: Option<HostPlatform>,
    /// 导出设置
    pub export: Option<ExportSettings>,
    /// 装饰图片地址模板
    pub decoration_url_template: Option<String>,
    /// 种子文件路径
    pub seed_file: Option<String>,
    /// 是否串行化“修改 + 刷新”
    pub serialize_mutations: Option<bool>,
    /// 日志级别
    pub log_level: Option<String>,
}

/// 持久化的应用配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedAppConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: String,
    #[serde(default = "default_gallery_dir")]
    pub gallery_dir: String,
    #[serde(default)]
    pub host_platform: HostPlatform,
    #[serde(default)]
    pub export: ExportSettings,
    #[serde(default = "default_decoration_url_template")]
    pub decoration_url_template: String,
    #[serde(default)]
    pub seed_file: Option<String>,
    #[serde(default)]
    pub serialize_mutations: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_database_path() -> String {
    "data/rn_sqlite.db".to_string()
}

fn default_artifacts_dir() -> String {
    "data/snapshots".to_string()
}

fn default_gallery_dir() -> String {
    crate::utils::get_gallery_dir()
        .to_string_lossy()
        .to_string()
}

fn default_decoration_url_template() -> String {
    DEFAULT_DECORATION_URL_TEMPLATE.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PersistedAppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            artifacts_dir: default_artifacts_dir(),
            gallery_dir: default_gallery_dir(),
            host_platform: HostPlatform::current(),
            export: ExportSettings::default(),
            decoration_url_template: default_decoration_url_template(),
            seed_file: None,
            serialize_mutations: false,
            log_level: default_log_level(),
        }
    }
}

impl PersistedAppConfig {
    /// 展开装饰图片地址
    pub fn decoration_url(&self, name: &str) -> String {
        self.decoration_url_template.replace("{name}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoration_url_uses_template() {
        let config = PersistedAppConfig::default();
        assert_eq!(
            config.decoration_url("penny-black"),
            "https://res.caerux.com/stamp/penny-black"
        );
    }

    #[test]
    fn test_only_android_requires_storage_permission() {
        assert!(HostPlatform::Android.requires_storage_permission());
        assert!(!HostPlatform::Ios.requires_storage_permission());
        assert!(!HostPlatform::Desktop.requires_storage_permission());
    }

    #[test]
    fn test_partial_config_file_fills_defaults() {
        let config: PersistedAppConfig = serde_json::from_str(
            r#"{"host_platform":"android","export":{"post_export_visibility":"remain_open"}}"#,
        )
        .unwrap();

        assert_eq!(config.host_platform, HostPlatform::Android);
        assert_eq!(
            config.export.post_export_visibility,
            PostExportVisibility::RemainOpen
        );
        assert_eq!(config.export.confirm_buttons, ConfirmButtons::OkOnly);
        assert_eq!(config.log_level, "info");
    }
}
