// 分类目录 - 主库
//
// SQLite 分类表的增删改查，以及“截取 → 授权 → 保存到图库”的导出流程

// 声明模块
pub mod actors;
pub mod app;
pub mod capture;
pub mod catalog;
pub mod commands;
pub mod dialog;
pub mod domains;
pub mod event_bus;
pub mod export;
pub mod logger;
pub mod models;
pub mod settings;
pub mod storage;
pub mod utils;

use std::path::PathBuf;
use std::sync::Arc;

use domains::{CatalogDomain, ExportDomain};
use event_bus::EventBus;
use settings::SettingsManager;

pub use app::run;

/// 应用状态（按领域分组）
///
/// - 分类领域：分类列表与增删改查
/// - 导出领域：导出视图与导出流水线
/// - 事件总线：用于领域间解耦通信
#[derive(Clone)]
pub struct AppState {
    /// 分类领域管理器
    pub catalog: Arc<CatalogDomain>,
    /// 导出领域管理器
    pub export: Arc<ExportDomain>,
    /// 设置管理器
    pub settings: Arc<SettingsManager>,
    /// 事件总线
    pub event_bus: Arc<EventBus>,
    /// 随应用分发的装饰图片目录
    pub stamps_dir: PathBuf,
}
