//! 图片导出命令
//!
//! 打开/关闭导出视图，把当前视图导出到图库

use std::path::Path;

use image::DynamicImage;
use tracing::debug;

use super::export_failure;
use crate::export::ExportOutcome;
use crate::AppState;

/// 读取随应用分发的装饰图片（`<stamps_dir>/<name>.png`），不存在时返回 None
fn load_bundled_decoration(stamps_dir: &Path, name: &str) -> Option<DynamicImage> {
    let path = stamps_dir.join(format!("{}.png", name));
    match image::open(&path) {
        Ok(img) => Some(img),
        Err(e) => {
            debug!("没有可用的装饰图片 {:?}: {}", path, e);
            None
        }
    }
}

/// 打开分类的导出视图
pub async fn open_export_view(state: &AppState, id: i64) -> Result<String, String> {
    let category = state
        .catalog
        .find(id)
        .ok_or_else(|| format!("分类 #{} 不在当前列表中", id))?;

    let decoration = load_bundled_decoration(&state.stamps_dir, &category.name);
    state.export.open_view(&category, decoration.as_ref()).await;
    Ok(format!("已打开导出视图: {}", category.name))
}

/// 关闭导出视图
pub async fn close_export_view(state: &AppState) -> Result<String, String> {
    state.export.close_view().await;
    Ok("已关闭导出视图".to_string())
}

/// 导出当前视图
pub async fn export_image(state: &AppState) -> Result<String, String> {
    if !state.export.is_view_open() {
        return Err("请先打开导出视图".to_string());
    }

    match state.export.export_active().await {
        Some(ExportOutcome::Done { gallery_path }) => Ok(format!("已导出: {:?}", gallery_path)),
        Some(ExportOutcome::Failed(failure)) => Err(export_failure(failure)),
        None => Err("请先打开导出视图".to_string()),
    }
}
