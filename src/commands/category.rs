//! 分类管理命令
//!
//! 新建、重命名、删除、清空、导入和列出分类

use std::path::PathBuf;

use tracing::info;

use super::catalog_failure;
use crate::storage::load_seed_file;
use crate::AppState;

/// 新建分类（经由输入框）
pub async fn add_category(state: &AppState, name: &str) -> Result<String, String> {
    state.catalog.get_service().set_input(name).await;

    let id = state
        .catalog
        .submit_input()
        .await
        .map_err(catalog_failure)?;
    Ok(format!("已新建分类 #{}", id))
}

/// 重命名分类
pub async fn edit_category(state: &AppState, id: i64, new_name: &str) -> Result<String, String> {
    let existed = state
        .catalog
        .edit(id, new_name)
        .await
        .map_err(catalog_failure)?;
    if !existed {
        return Ok(format!("分类 #{} 不存在，未作修改", id));
    }
    Ok(format!("已重命名分类 #{}", id))
}

/// 删除分类
pub async fn delete_category(state: &AppState, id: i64) -> Result<String, String> {
    let existed = state.catalog.delete(id).await.map_err(catalog_failure)?;
    if !existed {
        return Ok(format!("分类 #{} 不存在，未作修改", id));
    }
    Ok(format!("已删除分类 #{}", id))
}

/// 清空全部分类
pub async fn delete_all_categories(state: &AppState) -> Result<String, String> {
    state.catalog.delete_all().await.map_err(catalog_failure)?;
    Ok("已清空全部分类".to_string())
}

/// 导入种子文件；未指定路径时使用配置中的 seed_file
pub async fn import_seed_file(state: &AppState, path: Option<PathBuf>) -> Result<String, String> {
    let path = match path {
        Some(path) => path,
        None => state
            .settings
            .get()
            .await
            .seed_file
            .map(PathBuf::from)
            .ok_or_else(|| "未配置种子文件".to_string())?,
    };

    info!("导入种子文件: {:?}", path);
    let entries = load_seed_file(&path)
        .await
        .map_err(|e| format!("读取种子文件失败: {}", e))?;

    let report = state
        .catalog
        .import(entries)
        .await
        .map_err(catalog_failure)?;
    Ok(format!(
        "导入完成: 成功 {} 条, 失败 {} 条",
        report.inserted, report.failed
    ))
}

/// 列出当前分类（按 id 倒序）
pub async fn list_categories(state: &AppState) -> Result<String, String> {
    let config = state.settings.get().await;
    let categories = state.catalog.categories();
    if categories.is_empty() {
        return Ok("（没有分类）".to_string());
    }

    let lines: Vec<String> = categories
        .iter()
        .map(|c| format!("{:>5}  {:<20}  {}", c.id, c.name, config.decoration_url(&c.name)))
        .collect();
    Ok(lines.join("\n"))
}
