// 数据模型定义 - 数据库实体结构

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 分类数据结构
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// 种子文件条目（Stamp.json 中的单个对象）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedEntry {
    pub image_file: String,
}

/// 种子导入结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// 成功插入的条目数
    pub inserted: usize,
    /// 插入失败的条目数
    pub failed: usize,
}

/// 读取种子文件，返回按文件顺序排列的名称序列
pub async fn load_seed_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let bytes = tokio::fs::read(path).await?;
    let entries: Vec<SeedEntry> = serde_json::from_slice(&bytes)?;
    Ok(entries.into_iter().map(|e| e.image_file).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_seed_file_keeps_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Stamp.json");
        tokio::fs::write(
            &path,
            r#"[{"image_file":"penny-black"},{"image_file":"blue-mauritius","extra":1}]"#,
        )
        .await
        .unwrap();

        let names = load_seed_file(&path).await.unwrap();
        assert_eq!(names, vec!["penny-black", "blue-mauritius"]);
    }

    #[tokio::test]
    async fn test_load_seed_file_rejects_bad_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Stamp.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        assert!(load_seed_file(&path).await.is_err());
    }
}
