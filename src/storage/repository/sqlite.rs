// SQLite 分类存储实现

use super::{CategoryRepository, StoreResult};
use crate::storage::config::DatabaseConfig;
use crate::storage::models::Category;
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

/// SQLite 分类存储
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// 打开 SQLite 数据库连接（不创建表，表结构由 ensure_schema 负责）
    pub async fn open(config: &DatabaseConfig) -> StoreResult<Self> {
        info!("打开 SQLite 数据库: {}", config.db_path);

        // 确保数据库文件的目录存在
        if let Some(parent) = std::path::Path::new(&config.db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // 添加 ?mode=rwc 参数确保创建数据库
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .idle_timeout(std::time::Duration::from_secs(300))
            .acquire_timeout(config.acquire_timeout())
            .connect(&format!("sqlite:{}?mode=rwc", config.db_path))
            .await?;

        Ok(Self { pool })
    }

    /// 关闭连接池
    pub async fn close(&self) {
        self.pool.close().await;
        info!("SQLite 数据库已关闭");
    }
}

#[async_trait]
impl CategoryRepository for SqliteRepository {
    async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(20)
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        info!("分类表初始化完成");
        Ok(())
    }

    async fn insert(&self, name: &str) -> StoreResult<i64> {
        let result = sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        debug!("插入分类成功: id={}, name={}", id, name);
        Ok(id)
    }

    async fn select_all_descending(&self) -> StoreResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, COALESCE(name, '') AS name FROM categories ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn update(&self, id: i64, new_name: &str) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
            .bind(new_name)
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!("更新分类: id={}, 影响行数={}", id, result.rows_affected());
        Ok(result.rows_affected())
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!("删除分类: id={}, 影响行数={}", id, result.rows_affected());
        Ok(result.rows_affected())
    }

    async fn delete_all(&self) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM categories")
            .execute(&self.pool)
            .await?;

        info!("已清空分类表，共删除 {} 条", result.rows_affected());
        Ok(())
    }
}
