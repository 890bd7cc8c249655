// Repository 抽象层 - 定义分类存储操作接口

pub mod sqlite;

use super::models::Category;
use async_trait::async_trait;

/// 存储引擎错误
///
/// 只记录日志，不向用户展示，也不重试
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("数据库错误: {0}")]
    Engine(#[from] sqlx::Error),
    #[error("数据库目录不可用: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// 分类存储接口 - 所有存储实现必须实现此 trait
///
/// 每个操作都是单条语句，单独原子执行；没有乐观锁字段
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// 创建表结构（幂等，不会破坏已有数据）
    async fn ensure_schema(&self) -> StoreResult<()>;

    /// 插入分类，返回新分配的 id
    async fn insert(&self, name: &str) -> StoreResult<i64>;

    /// 按 id 倒序读取全部分类
    async fn select_all_descending(&self) -> StoreResult<Vec<Category>>;

    /// 重命名分类，返回影响行数；id 不存在时无操作并返回 0
    async fn update(&self, id: i64, new_name: &str) -> StoreResult<u64>;

    /// 删除单个分类，返回影响行数；id 不存在时无操作并返回 0
    async fn delete_by_id(&self, id: i64) -> StoreResult<u64>;

    /// 清空分类表
    async fn delete_all(&self) -> StoreResult<()>;
}
