// 分类领域管理器
//
// 负责分类服务以及可选的串行化队列；配置了 serialize_mutations 时，
// 所有修改经由 CategoryQueueActor 执行

use std::sync::Arc;

use crate::actors::{CategoryQueueActor, CategoryQueueHandle};
use crate::catalog::{CategoryError, CategoryService};
use crate::storage::{Category, ImportReport};

/// 分类领域操作失败
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error(transparent)]
    Queue(#[from] crate::actors::QueueClosed),
}

/// 分类领域管理器
#[derive(Clone)]
pub struct CatalogDomain {
    service: Arc<CategoryService>,
    queue: Option<CategoryQueueHandle>,
}

impl CatalogDomain {
    /// 直接调用服务（默认的最终一致模式）
    pub fn new(service: Arc<CategoryService>) -> Self {
        Self {
            service,
            queue: None,
        }
    }

    /// 启动单工作者队列并经由它执行修改
    ///
    /// 需要在 tokio 运行时内调用
    pub fn serialized(service: Arc<CategoryService>) -> Self {
        let (actor, handle) = CategoryQueueActor::new(service.clone());
        tokio::spawn(async move {
            actor.run().await;
        });
        Self {
            service,
            queue: Some(handle),
        }
    }

    /// 获取分类服务
    pub fn get_service(&self) -> &Arc<CategoryService> {
        &self.service
    }

    pub fn is_serialized(&self) -> bool {
        self.queue.is_some()
    }

    pub async fn add(&self, name: &str) -> Result<i64, CatalogError> {
        match &self.queue {
            Some(queue) => Ok(queue.add(name).await??),
            None => Ok(self.service.add_category(name).await?),
        }
    }

    /// 以输入框内容新建分类
    pub async fn submit_input(&self) -> Result<i64, CatalogError> {
        match &self.queue {
            Some(queue) => {
                let name = self.service.input().await;
                Ok(queue.add(name).await??)
            }
            None => Ok(self.service.submit_input().await?),
        }
    }

    /// 重命名分类，返回分类是否存在
    pub async fn edit(&self, id: i64, new_name: &str) -> Result<bool, CatalogError> {
        match &self.queue {
            Some(queue) => Ok(queue.edit(id, new_name).await??),
            None => Ok(self.service.edit_category(id, new_name).await?),
        }
    }

    /// 删除分类，返回分类是否存在
    pub async fn delete(&self, id: i64) -> Result<bool, CatalogError> {
        match &self.queue {
            Some(queue) => Ok(queue.delete(id).await??),
            None => Ok(self.service.delete_category(id).await?),
        }
    }

    pub async fn delete_all(&self) -> Result<(), CatalogError> {
        match &self.queue {
            Some(queue) => Ok(queue.delete_all().await??),
            None => Ok(self.service.delete_all_categories().await?),
        }
    }

    pub async fn import(&self, entries: Vec<String>) -> Result<ImportReport, CatalogError> {
        match &self.queue {
            Some(queue) => Ok(queue.import(entries).await?),
            None => Ok(self.service.import_seed_data(entries).await),
        }
    }

    pub async fn refresh(&self) -> Result<Vec<Category>, CatalogError> {
        match &self.queue {
            Some(queue) => Ok(queue.refresh().await?.map_err(CategoryError::from)?),
            None => Ok(self.service.refresh().await.map_err(CategoryError::from)?),
        }
    }

    /// 当前可见列表
    pub fn categories(&self) -> Vec<Category> {
        self.service.categories()
    }

    /// 按 id 查找当前列表中的分类
    pub fn find(&self, id: i64) -> Option<Category> {
        self.service.categories().into_iter().find(|c| c.id == id)
    }
}
