// Category Queue Actor - 串行化“修改 + 刷新”
//
// 单个工作者依次执行命令，每个修改连同它的 refresh 完成后才处理下一条，
// 从而保证界面列表反映的是最后一次提交的修改

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::catalog::{CategoryError, CategoryService};
use crate::storage::{Category, ImportReport, StoreError};

/// 分类命令
pub enum CategoryCommand {
    Add {
        name: String,
        reply: oneshot::Sender<Result<i64, CategoryError>>,
    },
    Edit {
        id: i64,
        new_name: String,
        reply: oneshot::Sender<Result<bool, CategoryError>>,
    },
    Delete {
        id: i64,
        reply: oneshot::Sender<Result<bool, CategoryError>>,
    },
    DeleteAll {
        reply: oneshot::Sender<Result<(), CategoryError>>,
    },
    Import {
        entries: Vec<String>,
        reply: oneshot::Sender<ImportReport>,
    },
    Refresh {
        reply: oneshot::Sender<Result<Vec<Category>, StoreError>>,
    },
}

/// 分类队列Actor
pub struct CategoryQueueActor {
    receiver: mpsc::Receiver<CategoryCommand>,
    service: Arc<CategoryService>,
}

impl CategoryQueueActor {
    /// 创建新的Actor
    pub fn new(service: Arc<CategoryService>) -> (Self, CategoryQueueHandle) {
        let (sender, receiver) = mpsc::channel(32);
        let actor = Self { receiver, service };
        let handle = CategoryQueueHandle { sender };
        (actor, handle)
    }

    /// 运行Actor
    pub async fn run(mut self) {
        tracing::info!("Category Queue Actor 已启动");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                CategoryCommand::Add { name, reply } => {
                    let _ = reply.send(self.service.add_category(&name).await);
                }
                CategoryCommand::Edit {
                    id,
                    new_name,
                    reply,
                } => {
                    let _ = reply.send(self.service.edit_category(id, &new_name).await);
                }
                CategoryCommand::Delete { id, reply } => {
                    let _ = reply.send(self.service.delete_category(id).await);
                }
                CategoryCommand::DeleteAll { reply } => {
                    let _ = reply.send(self.service.delete_all_categories().await);
                }
                CategoryCommand::Import { entries, reply } => {
                    let _ = reply.send(self.service.import_seed_data(entries).await);
                }
                CategoryCommand::Refresh { reply } => {
                    let _ = reply.send(self.service.refresh().await);
                }
            }
        }

        tracing::info!("Category Queue Actor 已停止");
    }
}

/// Actor 已停止时返回的错误
#[derive(Debug, thiserror::Error)]
#[error("分类队列已停止")]
pub struct QueueClosed;

/// 分类队列Handle
#[derive(Clone)]
pub struct CategoryQueueHandle {
    sender: mpsc::Sender<CategoryCommand>,
}

impl CategoryQueueHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> CategoryCommand,
    ) -> Result<T, QueueClosed> {
        let (reply, rx) = oneshot::channel();
        self.sender.send(build(reply)).await.map_err(|_| QueueClosed)?;
        rx.await.map_err(|_| QueueClosed)
    }

    pub async fn add(
        &self,
        name: impl Into<String>,
    ) -> Result<Result<i64, CategoryError>, QueueClosed> {
        let name = name.into();
        self.request(|reply| CategoryCommand::Add { name, reply }).await
    }

    pub async fn edit(
        &self,
        id: i64,
        new_name: impl Into<String>,
    ) -> Result<Result<bool, CategoryError>, QueueClosed> {
        let new_name = new_name.into();
        self.request(|reply| CategoryCommand::Edit {
            id,
            new_name,
            reply,
        })
        .await
    }

    pub async fn delete(&self, id: i64) -> Result<Result<bool, CategoryError>, QueueClosed> {
        self.request(|reply| CategoryCommand::Delete { id, reply }).await
    }

    pub async fn delete_all(&self) -> Result<Result<(), CategoryError>, QueueClosed> {
        self.request(|reply| CategoryCommand::DeleteAll { reply }).await
    }

    pub async fn import(&self, entries: Vec<String>) -> Result<ImportReport, QueueClosed> {
        self.request(|reply| CategoryCommand::Import { entries, reply })
            .await
    }

    pub async fn refresh(&self) -> Result<Result<Vec<Category>, StoreError>, QueueClosed> {
        self.request(|reply| CategoryCommand::Refresh { reply }).await
    }
}
