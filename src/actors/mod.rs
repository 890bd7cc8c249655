// Actor模块 - 使用Actor模式管理并发状态
//
// 通过消息传递把对共享状态的修改排成单一队列

pub mod category_queue;

pub use category_queue::{CategoryCommand, CategoryQueueActor, CategoryQueueHandle, QueueClosed};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::open_store;
    use crate::catalog::CategoryService;
    use crate::dialog::testing::RecordingDialogs;
    use crate::event_bus::EventBus;
    use std::sync::Arc;
    use tempfile::tempdir;

    async fn spawn_queue(dir: &tempfile::TempDir) -> (Arc<CategoryService>, CategoryQueueHandle) {
        let service = Arc::new(CategoryService::new(
            open_store(dir).await,
            Arc::new(RecordingDialogs::default()),
            Arc::new(EventBus::new(64)),
        ));
        let (actor, handle) = CategoryQueueActor::new(service.clone());
        tokio::spawn(async move {
            actor.run().await;
        });
        (service, handle)
    }

    #[tokio::test]
    async fn test_stopped_queue_reports_closed() {
        let dir = tempdir().unwrap();
        let service = Arc::new(CategoryService::new(
            open_store(&dir).await,
            Arc::new(RecordingDialogs::default()),
            Arc::new(EventBus::new(8)),
        ));
        let (actor, handle) = CategoryQueueActor::new(service);

        // 不运行Actor，直接drop
        drop(actor);

        assert!(handle.add("lost").await.is_err(), "停止的Actor应该拒绝命令");
        assert!(handle.refresh().await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_mutations_end_consistent() {
        let dir = tempdir().unwrap();
        let (service, handle) = spawn_queue(&dir).await;

        let mut tasks = Vec::new();
        for i in 0..10 {
            let handle = handle.clone();
            tasks.push(tokio::spawn(async move {
                handle.add(format!("stamp-{}", i)).await.unwrap().unwrap()
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        // 队列中最后一次刷新之后，列表与存储完全一致
        let list = handle.refresh().await.unwrap().unwrap();
        assert_eq!(list.len(), 10);
        assert_eq!(service.categories(), list);
        assert!(list.windows(2).all(|w| w[0].id > w[1].id));
    }

    #[tokio::test]
    async fn test_queue_runs_commands_in_submission_order() {
        let dir = tempdir().unwrap();
        let (service, handle) = spawn_queue(&dir).await;

        let id = handle.add("first").await.unwrap().unwrap();
        assert!(handle.edit(id, "second").await.unwrap().unwrap());
        let report = handle
            .import(vec!["x".to_string(), "y".to_string()])
            .await
            .unwrap();
        assert_eq!(report.inserted, 2);
        assert!(handle.delete(id).await.unwrap().unwrap());

        let names: Vec<String> = service.categories().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["y", "x"]);

        handle.delete_all().await.unwrap().unwrap();
        assert!(service.categories().is_empty());
    }

    #[tokio::test]
    async fn test_queue_refresh_reports_store_failure() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir).await;
        let service = Arc::new(CategoryService::new(
            store.clone(),
            Arc::new(RecordingDialogs::default()),
            Arc::new(EventBus::new(8)),
        ));
        let (actor, handle) = CategoryQueueActor::new(service.clone());
        tokio::spawn(async move {
            actor.run().await;
        });

        handle.add("kept").await.unwrap().unwrap();
        store.close().await;

        assert!(handle.refresh().await.unwrap().is_err());
        // 读取失败时保留旧列表
        assert_eq!(service.categories().len(), 1);
    }
}
