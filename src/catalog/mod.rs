// 分类服务 - 协调存储调用并维护界面可见的分类列表
//
// 一致性策略：每次修改后整体重读（reload-after-mutation），列表只会被整体替换，
// 从不增量修补。并发修改时以最后完成的 refresh 为准（最终一致，而非线性一致）；
// 需要严格顺序时使用 actors::CategoryQueueActor 串行化“修改 + 刷新”。

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{error, info, warn};

use crate::dialog::{Dialog, DialogPresenter};
use crate::event_bus::{AppEvent, EventBus};
use crate::storage::{Category, CategoryRepository, ImportReport, StoreError};
use crate::utils::validation::{
    validate_category_name, ValidationError, ADD_NAME_REQUIRED, EDIT_NAME_REQUIRED,
};

/// 分类服务错误
#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    /// 输入校验失败，未调用存储层
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// 存储引擎错误，已记录日志
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// 分类服务
pub struct CategoryService {
    store: Arc<dyn CategoryRepository>,
    dialogs: Arc<dyn DialogPresenter>,
    event_bus: Arc<EventBus>,
    /// 当前发布给界面的列表（按 id 倒序）
    list: watch::Sender<Vec<Category>>,
    /// 新建分类的输入框内容
    input: Mutex<String>,
}

impl CategoryService {
    pub fn new(
        store: Arc<dyn CategoryRepository>,
        dialogs: Arc<dyn DialogPresenter>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let (list, _) = watch::channel(Vec::new());
        Self {
            store,
            dialogs,
            event_bus,
            list,
            input: Mutex::new(String::new()),
        }
    }

    /// 当前列表快照
    pub fn categories(&self) -> Vec<Category> {
        self.list.borrow().clone()
    }

    /// 订阅列表变化
    pub fn subscribe(&self) -> watch::Receiver<Vec<Category>> {
        self.list.subscribe()
    }

    /// 设置输入框内容
    pub async fn set_input(&self, text: impl Into<String>) {
        *self.input.lock().await = text.into();
    }

    /// 获取输入框内容
    pub async fn input(&self) -> String {
        self.input.lock().await.clone()
    }

    /// 以输入框内容新建分类
    pub async fn submit_input(&self) -> Result<i64, CategoryError> {
        let name = self.input().await;
        self.add_category(&name).await
    }

    /// 新建分类
    ///
    /// 插入后无论成败都会刷新列表并清空输入框
    pub async fn add_category(&self, name: &str) -> Result<i64, CategoryError> {
        self.validate(name, ADD_NAME_REQUIRED).await?;

        let inserted = self.store.insert(name).await;
        match &inserted {
            Ok(id) => info!("新建分类成功: {} (id={})", name, id),
            Err(e) => self.report_store_error("insert", e),
        }

        let _ = self.refresh().await;
        self.input.lock().await.clear();

        Ok(inserted?)
    }

    /// 重命名分类，成功后刷新列表
    ///
    /// 返回分类是否存在；id 不存在时存储无操作，列表照常刷新
    pub async fn edit_category(&self, id: i64, new_name: &str) -> Result<bool, CategoryError> {
        self.validate(new_name, EDIT_NAME_REQUIRED).await?;

        let affected = match self.store.update(id, new_name).await {
            Ok(affected) => affected,
            Err(e) => {
                self.report_store_error("update", &e);
                return Err(e.into());
            }
        };
        if affected > 0 {
            info!("分类 #{} 已重命名", id);
        } else {
            info!("分类 #{} 不存在，未重命名", id);
        }

        let _ = self.refresh().await;
        Ok(affected > 0)
    }

    /// 删除单个分类，成功后刷新列表
    ///
    /// 返回分类是否存在
    pub async fn delete_category(&self, id: i64) -> Result<bool, CategoryError> {
        let affected = match self.store.delete_by_id(id).await {
            Ok(affected) => affected,
            Err(e) => {
                self.report_store_error("delete", &e);
                return Err(e.into());
            }
        };
        if affected > 0 {
            info!("分类 #{} 已删除", id);
        } else {
            info!("分类 #{} 不存在，未删除", id);
        }

        let _ = self.refresh().await;
        Ok(affected > 0)
    }

    /// 清空全部分类，成功后刷新列表
    pub async fn delete_all_categories(&self) -> Result<(), CategoryError> {
        if let Err(e) = self.store.delete_all().await {
            self.report_store_error("delete_all", &e);
            return Err(e.into());
        }
        info!("已清空全部分类");

        let _ = self.refresh().await;
        Ok(())
    }

    /// 导入种子数据
    ///
    /// 每个条目独立插入：第 k 条失败既不回滚前面的条目，也不阻止后面的条目。
    /// 每次插入成功后刷新一次列表。
    pub async fn import_seed_data<I, S>(&self, entries: I) -> ImportReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = ImportReport::default();

        for entry in entries {
            let name = entry.as_ref();
            match self.store.insert(name).await {
                Ok(id) => {
                    info!("新建分类成功: {} (id={})", name, id);
                    report.inserted += 1;
                    let _ = self.refresh().await;
                }
                Err(e) => {
                    self.report_store_error("insert", &e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "种子数据导入完成: 成功 {} 条, 失败 {} 条",
            report.inserted, report.failed
        );
        report
    }

    /// 从存储整体重读并替换当前列表
    ///
    /// 读取失败时保留旧列表
    pub async fn refresh(&self) -> Result<Vec<Category>, StoreError> {
        match self.store.select_all_descending().await {
            Ok(categories) => {
                let count = categories.len();
                self.list.send_replace(categories.clone());
                self.event_bus
                    .publish(AppEvent::CategoriesRefreshed { count });
                Ok(categories)
            }
            Err(e) => {
                self.report_store_error("select", &e);
                Err(e)
            }
        }
    }

    async fn validate(&self, name: &str, message: &'static str) -> Result<(), ValidationError> {
        if let Err(e) = validate_category_name(name, message) {
            warn!("分类名称校验失败: {}", e);
            self.dialogs.alert(Dialog::notice(e.message)).await;
            return Err(e);
        }
        Ok(())
    }

    fn report_store_error(&self, operation: &'static str, e: &StoreError) {
        error!("分类存储操作 {} 失败: {}", operation, e);
        self.event_bus.publish(AppEvent::StoreOperationFailed {
            operation,
            error: e.to_string(),
        });
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::dialog::testing::RecordingDialogs;
    use tempfile::tempdir;

    fn service_with(
        store: Arc<dyn CategoryRepository>,
    ) -> (CategoryService, Arc<RecordingDialogs>, Arc<EventBus>) {
        let dialogs = Arc::new(RecordingDialogs::default());
        let bus = Arc::new(EventBus::new(64));
        let service = CategoryService::new(store, dialogs.clone(), bus.clone());
        (service, dialogs, bus)
    }

    fn names(list: &[Category]) -> Vec<&str> {
        list.iter().map(|c| c.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_add_puts_newest_first_with_greater_id() {
        let dir = tempdir().unwrap();
        let (service, dialogs, _) = service_with(open_store(&dir).await);

        let first = service.add_category("penny-black").await.unwrap();
        let second = service.add_category("inverted-jenny").await.unwrap();

        let list = service.categories();
        assert_eq!(list[0].name, "inverted-jenny");
        assert_eq!(list[0].id, second);
        assert!(second > first);
        assert!(list.iter().skip(1).all(|c| c.id < second));
        assert!(dialogs.shown().is_empty());
    }

    #[tokio::test]
    async fn test_add_rejects_blank_names_without_touching_store() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir).await;
        let (service, dialogs, _) = service_with(store.clone());
        service.add_category("kept").await.unwrap();
        let before = service.categories();

        for blank in ["", "   "] {
            let err = service.add_category(blank).await.unwrap_err();
            assert!(matches!(err, CategoryError::Validation(_)));
        }

        assert_eq!(service.categories(), before);
        assert_eq!(store.select_all_descending().await.unwrap(), before);
        assert_eq!(dialogs.messages(), vec![ADD_NAME_REQUIRED, ADD_NAME_REQUIRED]);
    }

    #[tokio::test]
    async fn test_submit_input_clears_field() {
        let dir = tempdir().unwrap();
        let (service, _, _) = service_with(open_store(&dir).await);

        service.set_input("blue-mauritius").await;
        service.submit_input().await.unwrap();

        assert_eq!(service.input().await, "");
        assert_eq!(names(&service.categories()), vec!["blue-mauritius"]);
    }

    #[tokio::test]
    async fn test_blank_submit_keeps_input() {
        let dir = tempdir().unwrap();
        let (service, _, _) = service_with(open_store(&dir).await);

        service.set_input("  ").await;
        assert!(service.submit_input().await.is_err());
        assert_eq!(service.input().await, "  ");
    }

    #[tokio::test]
    async fn test_failed_insert_still_refreshes_and_clears_input() {
        let dir = tempdir().unwrap();
        let inner = open_store(&dir).await;
        inner.insert("existing").await.unwrap();
        let store = Arc::new(FlakyStore::failing_insert_at(inner, 1));
        let (service, dialogs, bus) = service_with(store);
        let mut events = bus.subscribe();

        service.set_input("doomed").await;
        let err = service.submit_input().await.unwrap_err();

        assert!(matches!(err, CategoryError::Store(_)));
        assert_eq!(names(&service.categories()), vec!["existing"]);
        assert_eq!(service.input().await, "");
        assert!(dialogs.shown().is_empty());
        assert!(matches!(
            events.try_recv(),
            Ok(AppEvent::StoreOperationFailed { operation: "insert", .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_one() {
        let dir = tempdir().unwrap();
        let (service, _, _) = service_with(open_store(&dir).await);
        let a = service.add_category("a").await.unwrap();
        let b = service.add_category("b").await.unwrap();
        let c = service.add_category("c").await.unwrap();

        assert!(service.delete_category(b).await.unwrap());

        let ids: Vec<i64> = service.categories().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![c, a]);
    }

    #[tokio::test]
    async fn test_delete_missing_id_is_noop() {
        let dir = tempdir().unwrap();
        let (service, _, _) = service_with(open_store(&dir).await);
        let id = service.add_category("only").await.unwrap();
        let before = service.categories();

        assert!(!service.delete_category(id + 42).await.unwrap());

        assert_eq!(service.categories(), before);
    }

    #[tokio::test]
    async fn test_delete_all_empties_list() {
        let dir = tempdir().unwrap();
        let (service, _, _) = service_with(open_store(&dir).await);
        service.add_category("a").await.unwrap();
        service.add_category("b").await.unwrap();

        service.delete_all_categories().await.unwrap();

        assert!(service.categories().is_empty());
    }

    #[tokio::test]
    async fn test_edit_keeps_id_and_position() {
        let dir = tempdir().unwrap();
        let (service, dialogs, _) = service_with(open_store(&dir).await);
        service.add_category("a").await.unwrap();
        let b = service.add_category("b").await.unwrap();
        service.add_category("c").await.unwrap();

        assert!(service.edit_category(b, "renamed").await.unwrap());
        assert!(!service.edit_category(b + 100, "ghost").await.unwrap());
        let list = service.categories();
        assert_eq!(names(&list), vec!["c", "renamed", "a"]);
        assert_eq!(list[1].id, b);

        let err = service.edit_category(b, " ").await.unwrap_err();
        assert!(matches!(err, CategoryError::Validation(_)));
        assert_eq!(service.categories(), list);
        assert_eq!(dialogs.messages(), vec![EDIT_NAME_REQUIRED]);
    }

    #[tokio::test]
    async fn test_failed_delete_leaves_record_visible() {
        let dir = tempdir().unwrap();
        let inner = open_store(&dir).await;
        let id = inner.insert("sticky").await.unwrap();
        let (service, _, _) = service_with(Arc::new(FlakyStore::failing_writes(inner)));
        service.refresh().await.unwrap();

        assert!(service.delete_category(id).await.is_err());
        assert!(service.delete_all_categories().await.is_err());

        service.refresh().await.unwrap();
        assert_eq!(names(&service.categories()), vec!["sticky"]);
    }

    #[tokio::test]
    async fn test_import_seed_data_assigns_ascending_ids() {
        let dir = tempdir().unwrap();
        let (service, _, _) = service_with(open_store(&dir).await);

        let report = service.import_seed_data(["a", "b", "c"]).await;
        assert_eq!(report, ImportReport { inserted: 3, failed: 0 });

        let list = service.refresh().await.unwrap();
        assert_eq!(names(&list), vec!["c", "b", "a"]);
        assert!(list[0].id > list[1].id && list[1].id > list[2].id);
    }

    #[tokio::test]
    async fn test_import_continues_after_mid_sequence_failure() {
        let dir = tempdir().unwrap();
        let inner = open_store(&dir).await;
        let store = Arc::new(FlakyStore::failing_insert_at(inner, 2));
        let (service, _, _) = service_with(store);

        let report = service
            .import_seed_data(vec!["a".to_string(), "b".into(), "c".into()])
            .await;

        assert_eq!(report, ImportReport { inserted: 2, failed: 1 });
        let list = service.refresh().await.unwrap();
        assert_eq!(names(&list), vec!["c", "a"]);
    }

    #[tokio::test]
    async fn test_refresh_replaces_list_wholesale() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir).await;
        let (service, _, bus) = service_with(store.clone());
        let mut watcher = service.subscribe();
        let mut events = bus.subscribe();

        service.add_category("visible").await.unwrap();
        store.delete_all().await.unwrap();
        store.insert("external").await.unwrap();
        service.refresh().await.unwrap();

        assert!(watcher.has_changed().unwrap());
        assert_eq!(names(&watcher.borrow_and_update()), vec!["external"]);
        assert_eq!(
            events.try_recv().unwrap(),
            AppEvent::CategoriesRefreshed { count: 1 }
        );
    }
}
