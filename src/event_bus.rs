// 事件总线 - 用于模块间解耦通信
//
// 实现发布/订阅模式，界面层通过订阅得知列表刷新和导出状态变化
// 使用 tokio::sync::broadcast 实现事件分发

use std::path::PathBuf;
use tokio::sync::broadcast;

use crate::export::ExportState;

/// 应用事件枚举 - 定义所有可能的系统事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    // --- 分类事件 ---

    /// 分类列表已整体替换
    CategoriesRefreshed {
        count: usize,
    },

    /// 存储操作失败（只记录，不展示给用户）
    StoreOperationFailed {
        operation: &'static str,
        error: String,
    },

    // --- 导出事件 ---

    /// 导出状态机迁移
    ExportStateChanged {
        state: ExportState,
    },

    /// 导出视图可见性变化
    ExportViewVisibilityChanged {
        visible: bool,
    },

    /// 图片已写入图库
    ImageSaved {
        gallery_path: PathBuf,
    },
}

/// 事件总线
///
/// 支持多个订阅者同时接收事件
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    /// 创建新的事件总线
    ///
    /// # 参数
    /// - `capacity`: 事件缓冲区大小，建议 100-1000
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// 发布事件
    ///
    /// 如果没有订阅者，事件会被丢弃
    pub fn publish(&self, event: AppEvent) {
        match self.sender.send(event) {
            Ok(receiver_count) => {
                tracing::trace!("事件已发布，订阅者数量: {}", receiver_count);
            }
            Err(_) => {
                tracing::trace!("事件已发布但无订阅者");
            }
        }
    }

    /// 订阅事件
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// 获取当前订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
