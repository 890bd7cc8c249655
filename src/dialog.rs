// 对话框抽象 - 阻塞式确认提示
//
// 核心逻辑只依赖 DialogPresenter，具体由宿主界面实现

use async_trait::async_trait;
use tracing::info;

use crate::models::ConfirmButtons;

/// 一次需要用户确认的提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub title: String,
    pub message: String,
    pub buttons: ConfirmButtons,
}

impl Dialog {
    /// 只有 OK 按钮的提示
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            message: message.into(),
            buttons: ConfirmButtons::OkOnly,
        }
    }

    pub fn with_buttons(mut self, buttons: ConfirmButtons) -> Self {
        self.buttons = buttons;
        self
    }
}

/// 对话框展示接口
///
/// `alert` 在用户确认后才返回
#[async_trait]
pub trait DialogPresenter: Send + Sync {
    async fn alert(&self, dialog: Dialog);
}

/// 控制台对话框：打印到标准输出后立即视为已确认
pub struct ConsoleDialogs;

#[async_trait]
impl DialogPresenter for ConsoleDialogs {
    async fn alert(&self, dialog: Dialog) {
        info!("展示对话框: {}", dialog.message);
        let buttons = match dialog.buttons {
            ConfirmButtons::OkOnly => "[OK]",
            ConfirmButtons::OkCancel => "[OK] [Cancel]",
        };
        if dialog.title.is_empty() {
            println!("! {} {}", dialog.message, buttons);
        } else {
            println!("! {}: {} {}", dialog.title, dialog.message, buttons);
        }
    }
}
