// 权限门 - 写入共享存储前按平台请求授权
//
// 每次导出最多请求一次；拒绝时先弹出阻塞确认框再返回 false

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::dialog::{Dialog, DialogPresenter};
use crate::models::HostPlatform;

/// 权限请求文案
pub const PERMISSION_TITLE: &str = "Image Download Permission";
pub const PERMISSION_MESSAGE: &str = "Your permission is required to save images to your device";

/// 系统权限弹窗的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    NeverAskAgain,
}

/// 一次权限请求的展示内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRequest {
    pub title: &'static str,
    pub message: &'static str,
    pub button_negative: &'static str,
    pub button_positive: &'static str,
}

impl PermissionRequest {
    pub fn storage_write() -> Self {
        Self {
            title: PERMISSION_TITLE,
            message: PERMISSION_MESSAGE,
            button_negative: "Cancel",
            button_positive: "OK",
        }
    }
}

/// 平台的交互式权限弹窗
#[async_trait]
pub trait PermissionPrompt: Send + Sync {
    async fn request(&self, request: &PermissionRequest) -> anyhow::Result<PermissionStatus>;
}

/// 权限门接口
#[async_trait]
pub trait PermissionGate: Send + Sync {
    /// 当前平台是否需要交互式授权
    fn prompt_required(&self) -> bool;

    /// 请求写入共享存储的权限
    async fn request_storage_write_permission(&self) -> bool;
}

/// 按宿主平台决定是否弹窗的权限门
pub struct PlatformPermissionGate {
    platform: HostPlatform,
    prompt: Arc<dyn PermissionPrompt>,
    dialogs: Arc<dyn DialogPresenter>,
}

impl PlatformPermissionGate {
    pub fn new(
        platform: HostPlatform,
        prompt: Arc<dyn PermissionPrompt>,
        dialogs: Arc<dyn DialogPresenter>,
    ) -> Self {
        Self {
            platform,
            prompt,
            dialogs,
        }
    }
}

#[async_trait]
impl PermissionGate for PlatformPermissionGate {
    fn prompt_required(&self) -> bool {
        self.platform.requires_storage_permission()
    }

    async fn request_storage_write_permission(&self) -> bool {
        if !self.prompt_required() {
            return true;
        }

        match self.prompt.request(&PermissionRequest::storage_write()).await {
            Ok(PermissionStatus::Granted) => {
                info!("已获得存储写入权限");
                true
            }
            Ok(status) => {
                warn!("存储写入权限被拒绝: {:?}", status);
                self.dialogs.alert(Dialog::notice(PERMISSION_MESSAGE)).await;
                false
            }
            Err(e) => {
                // 弹窗本身出错时不算用户拒绝，不再弹确认框
                error!("请求存储写入权限失败: {}", e);
                false
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedPrompt;
    use super::*;
    use crate::dialog::testing::RecordingDialogs;

    fn gate(
        platform: HostPlatform,
        prompt: Arc<ScriptedPrompt>,
        dialogs: Arc<RecordingDialogs>,
    ) -> PlatformPermissionGate {
        PlatformPermissionGate::new(platform, prompt, dialogs)
    }

    #[tokio::test]
    async fn test_platforms_without_prompt_grant_immediately() {
        for platform in [HostPlatform::Ios, HostPlatform::Desktop] {
            let prompt = Arc::new(ScriptedPrompt::answering(PermissionStatus::Denied));
            let dialogs = Arc::new(RecordingDialogs::default());
            let gate = gate(platform, prompt.clone(), dialogs.clone());

            assert!(!gate.prompt_required());
            assert!(gate.request_storage_write_permission().await);
            assert_eq!(prompt.call_count(), 0);
            assert!(dialogs.shown().is_empty());
        }
    }

    #[tokio::test]
    async fn test_android_grant() {
        let prompt = Arc::new(ScriptedPrompt::answering(PermissionStatus::Granted));
        let dialogs = Arc::new(RecordingDialogs::default());
        let gate = gate(HostPlatform::Android, prompt.clone(), dialogs.clone());

        assert!(gate.request_storage_write_permission().await);
        assert_eq!(prompt.call_count(), 1);
        assert!(dialogs.shown().is_empty());
    }

    #[tokio::test]
    async fn test_android_denial_shows_one_dialog() {
        for status in [PermissionStatus::Denied, PermissionStatus::NeverAskAgain] {
            let prompt = Arc::new(ScriptedPrompt::answering(status));
            let dialogs = Arc::new(RecordingDialogs::default());
            let gate = gate(HostPlatform::Android, prompt.clone(), dialogs.clone());

            assert!(!gate.request_storage_write_permission().await);
            assert_eq!(prompt.call_count(), 1);
            assert_eq!(dialogs.messages(), vec![PERMISSION_MESSAGE]);
        }
    }

    #[tokio::test]
    async fn test_prompt_error_is_not_granted_and_silent() {
        let prompt = Arc::new(ScriptedPrompt::broken());
        let dialogs = Arc::new(RecordingDialogs::default());
        let gate = gate(HostPlatform::Android, prompt, dialogs.clone());

        assert!(!gate.request_storage_write_permission().await);
        assert!(dialogs.shown().is_empty());
    }
}
