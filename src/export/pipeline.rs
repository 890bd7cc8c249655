// 导出流水线 - 截取 → (需要时)请求权限 → 写入图库
//
// 状态机（每次调用独立）：
//   Idle → Capturing → [RequestingPermission] → Exporting → Done | Failed
// 权限被拒绝直接进入 Failed，不会到达 Exporting；没有重试，重新调用即从 Idle 开始。
// 关闭导出视图不会中断进行中的导出。

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::gallery::{ExportError, MediaExporter};
use super::permission::PermissionGate;
use crate::capture::{CaptureError, RegionHandle, SnapshotRenderer};
use crate::dialog::{Dialog, DialogPresenter};
use crate::event_bus::{AppEvent, EventBus};
use crate::models::{ExportSettings, PostExportVisibility};

/// 保存成功提示
pub const IMAGE_SAVED_MESSAGE: &str = "Image saved successfully.";

/// 导出状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExportState {
    #[default]
    Idle,
    Capturing,
    RequestingPermission,
    Exporting,
    Done,
    Failed,
}

/// 导出失败原因
#[derive(Debug, thiserror::Error)]
pub enum ExportFailure {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("存储写入权限被拒绝")]
    PermissionDenied,
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// 一次导出的结果
#[derive(Debug)]
pub enum ExportOutcome {
    Done { gallery_path: PathBuf },
    Failed(ExportFailure),
}

impl ExportOutcome {
    pub fn state(&self) -> ExportState {
        match self {
            Self::Done { .. } => ExportState::Done,
            Self::Failed(_) => ExportState::Failed,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. })
    }
}

/// 导出视图（弹出层）的可见性
pub struct ExportView {
    visible: AtomicBool,
    event_bus: Arc<EventBus>,
}

impl ExportView {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self {
            visible: AtomicBool::new(false),
            event_bus,
        }
    }

    pub fn open(&self) {
        self.set_visible(true);
    }

    pub fn close(&self) {
        self.set_visible(false);
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    fn set_visible(&self, visible: bool) {
        if self.visible.swap(visible, Ordering::SeqCst) != visible {
            self.event_bus
                .publish(AppEvent::ExportViewVisibilityChanged { visible });
        }
    }
}

/// 导出流水线
pub struct ExportPipeline {
    renderer: Arc<dyn SnapshotRenderer>,
    gate: Arc<dyn PermissionGate>,
    exporter: Arc<dyn MediaExporter>,
    dialogs: Arc<dyn DialogPresenter>,
    event_bus: Arc<EventBus>,
    view: Arc<ExportView>,
    settings: ExportSettings,
    state: watch::Sender<ExportState>,
}

impl ExportPipeline {
    pub fn new(
        renderer: Arc<dyn SnapshotRenderer>,
        gate: Arc<dyn PermissionGate>,
        exporter: Arc<dyn MediaExporter>,
        dialogs: Arc<dyn DialogPresenter>,
        event_bus: Arc<EventBus>,
        view: Arc<ExportView>,
        settings: ExportSettings,
    ) -> Self {
        let (state, _) = watch::channel(ExportState::Idle);
        Self {
            renderer,
            gate,
            exporter,
            dialogs,
            event_bus,
            view,
            settings,
            state,
        }
    }

    /// 最近一次导出的状态
    pub fn state(&self) -> ExportState {
        *self.state.borrow()
    }

    pub fn view(&self) -> &Arc<ExportView> {
        &self.view
    }

    /// 执行一次导出
    pub async fn export(&self, handle: &RegionHandle) -> ExportOutcome {
        self.transition(ExportState::Idle);

        self.transition(ExportState::Capturing);
        let artifact = match self.renderer.capture_region(handle).await {
            Ok(path) => path,
            Err(e) => {
                error!("截取导出区域失败: {}", e);
                return self.fail(e.into());
            }
        };

        if self.gate.prompt_required() {
            self.transition(ExportState::RequestingPermission);
            if !self.gate.request_storage_write_permission().await {
                discard_artifact(&artifact).await;
                return self.fail(ExportFailure::PermissionDenied);
            }
        }

        self.transition(ExportState::Exporting);
        let saved = self.exporter.save_to_gallery(&artifact).await;
        discard_artifact(&artifact).await;

        match saved {
            Ok(gallery_path) => {
                let dialog =
                    Dialog::notice(IMAGE_SAVED_MESSAGE).with_buttons(self.settings.confirm_buttons);
                self.dialogs.alert(dialog).await;
                self.view.close();
                self.event_bus.publish(AppEvent::ImageSaved {
                    gallery_path: gallery_path.clone(),
                });
                self.transition(ExportState::Done);
                ExportOutcome::Done { gallery_path }
            }
            Err(e) => {
                error!("写入图库失败: {}", e);
                if self.settings.post_export_visibility == PostExportVisibility::CloseOnAttempt {
                    self.view.close();
                }
                self.fail(e.into())
            }
        }
    }

    fn fail(&self, failure: ExportFailure) -> ExportOutcome {
        warn!("导出失败: {}", failure);
        self.transition(ExportState::Failed);
        ExportOutcome::Failed(failure)
    }

    fn transition(&self, state: ExportState) {
        info!("导出状态: {:?}", state);
        self.state.send_replace(state);
        self.event_bus.publish(AppEvent::ExportStateChanged { state });
    }
}

async fn discard_artifact(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!("删除快照文件失败: {:?}: {}", path, e);
    }
}
