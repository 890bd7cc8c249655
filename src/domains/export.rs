// 导出领域管理器
//
// 负责导出视图的打开/关闭、导出卡片的组合登记以及导出流水线调用

use std::sync::Arc;

use image::DynamicImage;
use tokio::sync::Mutex;
use tracing::info;

use crate::capture::{compose_export_card, RegionHandle, ViewSurfaceRenderer};
use crate::export::{ExportOutcome, ExportPipeline};
use crate::storage::Category;

/// 导出视图在离屏渲染器中的登记键；同一时间只有一个导出视图
const EXPORT_VIEW_KEY: &str = "export-view";

/// 导出领域管理器
#[derive(Clone)]
pub struct ExportDomain {
    pipeline: Arc<ExportPipeline>,
    surfaces: Arc<ViewSurfaceRenderer>,
    /// 当前打开的导出视图对应的句柄
    active: Arc<Mutex<Option<RegionHandle>>>,
}

impl ExportDomain {
    pub fn new(pipeline: Arc<ExportPipeline>, surfaces: Arc<ViewSurfaceRenderer>) -> Self {
        Self {
            pipeline,
            surfaces,
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// 为分类打开导出视图：组合卡片并登记为可截取的视图，替换之前的导出视图
    pub async fn open_view(
        &self,
        category: &Category,
        decoration: Option<&DynamicImage>,
    ) -> RegionHandle {
        self.surfaces
            .register_surface(EXPORT_VIEW_KEY, compose_export_card(decoration))
            .await;

        let handle = RegionHandle::view(EXPORT_VIEW_KEY);
        *self.active.lock().await = Some(handle.clone());
        self.pipeline.view().open();
        info!("打开导出视图: {} ({})", category.name, category.id);
        handle
    }

    /// 关闭导出视图并释放其表面
    ///
    /// 已经截取完成的导出不受影响，继续走完授权和写入
    pub async fn close_view(&self) {
        self.pipeline.view().close();
        self.release_surface().await;
    }

    async fn release_surface(&self) {
        if self.active.lock().await.take().is_some() {
            self.surfaces.remove_surface(EXPORT_VIEW_KEY).await;
        }
    }

    pub fn is_view_open(&self) -> bool {
        self.pipeline.view().is_visible()
    }

    /// 导出当前打开的视图；没有打开的视图时返回 None
    pub async fn export_active(&self) -> Option<ExportOutcome> {
        if !self.is_view_open() {
            return None;
        }
        let handle = self.active.lock().await.clone()?;
        let outcome = self.pipeline.export(&handle).await;

        // 导出后视图可能已按策略关闭
        if !self.is_view_open() {
            self.release_surface().await;
        }
        Some(outcome)
    }

    /// 直接导出指定区域（例如桌面上的屏幕区域），不经过导出视图
    pub async fn export_region(&self, handle: &RegionHandle) -> ExportOutcome {
        self.pipeline.export(handle).await
    }
}
