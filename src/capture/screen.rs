// 屏幕区域渲染器 - 桌面平台上截取物理屏幕的矩形区域

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use image::DynamicImage;
use screenshots::Screen;
use tracing::{error, info, trace};

use super::{write_png_artifact, CaptureError, RegionHandle, SnapshotRenderer};

/// 屏幕区域渲染器
pub struct ScreenRegionRenderer {
    /// 可用屏幕列表
    screens: Vec<Screen>,
    /// 输出目录
    output_dir: PathBuf,
}

impl ScreenRegionRenderer {
    /// 创建新的屏幕区域渲染器
    pub fn new(output_dir: PathBuf) -> Result<Self> {
        let screens = Screen::all()?;
        info!("检测到 {} 个屏幕", screens.len());

        for (index, screen) in screens.iter().enumerate() {
            let display_info = screen.display_info;
            info!(
                "屏幕 #{}: {}x{} @ ({}, {})",
                index, display_info.width, display_info.height, display_info.x, display_info.y
            );
        }

        Ok(Self {
            screens,
            output_dir,
        })
    }
}

#[async_trait]
impl SnapshotRenderer for ScreenRegionRenderer {
    async fn capture_region(&self, handle: &RegionHandle) -> Result<PathBuf, CaptureError> {
        let RegionHandle::Screen { screen, rect } = handle else {
            let e = CaptureError::InvalidHandle("屏幕渲染器只支持屏幕区域".to_string());
            error!("截取屏幕区域失败: {}", e);
            return Err(e);
        };

        let Some(target) = self.screens.get(*screen).cloned() else {
            let e = CaptureError::InvalidHandle(format!("屏幕 #{} 不存在", screen));
            error!("截取屏幕区域失败: {}", e);
            return Err(e);
        };

        let rect = *rect;
        let captured = tokio::task::spawn_blocking(move || {
            target.capture_area(rect.x, rect.y, rect.width, rect.height)
        })
        .await
        .map_err(|e| CaptureError::Render(format!("截屏任务异常退出: {}", e)))?;

        let image = match captured {
            Ok(image) => DynamicImage::ImageRgba8(image),
            Err(e) => {
                let e = CaptureError::Render(e.to_string());
                error!("截取屏幕 #{} 区域失败: {}", screen, e);
                return Err(e);
            }
        };

        trace!("截取屏幕 #{} 区域成功: {:?}", screen, rect);
        let result = write_png_artifact(&self.output_dir, image).await;
        if let Err(e) = &result {
            error!("保存屏幕快照失败: {}", e);
        }
        result
    }
}
