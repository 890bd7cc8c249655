// 快照模块 - 将界面区域栅格化为 PNG 产物
//
// 两种渲染器：
// - ViewSurfaceRenderer: 宿主界面登记的离屏视图（导出卡片）
// - ScreenRegionRenderer: 桌面平台上物理屏幕的矩形区域
// RoutingRenderer 按句柄类型分发给二者

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, DynamicImage, ImageEncoder};
use tracing::{trace, warn};

pub mod screen;
pub mod surface;

pub use screen::ScreenRegionRenderer;
pub use surface::{compose_export_card, ViewSurfaceRenderer};

/// 矩形区域（像素）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// 要截取的区域
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionHandle {
    /// 已登记的视图，可选裁剪到视图内的子区域
    View { key: String, crop: Option<Rect> },
    /// 物理屏幕上的区域
    Screen { screen: usize, rect: Rect },
}

impl RegionHandle {
    pub fn view(key: impl Into<String>) -> Self {
        Self::View {
            key: key.into(),
            crop: None,
        }
    }
}

/// 截取失败（只记录日志，不展示给用户）
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("无效的区域句柄: {0}")]
    InvalidHandle(String),
    #[error("渲染失败: {0}")]
    Render(String),
    #[error("图片编码失败: {0}")]
    Encode(#[from] image::ImageError),
    #[error("写入快照文件失败: {0}")]
    Io(#[from] std::io::Error),
}

/// 快照渲染接口
#[async_trait]
pub trait SnapshotRenderer: Send + Sync {
    /// 以全质量 PNG 栅格化指定区域，返回产物路径
    async fn capture_region(&self, handle: &RegionHandle) -> Result<PathBuf, CaptureError>;
}

/// 按句柄类型分发的渲染器
pub struct RoutingRenderer {
    views: Arc<ViewSurfaceRenderer>,
    screens: Option<Arc<ScreenRegionRenderer>>,
}

impl RoutingRenderer {
    pub fn new(
        views: Arc<ViewSurfaceRenderer>,
        screens: Option<Arc<ScreenRegionRenderer>>,
    ) -> Self {
        Self { views, screens }
    }
}

#[async_trait]
impl SnapshotRenderer for RoutingRenderer {
    async fn capture_region(&self, handle: &RegionHandle) -> Result<PathBuf, CaptureError> {
        match (handle, &self.screens) {
            (RegionHandle::View { .. }, _) => self.views.capture_region(handle).await,
            (RegionHandle::Screen { .. }, Some(screens)) => screens.capture_region(handle).await,
            (RegionHandle::Screen { .. }, None) => {
                let e = CaptureError::InvalidHandle("当前平台不支持截取屏幕区域".to_string());
                warn!("{}", e);
                Err(e)
            }
        }
    }
}

/// 把图像写成 PNG 产物文件，文件保留在 `dir` 中供导出使用
pub(crate) async fn write_png_artifact(
    dir: &Path,
    image: DynamicImage,
) -> Result<PathBuf, CaptureError> {
    tokio::fs::create_dir_all(dir).await?;
    let dir = dir.to_path_buf();

    tokio::task::spawn_blocking(move || encode_png(&dir, &image))
        .await
        .map_err(|e| CaptureError::Render(format!("编码任务异常退出: {}", e)))?
}

fn encode_png(dir: &Path, image: &DynamicImage) -> Result<PathBuf, CaptureError> {
    let temp_file = tempfile::Builder::new()
        .prefix("snapshot_")
        .suffix(".png")
        .tempfile_in(dir)?;
    let (file, path) = temp_file.keep().map_err(|e| CaptureError::Io(e.error))?;

    let rgba = image.to_rgba8();
    let result = write_png(file, &rgba);

    if let Err(e) = result {
        if let Err(remove_err) = std::fs::remove_file(&path) {
            warn!("删除未完成的快照文件失败: {}", remove_err);
        }
        return Err(e);
    }

    trace!("快照保存成功: {:?}", path);
    Ok(path)
}

fn write_png(file: File, rgba: &image::RgbaImage) -> Result<(), CaptureError> {
    let writer = BufWriter::new(file);
    // PNG 无损，压缩级别只影响体积
    let encoder = PngEncoder::new_with_quality(writer, CompressionType::Best, FilterType::Adaptive);
    encoder.write_image(rgba.as_raw(), rgba.width(), rgba.height(), ColorType::Rgba8)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_png_artifact_roundtrips_pixels() {
        let dir = tempdir().unwrap();
        let mut img = RgbaImage::new(4, 3);
        img.put_pixel(2, 1, Rgba([10, 20, 30, 255]));

        let path = write_png_artifact(dir.path(), DynamicImage::ImageRgba8(img))
            .await
            .unwrap();

        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(2, 1), Rgba([10, 20, 30, 255]));
    }

    #[tokio::test]
    async fn test_routing_renderer_without_screens() {
        let dir = tempdir().unwrap();
        let views = Arc::new(ViewSurfaceRenderer::new(dir.path().to_path_buf()));
        views.register_surface("card", compose_export_card(None)).await;
        let router = RoutingRenderer::new(views, None);

        assert!(router.capture_region(&RegionHandle::view("card")).await.is_ok());

        let screen = RegionHandle::Screen {
            screen: 0,
            rect: Rect {
                x: 0,
                y: 0,
                width: 10,
                height: 10,
            },
        };
        assert!(matches!(
            router.capture_region(&screen).await,
            Err(CaptureError::InvalidHandle(_))
        ));
    }
}
