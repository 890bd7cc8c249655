// 离屏视图渲染器
//
// 宿主界面把要导出的视图登记为位图表面，capture_region 按句柄取出并写成产物

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use image::{imageops, DynamicImage, Rgba, RgbaImage};
use tokio::sync::RwLock;
use tracing::{debug, error};

use super::{write_png_artifact, CaptureError, Rect, RegionHandle, SnapshotRenderer};

/// 导出卡片宽度
pub const CARD_WIDTH: u32 = 300;
/// 装饰图片边长
pub const DECORATION_SIZE: u32 = 300;
/// 标题/说明文字带高度
const CAPTION_BAND: u32 = 24;
/// 装饰图片上边距
const DECORATION_MARGIN_TOP: u32 = 30;
/// 装饰图片下边距
const DECORATION_MARGIN_BOTTOM: u32 = 5;

/// 组合导出卡片：白色背景，上下各留一条文字带，中间是 300×300 的装饰图片
///
/// 没有装饰图片时用浅灰色占位
pub fn compose_export_card(decoration: Option<&DynamicImage>) -> DynamicImage {
    let height = CAPTION_BAND
        + DECORATION_MARGIN_TOP
        + DECORATION_SIZE
        + DECORATION_MARGIN_BOTTOM
        + CAPTION_BAND;
    let mut canvas = RgbaImage::from_pixel(CARD_WIDTH, height, Rgba([255, 255, 255, 255]));

    let decoration = match decoration {
        Some(img) => img
            .resize_exact(DECORATION_SIZE, DECORATION_SIZE, imageops::FilterType::Lanczos3)
            .to_rgba8(),
        None => RgbaImage::from_pixel(DECORATION_SIZE, DECORATION_SIZE, Rgba([221, 221, 221, 255])),
    };

    let offset_x = i64::from((CARD_WIDTH - DECORATION_SIZE) / 2);
    let offset_y = i64::from(CAPTION_BAND + DECORATION_MARGIN_TOP);
    imageops::overlay(&mut canvas, &decoration, offset_x, offset_y);

    DynamicImage::ImageRgba8(canvas)
}

/// 离屏视图渲染器
pub struct ViewSurfaceRenderer {
    surfaces: RwLock<HashMap<String, DynamicImage>>,
    output_dir: PathBuf,
}

impl ViewSurfaceRenderer {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            surfaces: RwLock::new(HashMap::new()),
            output_dir,
        }
    }

    /// 登记（或替换）一个视图表面
    pub async fn register_surface(&self, key: impl Into<String>, surface: DynamicImage) {
        let key = key.into();
        debug!("登记视图表面: {} ({}x{})", key, surface.width(), surface.height());
        self.surfaces.write().await.insert(key, surface);
    }

    /// 移除视图表面，之后该句柄失效
    pub async fn remove_surface(&self, key: &str) {
        self.surfaces.write().await.remove(key);
    }

    async fn rasterize(&self, key: &str, crop: Option<Rect>) -> Result<DynamicImage, CaptureError> {
        let surfaces = self.surfaces.read().await;
        let surface = surfaces
            .get(key)
            .ok_or_else(|| CaptureError::InvalidHandle(format!("未登记的视图: {}", key)))?;

        let Some(rect) = crop else {
            return Ok(surface.clone());
        };

        let fits = rect.x >= 0
            && rect.y >= 0
            && rect.width > 0
            && rect.height > 0
            && u64::from(rect.x as u32) + u64::from(rect.width) <= u64::from(surface.width())
            && u64::from(rect.y as u32) + u64::from(rect.height) <= u64::from(surface.height());
        if !fits {
            return Err(CaptureError::InvalidHandle(format!(
                "裁剪区域超出视图 {}: {:?}",
                key, rect
            )));
        }

        Ok(surface.crop_imm(rect.x as u32, rect.y as u32, rect.width, rect.height))
    }
}

#[async_trait]
impl SnapshotRenderer for ViewSurfaceRenderer {
    async fn capture_region(&self, handle: &RegionHandle) -> Result<PathBuf, CaptureError> {
        let result = match handle {
            RegionHandle::View { key, crop } => match self.rasterize(key, *crop).await {
                Ok(image) => write_png_artifact(&self.output_dir, image).await,
                Err(e) => Err(e),
            },
            RegionHandle::Screen { .. } => Err(CaptureError::InvalidHandle(
                "离屏渲染器不支持屏幕区域".to_string(),
            )),
        };

        if let Err(e) = &result {
            error!("截取视图失败: {}", e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;
    use tempfile::tempdir;

    #[test]
    fn test_card_places_decoration_below_caption() {
        let decoration = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            50,
            50,
            Rgba([200, 0, 0, 255]),
        ));
        let card = compose_export_card(Some(&decoration));

        assert_eq!(card.width(), CARD_WIDTH);
        assert_eq!(card.height(), 383);
        assert_eq!(card.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(card.get_pixel(150, 54 + 150), Rgba([200, 0, 0, 255]));
        assert_eq!(card.get_pixel(150, 382), Rgba([255, 255, 255, 255]));
    }

    #[tokio::test]
    async fn test_capture_registered_view() {
        let dir = tempdir().unwrap();
        let renderer = ViewSurfaceRenderer::new(dir.path().join("snapshots"));
        renderer
            .register_surface("card:1", compose_export_card(None))
            .await;

        let path = renderer
            .capture_region(&RegionHandle::view("card:1"))
            .await
            .unwrap();

        assert!(path.starts_with(dir.path().join("snapshots")));
        assert_eq!(image::open(&path).unwrap().dimensions(), (300, 383));
    }

    #[tokio::test]
    async fn test_capture_crops_to_region() {
        let dir = tempdir().unwrap();
        let renderer = ViewSurfaceRenderer::new(dir.path().to_path_buf());
        renderer
            .register_surface("card", compose_export_card(None))
            .await;

        let handle = RegionHandle::View {
            key: "card".to_string(),
            crop: Some(Rect {
                x: 0,
                y: 54,
                width: 300,
                height: 300,
            }),
        };
        let path = renderer.capture_region(&handle).await.unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!(img.dimensions(), (300, 300));
        assert_eq!(img.get_pixel(10, 10), Rgba([221, 221, 221, 255]));
    }

    #[tokio::test]
    async fn test_invalid_handles_fail() {
        let dir = tempdir().unwrap();
        let renderer = ViewSurfaceRenderer::new(dir.path().to_path_buf());
        renderer
            .register_surface("card", compose_export_card(None))
            .await;

        let missing = renderer.capture_region(&RegionHandle::view("nope")).await;
        assert!(matches!(missing, Err(CaptureError::InvalidHandle(_))));

        let outside = RegionHandle::View {
            key: "card".to_string(),
            crop: Some(Rect {
                x: 250,
                y: 0,
                width: 100,
                height: 10,
            }),
        };
        assert!(matches!(
            renderer.capture_region(&outside).await,
            Err(CaptureError::InvalidHandle(_))
        ));

        renderer.remove_surface("card").await;
        assert!(renderer
            .capture_region(&RegionHandle::view("card"))
            .await
            .is_err());
    }
}
