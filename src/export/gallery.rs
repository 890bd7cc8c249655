// 图库导出 - 把快照产物写入共享图库目录

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{error, info};

/// 导出失败（只记录日志，不展示给用户）
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("快照文件不存在: {0}")]
    MissingArtifact(PathBuf),
    #[error("快照文件不是可识别的图片: {0}")]
    Unreadable(#[from] image::ImageError),
    #[error("写入图库失败: {0}")]
    Io(#[from] std::io::Error),
}

/// 图库导出接口
#[async_trait]
pub trait MediaExporter: Send + Sync {
    /// 写入图库，返回图库中的文件路径
    async fn save_to_gallery(&self, artifact: &Path) -> Result<PathBuf, ExportError>;
}

/// 以目录作为共享图库
pub struct DirectoryGallery {
    root: PathBuf,
}

impl DirectoryGallery {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn target_name(&self) -> String {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!("IMG_{}_{}.png", stamp, &suffix[..8])
    }
}

#[async_trait]
impl MediaExporter for DirectoryGallery {
    async fn save_to_gallery(&self, artifact: &Path) -> Result<PathBuf, ExportError> {
        if !tokio::fs::try_exists(artifact).await.unwrap_or(false) {
            return Err(ExportError::MissingArtifact(artifact.to_path_buf()));
        }

        // 只读取文件头，确认是图库能识别的图片
        let probe = artifact.to_path_buf();
        let (width, height) = tokio::task::spawn_blocking(move || image::image_dimensions(&probe))
            .await
            .map_err(|e| ExportError::Io(std::io::Error::other(e)))??;

        tokio::fs::create_dir_all(&self.root).await?;
        let target = self.root.join(self.target_name());

        if let Err(e) = tokio::fs::copy(artifact, &target).await {
            error!("复制快照到图库失败: {}", e);
            return Err(e.into());
        }

        info!("图片已保存到图库: {:?} ({}x{})", target, width, height);
        Ok(target)
    }
}
