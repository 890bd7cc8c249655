// 导出模块 - 权限门、图库写入和导出流水线

pub mod gallery;
pub mod permission;
pub mod pipeline;

pub use gallery::{DirectoryGallery, ExportError, MediaExporter};
pub use permission::{
    PermissionGate, PermissionPrompt, PermissionRequest, PermissionStatus, PlatformPermissionGate,
};
pub use pipeline::{ExportFailure, ExportOutcome, ExportPipeline, ExportState, ExportView};
