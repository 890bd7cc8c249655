//! 控制台命令模块
//!
//! 单屏控制台界面的命令解析与分发，按功能分组：
//! - category: 分类管理命令
//! - export: 图片导出命令

pub mod category;
pub mod export;

use std::path::PathBuf;

use tracing::error;

use crate::capture::{Rect, RegionHandle};
use crate::catalog::CategoryError;
use crate::domains::CatalogError;
use crate::export::{ExportFailure, ExportOutcome};
use crate::AppState;

// 重新导出所有命令
pub use category::*;
pub use export::*;

pub const HELP: &str = "\
命令:
  add <名称>               新建分类
  edit <id> <新名称>        重命名分类
  delete <id>              删除分类
  clear                    清空全部分类
  import [种子文件]         导入种子数据
  list                     列出分类
  open <id>                打开分类的导出视图
  close                    关闭导出视图
  export                   导出当前视图到图库
  shot <屏幕> <x> <y> <宽> <高>  导出屏幕区域（桌面）
  help                     显示帮助
  quit                     退出";

/// 控制台命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Add(String),
    Edit { id: i64, name: String },
    Delete(i64),
    Clear,
    Import(Option<PathBuf>),
    List,
    Open(i64),
    Close,
    Export,
    Shot { screen: usize, rect: Rect },
    Help,
    Quit,
}

fn parse_id(value: Option<&str>) -> Result<i64, String> {
    let value = value.ok_or_else(|| "缺少分类 id".to_string())?;
    value
        .parse()
        .map_err(|_| format!("无效的分类 id: {}", value))
}

fn parse_number<T: std::str::FromStr>(value: Option<&str>, what: &str) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("缺少参数: {}", what))?;
    value
        .parse()
        .map_err(|_| format!("无效的{}: {}", what, value))
}

impl ConsoleCommand {
    /// 解析一行输入
    ///
    /// 名称参数保留原样（包括空白），交由分类服务校验
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (verb, rest) = match line.trim_start().split_once(' ') {
            Some((verb, rest)) => (verb, rest),
            None => (line.trim(), ""),
        };

        match verb {
            "add" => Ok(Self::Add(rest.to_string())),
            "edit" => {
                let (id, name) = rest.split_once(' ').unwrap_or((rest, ""));
                Ok(Self::Edit {
                    id: parse_id(Some(id.trim()))?,
                    name: name.to_string(),
                })
            }
            "delete" => Ok(Self::Delete(parse_id(rest.split_whitespace().next())?)),
            "clear" => Ok(Self::Clear),
            "import" => {
                let path = rest.trim();
                Ok(Self::Import(
                    (!path.is_empty()).then(|| PathBuf::from(path)),
                ))
            }
            "list" => Ok(Self::List),
            "open" => Ok(Self::Open(parse_id(rest.split_whitespace().next())?)),
            "close" => Ok(Self::Close),
            "export" => Ok(Self::Export),
            "shot" => {
                let mut args = rest.split_whitespace();
                let screen = parse_number(args.next(), "屏幕编号")?;
                let rect = Rect {
                    x: parse_number(args.next(), "x")?,
                    y: parse_number(args.next(), "y")?,
                    width: parse_number(args.next(), "宽度")?,
                    height: parse_number(args.next(), "高度")?,
                };
                Ok(Self::Shot { screen, rect })
            }
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            "" => Err("请输入命令".to_string()),
            other => Err(format!("未知命令: {}（输入 help 查看帮助）", other)),
        }
    }
}

/// 分类操作失败时的控制台输出
///
/// 校验失败（对话框已提示）保留提示文字；存储和队列错误只写日志，输出为空
pub(crate) fn catalog_failure(e: CatalogError) -> String {
    match e {
        CatalogError::Category(CategoryError::Validation(e)) => e.to_string(),
        // 分类服务已记录日志并发布 StoreOperationFailed
        CatalogError::Category(CategoryError::Store(_)) => String::new(),
        CatalogError::Queue(e) => {
            error!("分类队列不可用: {}", e);
            String::new()
        }
    }
}

/// 导出失败时的控制台输出：只有权限被拒绝有提示文字，截取和写入失败只写日志
pub(crate) fn export_failure(failure: ExportFailure) -> String {
    match failure {
        ExportFailure::PermissionDenied => format!("导出失败: {}", failure),
        ExportFailure::Capture(_) | ExportFailure::Export(_) => String::new(),
    }
}

/// 导出屏幕区域
pub async fn export_screen_region(
    state: &AppState,
    screen: usize,
    rect: Rect,
) -> Result<String, String> {
    match state
        .export
        .export_region(&RegionHandle::Screen { screen, rect })
        .await
    {
        ExportOutcome::Done { gallery_path } => Ok(format!("已导出: {:?}", gallery_path)),
        ExportOutcome::Failed(failure) => Err(export_failure(failure)),
    }
}

/// 执行命令
pub async fn dispatch(state: &AppState, command: ConsoleCommand) -> Result<String, String> {
    match command {
        ConsoleCommand::Add(name) => add_category(state, &name).await,
        ConsoleCommand::Edit { id, name } => edit_category(state, id, &name).await,
        ConsoleCommand::Delete(id) => delete_category(state, id).await,
        ConsoleCommand::Clear => delete_all_categories(state).await,
        ConsoleCommand::Import(path) => import_seed_file(state, path).await,
        ConsoleCommand::List => list_categories(state).await,
        ConsoleCommand::Open(id) => open_export_view(state, id).await,
        ConsoleCommand::Close => close_export_view(state).await,
        ConsoleCommand::Export => export_image(state).await,
        ConsoleCommand::Shot { screen, rect } => export_screen_region(state, screen, rect).await,
        ConsoleCommand::Help => Ok(HELP.to_string()),
        ConsoleCommand::Quit => Ok(String::new()),
    }
}
