//! 应用程序初始化和启动
//!
//! 负责控制台应用的完整启动流程，包括：
//! - 设置加载与日志系统初始化
//! - 存储打开与建表
//! - 各领域模块初始化（分类、导出）
//! - 控制台命令循环

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::capture::{RoutingRenderer, ScreenRegionRenderer, ViewSurfaceRenderer};
use crate::catalog::CategoryService;
use crate::commands::{dispatch, ConsoleCommand, HELP};
use crate::dialog::{ConsoleDialogs, DialogPresenter};
use crate::domains::{CatalogDomain, ExportDomain};
use crate::event_bus::{AppEvent, EventBus};
use crate::export::{
    DirectoryGallery, ExportPipeline, ExportState, ExportView, PermissionPrompt,
    PermissionRequest, PermissionStatus, PlatformPermissionGate,
};
use crate::logger;
use crate::models::HostPlatform;
use crate::settings::SettingsManager;
use crate::storage::{CategoryRepository, DatabaseConfig, SqliteRepository};
use crate::utils::{get_data_dir, get_log_dir};
use crate::AppState;

/// 初始化完成的应用：状态与需要在退出时关闭的存储
pub struct AppRuntime {
    pub state: AppState,
    pub store: Arc<SqliteRepository>,
}

/// 相对路径按应用数据目录解析
fn resolve_path(base: &Path, configured: &str) -> PathBuf {
    base.join(configured)
}

/// 构建应用状态
///
/// 打开存储失败是致命错误；建表失败只记录日志，后续操作各自报错
pub async fn build_state(
    settings: Arc<SettingsManager>,
    dialogs: Arc<dyn DialogPresenter>,
    prompt: Arc<dyn PermissionPrompt>,
    stamps_dir: PathBuf,
) -> Result<AppRuntime> {
    let config = settings.get().await;
    let data_dir = get_data_dir();

    // 存储
    let db_path = resolve_path(&data_dir, &config.database_path);
    let store = Arc::new(
        SqliteRepository::open(&DatabaseConfig::with_path(db_path.to_string_lossy()))
            .await
            .with_context(|| format!("打开数据库失败: {:?}", db_path))?,
    );
    if let Err(e) = store.ensure_schema().await {
        error!("创建分类表失败: {}", e);
    }

    let event_bus = Arc::new(EventBus::default());

    // 分类领域
    let service = Arc::new(CategoryService::new(
        store.clone(),
        dialogs.clone(),
        event_bus.clone(),
    ));
    let catalog = if config.serialize_mutations {
        info!("分类修改经由串行队列执行");
        CatalogDomain::serialized(service)
    } else {
        CatalogDomain::new(service)
    };
    if let Err(e) = catalog.refresh().await {
        warn!("初始加载分类列表失败: {}", e);
    }

    // 导出领域
    let artifacts_dir = resolve_path(&data_dir, &config.artifacts_dir);
    let surfaces = Arc::new(ViewSurfaceRenderer::new(artifacts_dir.clone()));
    let screens = match config.host_platform {
        HostPlatform::Desktop => match ScreenRegionRenderer::new(artifacts_dir) {
            Ok(renderer) => Some(Arc::new(renderer)),
            Err(e) => {
                warn!("屏幕截取不可用: {}", e);
                None
            }
        },
        _ => None,
    };
    let renderer = Arc::new(RoutingRenderer::new(surfaces.clone(), screens));

    let gate = Arc::new(PlatformPermissionGate::new(
        config.host_platform,
        prompt,
        dialogs.clone(),
    ));
    let gallery = Arc::new(DirectoryGallery::new(resolve_path(
        &data_dir,
        &config.gallery_dir,
    )));
    let view = Arc::new(ExportView::new(event_bus.clone()));
    let pipeline = Arc::new(ExportPipeline::new(
        renderer,
        gate,
        gallery,
        dialogs,
        event_bus.clone(),
        view,
        config.export.clone(),
    ));
    let export = ExportDomain::new(pipeline, surfaces);

    info!(
        "应用初始化完成: 平台 {:?}, 数据库 {:?}, 串行队列 {}",
        config.host_platform,
        db_path,
        catalog.is_serialized()
    );

    Ok(AppRuntime {
        state: AppState {
            catalog: Arc::new(catalog),
            export: Arc::new(export),
            settings,
            event_bus,
            stamps_dir,
        },
        store,
    })
}

type ConsoleInput = Arc<Mutex<Lines<BufReader<Stdin>>>>;

/// 控制台上的权限弹窗，与命令循环共用标准输入
pub struct ConsolePermissionPrompt {
    input: ConsoleInput,
}

impl ConsolePermissionPrompt {
    pub fn new(input: ConsoleInput) -> Self {
        Self { input }
    }
}

#[async_trait]
impl PermissionPrompt for ConsolePermissionPrompt {
    async fn request(&self, request: &PermissionRequest) -> Result<PermissionStatus> {
        println!("[{}] {}", request.title, request.message);
        println!(
            "  {} / {}（输入 y 表示 {}）",
            request.button_negative, request.button_positive, request.button_positive
        );

        let line = self
            .input
            .lock()
            .await
            .next_line()
            .await?
            .context("标准输入已关闭")?;

        match line.trim().to_lowercase().as_str() {
            "y" | "yes" | "ok" => Ok(PermissionStatus::Granted),
            "never" => Ok(PermissionStatus::NeverAskAgain),
            _ => Ok(PermissionStatus::Denied),
        }
    }
}

/// 在控制台上显示导出视图和导出状态的变化
///
/// 存储故障事件不显示，只留在日志里
fn spawn_event_printer(event_bus: &EventBus) -> JoinHandle<()> {
    let mut events = event_bus.subscribe();
    debug!("控制台已订阅事件，订阅者数量: {}", event_bus.subscriber_count());
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(AppEvent::ExportViewVisibilityChanged { visible }) => {
                    println!("[导出视图{}]", if visible { "已打开" } else { "已关闭" });
                }
                Ok(AppEvent::ExportStateChanged { state }) if state != ExportState::Idle => {
                    println!("[导出] {:?}", state);
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("控制台事件积压，跳过 {} 条", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

async fn console_loop(state: &AppState, input: ConsoleInput) -> Result<()> {
    println!("{}", HELP);

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        // 取完一行立即释放锁，权限弹窗需要继续读取
        let line = input.lock().await.next_line().await?;
        let Some(line) = line else {
            info!("标准输入已关闭，退出");
            return Ok(());
        };

        let command = match ConsoleCommand::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };
        if command == ConsoleCommand::Quit {
            return Ok(());
        }

        // 存储和导出故障只写日志，对应的输出为空
        let (Ok(message) | Err(message)) = dispatch(state, command).await;
        if !message.is_empty() {
            println!("{}", message);
        }
    }
}

/// 应用程序入口点
pub fn run() -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async {
        let data_dir = get_data_dir();
        let settings = Arc::new(SettingsManager::new(data_dir.join("settings.json")).await?);
        let config = settings.get().await;

        let _guard = logger::init(&get_log_dir(), &config.log_level)?;
        info!("启动分类目录...");

        let stdin = BufReader::new(tokio::io::stdin()).lines();
        let input: ConsoleInput = Arc::new(Mutex::new(stdin));
        let app = build_state(
            settings,
            Arc::new(ConsoleDialogs),
            Arc::new(ConsolePermissionPrompt::new(input.clone())),
            data_dir.join("stamps"),
        )
        .await?;

        let printer = spawn_event_printer(&app.state.event_bus);
        let result = console_loop(&app.state, input).await;

        printer.abort();
        app.store.close().await;
        info!("已关闭数据库连接");
        result
    })
}
