/// CLI Interface Module
///
/// Command-line entry point for the batcher. Loads the rider roster, starts
/// the single-writer batching service, streams intake records into it and
/// renders every outcome through a report sink.
///
/// ## Responsibilities
/// - Parse command-line arguments
/// - Initialize logging and the optional observability server
/// - Drive intake (file, stdin or the built-in demo) through the service
/// - Print the end-of-run summary and export the snapshot

use crate::application::services::{BatchingService, EngineCommand, EngineOutput, SharedSnapshot};
use crate::domain::batcher::{BatchingConfig, BatchingEngine};
use crate::domain::error::EngineError;
use crate::domain::matching::MatchTolerance;
use crate::domain::validation::{OrderValidator, ValidationConfig, ValidationError};
use crate::infrastructure::observability::{HealthChecker, HealthStatus, ObservabilityServer};
use crate::interfaces::intake::{self, IntakeError};
use crate::interfaces::report::{JsonReport, ReportSink, TextReport};
use crate::shared::protocol::{EngineSnapshot, NewOrderRequest, ReadyTime, RiderSpec};
use clap::{Parser, ValueEnum};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, info, warn};

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// 人类可读文本
    Text,
    /// 每行一个 JSON 对象
    Json,
}

/// 配送批处理命令行配置
#[derive(Parser, Debug, Clone)]
#[command(name = "delivery-batcher")]
#[command(version)]
#[command(about = "Batches food-delivery orders and assigns them to the nearest rider", long_about = None)]
pub struct CliConfig {
    /// 骑手名单（JSON 数组），缺省使用演示名单
    #[arg(short, long)]
    pub riders: Option<PathBuf>,

    /// 订单流（JSON lines），"-" 表示标准输入
    #[arg(short, long, conflicts_with = "demo")]
    pub orders: Option<PathBuf>,

    /// 运行内置演示场景
    #[arg(long, default_value_t = false)]
    pub demo: bool,

    /// 出餐时间容差
    #[arg(short = 't', long, default_value_t = 10)]
    pub time_tolerance: u64,

    /// 厨房距离容差（规则 5）
    #[arg(short = 's', long, default_value_t = 1.0)]
    pub spatial_tolerance: f64,

    /// 最晚出餐时间，超出的订单被拒绝
    #[arg(long, default_value_t = ReadyTime::MAX, allow_negative_numbers = true)]
    pub max_ready_time: ReadyTime,

    /// 坐标绝对值上限（厨房与骑手）
    #[arg(long, default_value_t = 1_000_000.0)]
    pub max_coordinate: f64,

    /// 分配后自动进入待取餐状态
    #[arg(long, default_value_t = false)]
    pub auto_pickup: bool,

    /// 输出格式
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// 运行结束后写出快照 JSON
    #[arg(long)]
    pub snapshot_out: Option<PathBuf>,

    /// 可观测性端口（0 表示不启动）
    #[arg(short = 'm', long, default_value_t = 0)]
    pub metrics_port: u16,

    /// 日志级别
    #[arg(short = 'l', long, default_value = "info", value_parser = ["trace", "debug", "info", "warn", "error"])]
    pub log_level: String,

    /// 仅显示配置不处理订单（用于调试）
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

impl CliConfig {
    /// Engine tunables derived from the flags
    pub fn batching_config(&self) -> BatchingConfig {
        BatchingConfig {
            tolerance: MatchTolerance {
                time: self.time_tolerance,
                spatial: self.spatial_tolerance,
            },
            auto_waiting_pickup: self.auto_pickup,
        }
    }

    /// Intake bounds derived from the flags
    pub fn validation_config(&self) -> ValidationConfig {
        ValidationConfig {
            max_abs_coordinate: self.max_coordinate,
            max_ready_time: self.max_ready_time,
        }
    }

    fn source(&self) -> IntakeSource<'_> {
        match self.orders.as_deref() {
            Some(path) if path == Path::new("-") => IntakeSource::Stdin,
            Some(path) => IntakeSource::File(path),
            None => IntakeSource::Demo,
        }
    }
}

enum IntakeSource<'a> {
    Demo,
    Stdin,
    File(&'a Path),
}

/// CLI 错误
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error("invalid rider {rider_id}: {source}")]
    InvalidRider {
        rider_id: u64,
        #[source]
        source: ValidationError,
    },

    #[error("roster rejected: {0}")]
    Roster(#[from] EngineError),

    #[error("batching service stopped unexpectedly")]
    ServiceStopped,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Runs the CLI application
///
/// Parses command-line arguments, processes the intake and, when an
/// observability port is set, keeps serving until Ctrl-C.
pub async fn run() -> Result<(), CliError> {
    let config = CliConfig::parse();

    init_logging(&config.log_level);

    info!("配送批处理启动");
    info!("配置: {:?}", config);

    if config.dry_run {
        print_banner(&config);
        println!("\nDry-run 模式 - 不处理订单");
        return Ok(());
    }

    let stdout = io::stdout().lock();
    let snapshot = match config.format {
        OutputFormat::Text => execute(&config, &mut TextReport::new(stdout)).await?,
        OutputFormat::Json => execute(&config, &mut JsonReport::new(stdout)).await?,
    };

    info!(
        orders = snapshot.orders.len(),
        riders = snapshot.riders.len(),
        "intake finished"
    );

    if config.metrics_port != 0 {
        info!("按 Ctrl-C 退出");
        tokio::signal::ctrl_c().await?;
    }

    Ok(())
}

/// Processes one intake run against a fresh engine
///
/// Returns the final snapshot after the summary has been written to `sink`.
pub async fn execute(config: &CliConfig, sink: &mut dyn ReportSink) -> Result<EngineSnapshot, CliError> {
    let batching = config.batching_config();
    if !batching.tolerance.spatial.is_finite() || batching.tolerance.spatial < 0.0 {
        return Err(CliError::InvalidConfig(format!(
            "spatial tolerance must be a non-negative number, got {}",
            batching.tolerance.spatial
        )));
    }

    let bounds = config.validation_config();
    if bounds.max_abs_coordinate.is_nan() || bounds.max_abs_coordinate <= 0.0 {
        return Err(CliError::InvalidConfig(format!(
            "coordinate limit must be a positive number, got {}",
            bounds.max_abs_coordinate
        )));
    }

    let roster_validator = OrderValidator::with_config(bounds.clone());
    let roster = load_roster(config.riders.as_deref(), &roster_validator).await?;
    let engine = BatchingEngine::new(batching, roster)?;

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel();
    let mut service =
        BatchingService::with_validator(engine, OrderValidator::with_config(bounds), cmd_rx, out_tx);
    let snapshot = service.snapshot_handle();

    let health = if config.metrics_port != 0 {
        Some(spawn_observability(config.metrics_port, snapshot.clone()))
    } else {
        None
    };

    // 服务线程：阻塞式单写者循环
    let worker = tokio::task::spawn_blocking(move || service.run());

    let mut driver = Driver {
        commands: &cmd_tx,
        outputs: &mut out_rx,
        sink: &mut *sink,
    };
    let result = match config.source() {
        IntakeSource::Demo => driver.replay(intake::demo_orders()).await,
        IntakeSource::Stdin => driver.stream(BufReader::new(tokio::io::stdin())).await,
        IntakeSource::File(path) => match tokio::fs::File::open(path).await {
            Ok(file) => driver.stream(BufReader::new(file)).await,
            Err(source) => Err(IntakeError::Io {
                path: path.to_path_buf(),
                source,
            }
            .into()),
        },
    };

    // 关闭命令通道，等待服务退出
    drop(cmd_tx);
    let panicked = worker.await.is_err();
    if let Some(health) = &health {
        mark_service_stopped(health, panicked);
    }
    if panicked {
        return Err(CliError::ServiceStopped);
    }
    result?;

    let final_snapshot = snapshot.read().clone();
    sink.summary(&final_snapshot)?;

    if let Some(path) = &config.snapshot_out {
        write_snapshot(path, &final_snapshot).await?;
        info!(path = %path.display(), "snapshot written");
    }

    Ok(final_snapshot)
}

/// Feeds commands to the service one at a time and renders each output
struct Driver<'a> {
    commands: &'a UnboundedSender<EngineCommand>,
    outputs: &'a mut UnboundedReceiver<EngineOutput>,
    sink: &'a mut dyn ReportSink,
}

impl Driver<'_> {
    async fn dispatch(&mut self, command: EngineCommand) -> Result<(), CliError> {
        self.commands.send(command).map_err(|_| CliError::ServiceStopped)?;
        let output = self.outputs.recv().await.ok_or(CliError::ServiceStopped)?;
        self.sink.report(&output)?;
        Ok(())
    }

    async fn replay(&mut self, requests: Vec<NewOrderRequest>) -> Result<(), CliError> {
        for request in requests {
            self.dispatch(EngineCommand::SubmitOrder(request)).await?;
        }
        Ok(())
    }

    /// Malformed lines are logged and skipped; the run continues
    async fn stream<R: AsyncBufRead + Unpin>(&mut self, reader: R) -> Result<(), CliError> {
        let mut lines = reader.lines();
        let mut line_no = 0;
        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            match intake::parse_line(line_no, &line) {
                Ok(Some(record)) => self.dispatch(record.into()).await?,
                Ok(None) => {}
                Err(e) => warn!(error = %e, "skipping intake line"),
            }
        }
        Ok(())
    }
}

async fn load_roster(path: Option<&Path>, validator: &OrderValidator) -> Result<Vec<RiderSpec>, CliError> {
    let roster = match path {
        Some(path) => intake::load_roster(path).await?,
        None => intake::demo_roster(),
    };

    for rider in &roster {
        validator
            .validate_rider(rider)
            .map_err(|source| CliError::InvalidRider {
                rider_id: rider.rider_id,
                source,
            })?;
    }

    if roster.is_empty() {
        warn!("rider roster is empty, no batch can be assigned");
    }
    Ok(roster)
}

async fn write_snapshot(path: &Path, snapshot: &EngineSnapshot) -> Result<(), CliError> {
    let json = serde_json::to_vec_pretty(snapshot).map_err(io::Error::from)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Starts the observability server and hands back its health checker
fn spawn_observability(port: u16, snapshot: SharedSnapshot) -> Arc<HealthChecker> {
    let server = ObservabilityServer::new(port, snapshot);
    let health = server.health_checker();
    tokio::spawn(async move {
        if let Err(e) = server.run().await {
            error!(error = %e, "observability server stopped");
        }
    });
    health
}

/// 服务线程退出后不再接收订单：正常结束为降级，panic 为不健康
fn mark_service_stopped(health: &HealthChecker, panicked: bool) {
    let status = if panicked {
        HealthStatus::Unhealthy
    } else {
        HealthStatus::Degraded
    };
    health.set_status(status);
    if panicked {
        error!("batching service panicked");
    } else {
        info!("batching service stopped, no longer accepting orders");
    }
}

fn print_banner(config: &CliConfig) {
    let orders = match config.source() {
        IntakeSource::Demo => "demo".to_string(),
        IntakeSource::Stdin => "stdin".to_string(),
        IntakeSource::File(path) => path.display().to_string(),
    };
    let riders = config
        .riders
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "demo".to_string());

    println!("========================================");
    println!("  配送订单批处理 v{}", env!("CARGO_PKG_VERSION"));
    println!("========================================");
    println!("骑手名单:     {}", riders);
    println!("订单来源:     {}", orders);
    println!("时间容差:     {}", config.time_tolerance);
    println!("距离容差:     {}", config.spatial_tolerance);
    println!("最晚出餐:     {}", config.max_ready_time);
    println!("坐标上限:     {}", config.max_coordinate);
    println!("自动取餐:     {}", if config.auto_pickup { "启用" } else { "禁用" });
    println!("输出格式:     {:?}", config.format);
    println!("指标端口:     {}", config.metrics_port);
    println!("日志级别:     {}", config.log_level);
    println!("========================================");
}

/// 初始化日志系统
fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
