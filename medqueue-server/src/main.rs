//! MedQueue 服务器主程序

use anyhow::{Context, Result};
use clap::Parser;
use medqueue_admin::{init_logging, AppConfig, ConfigValidator, FlowMetrics, StorageBackend};
use medqueue_core::FlowStore;
use medqueue_database::{DatabasePool, InMemoryStore, PostgresStore};
use medqueue_web::{AppState, AuthService, WebServer};
use medqueue_workflow::WorkflowEngine;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// MedQueue 服务器命令行参数
#[derive(Parser, Debug)]
#[command(name = "medqueue-server")]
#[command(about = "医院患者分诊与排队管理服务器")]
struct Args {
    /// 服务器端口，覆盖配置文件
    #[arg(short, long)]
    port: Option<u16>,

    /// 监听地址，覆盖配置文件
    #[arg(long)]
    host: Option<String>,

    /// 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别
    #[arg(short, long)]
    log_level: Option<String>,

    /// PostgreSQL 连接字符串，指定后使用 postgres 后端
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// 写出默认配置文件后退出
    #[arg(long)]
    write_default_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = args.write_default_config.as_deref() {
        AppConfig::write_default(path).await?;
        return Ok(());
    }

    let mut config = AppConfig::load(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    ConfigValidator::new().validate(&config)?;

    // 初始化日志
    init_logging(&config.logging)?;

    info!("Starting MedQueue server...");
    info!("  Listen: {}:{}", config.server.host, config.server.port);
    info!("  Storage: {:?}", config.database.backend);
    info!("  Workflow: {:?}", config.workflow);

    let store = open_store(&config).await?;
    let metrics = Arc::new(FlowMetrics::new()?);

    let engine = Arc::new(
        WorkflowEngine::with_settings(store, config.workflow_settings())
            .with_observer(metrics.clone()),
    );
    let auth = Arc::new(AuthService::new(engine.clone(), config.auth.session_ttl_hours));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!("Invalid listen address {}:{}", config.server.host, config.server.port)
        })?;

    let state = AppState {
        engine,
        auth,
        metrics: Some(metrics),
    };
    let server = WebServer::new(addr, state, config.server.request_timeout());

    if let Err(e) = server.run().await {
        error!("Server failed: {}", e);
        return Err(e.into());
    }

    Ok(())
}

fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if let Some(url) = &args.database_url {
        config.database.backend = StorageBackend::Postgres;
        config.database.url = url.clone();
    }
}

async fn open_store(config: &AppConfig) -> Result<Arc<dyn FlowStore>> {
    match config.database.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StorageBackend::Postgres => {
            let pool = DatabasePool::connect(&config.database.url, config.database.max_connections)
                .await
                .context("Failed to connect to PostgreSQL")?;
            let store = PostgresStore::new(pool);
            store
                .create_tables()
                .await
                .context("Failed to initialize database schema")?;
            info!("Connected to PostgreSQL");
            Ok(Arc::new(store))
        }
    }
}
