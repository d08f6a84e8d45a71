//! Bazaar API 主入口

use bazaar_api::{
    auth::{AccessGate, CredentialVerifier, PasswordHasher, TokenCodec},
    config::AppConfig,
    db,
    middleware::AppState,
    repository::{PgItemStore, PgUserStore, UserStore},
    routes,
    services::{seed_admin, AuthService},
    telemetry,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("bazaar-api {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("未知参数: {}", args[1]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // 加载 .env 文件（开发环境）
    // 按优先级加载：.env.local > .env.development > .env
    if let Ok(env) = std::env::var("BAZAAR_ENV") {
        dotenv::from_filename(format!(".env.{}", env)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::from_filename(".env.development").ok();
        dotenv::dotenv().ok();
    }

    // 1. 加载配置
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config.logging);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Bazaar API starting...");

    // 3. 数据库连接池 + 迁移
    let db_pool = db::create_pool(&config.database).await?;
    db::run_migrations(&db_pool).await?;

    tracing::info!("Database initialized");

    let pg_users = Arc::new(PgUserStore::new(db_pool.clone()));
    let users: Arc<dyn UserStore> = pg_users.clone();
    let items = Arc::new(PgItemStore::new(db_pool));
    let hasher = PasswordHasher::new();

    // 4. 初始化管理员
    let outcome = seed_admin(users.as_ref(), &hasher, &config.admin).await?;
    tracing::info!(?outcome, "Admin seeding finished");

    // 5. 访问控制：路由策略、令牌、凭据校验
    let registry = Arc::new(routes::route_registry()?);
    let tokens = Arc::new(TokenCodec::from_config(&config.security)?);
    let credentials = Arc::new(CredentialVerifier::new(pg_users, hasher.clone())?);
    let gate = Arc::new(AccessGate::new(registry, tokens.clone(), credentials.clone()));

    tracing::info!(
        routes = gate.registry().descriptors().count(),
        "Route policies registered"
    );

    let app_state = Arc::new(AppState {
        users,
        items,
        hasher,
        auth_service: Arc::new(AuthService::new(credentials, tokens)),
        gate,
    });

    // 6. 构建路由
    let app = routes::create_router(app_state);

    // 7. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, "Server listening");

    // 8. 优雅关闭
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.graceful_shutdown_timeout_secs))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
///
/// 收到信号后开始关闭；超过超时时间仍未结束则强制退出进程。
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }

    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_secs(timeout_secs)).await;
        tracing::warn!("Graceful shutdown timeout reached, forcing exit");
        std::process::exit(1);
    });
}

/// 打印帮助信息
fn print_help() {
    println!("bazaar-api {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: bazaar-api [选项]");
    println!();
    println!("选项:");
    println!("  --version     打印版本信息并退出");
    println!("  --help        打印此帮助信息并退出");
    println!();
    println!("环境变量:");
    println!("  所有配置通过 BAZAAR_ 前缀的环境变量完成");
    println!("  例如 BAZAAR_DATABASE__URL, BAZAAR_SECURITY__JWT_SECRET");
}
