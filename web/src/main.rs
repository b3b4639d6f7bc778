//! Uniform OS sales dashboard

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use uos_adapter_pdf::PdfGeneratorClient;
use uos_adapter_supabase::{
    SupabaseAuth, SupabaseClient, SupabaseLeadRepository, SupabaseOfferRepository,
};
use uos_bootstrap::{MetricsRecorder, RuntimeConfig, init_runtime, shutdown_signal};
use uos_config::AppConfig;
use uos_web::application::SalesHandler;
use uos_web::state::AppState;
use uos_web::views::Views;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 文件可选
    dotenvy::dotenv().ok();

    // 加载配置
    let runtime = RuntimeConfig::from_env();
    let config = AppConfig::load(&runtime.config_dir)?;

    // 初始化 tracing
    init_runtime(&config);
    let metrics = MetricsRecorder::install();

    // 初始化远端协作方
    let supabase = SupabaseClient::new(&config.supabase)?;
    info!(url = %config.supabase.url, "Supabase client ready");
    let generator = PdfGeneratorClient::new(&config.pdf_generator, &config.supabase.anon_key)?;

    let handler = SalesHandler::new(
        Arc::new(SupabaseAuth::new(supabase.clone())),
        Arc::new(SupabaseLeadRepository::new(supabase.clone())),
        Arc::new(SupabaseOfferRepository::new(supabase)),
        Arc::new(generator),
    );
    let state = AppState::new(handler, Views::new()?, config.session.clone()).with_metrics(metrics);

    // 构建路由
    let app = uos_web::with_server_layers(
        uos_web::app(state),
        Duration::from_secs(config.server.request_timeout_secs),
    );

    // 启动服务器
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(%addr, "Starting sales dashboard");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
