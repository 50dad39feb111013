use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod common;
mod conf;
mod model;
mod service;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化配置
    let config = conf::Settings::global();

    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log.level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 启动前校验查询地址
    let endpoint = config.api.availability_endpoint()?;
    tracing::info!(
        "polling {} into {}",
        endpoint,
        config.storage.output_file.display()
    );

    // 上次保存的结果
    if let Ok(previous) = service::storage::load(&config.storage.output_file).await {
        if let Some((first, last)) = previous.date_range() {
            tracing::debug!("previous snapshot covers {} to {}", first, last);
        }
    }

    let mut poller = service::Poller::new(config);
    poller.run().await;

    Ok(())
}
