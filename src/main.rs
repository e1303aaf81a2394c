// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use rankcrawl::config::settings::Settings;
use rankcrawl::domain::services::{CrawlFilter, CrawlService, StaticDataService};
use rankcrawl::engines::fetcher::RateLimitedFetcher;
use rankcrawl::engines::rate_limiter::RateLimiter;
use rankcrawl::engines::reqwest_engine::ReqwestEngine;
use rankcrawl::infrastructure::database::connection;
use rankcrawl::infrastructure::repositories::MatchRepositoryImpl;
use rankcrawl::infrastructure::riot::Endpoints;
use rankcrawl::utils::telemetry;
use rankcrawl::workers::Pool;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// 主函数
///
/// 加载配置和静态数据，从种子玩家开始递归爬取，直到没有剩余任务或收到退出信号
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting rankcrawl...");

    // 2. Load configuration
    let settings = Settings::new()?;
    settings.validate()?;
    info!("Configuration loaded");

    if settings.metrics.enabled {
        rankcrawl::infrastructure::metrics::init_metrics(&settings.metrics.listen_addr);
    }

    // 3. Connect to database
    let db = Arc::new(connection::create_pool(&settings.database).await?);
    connection::ensure_schema(&db).await?;
    info!("Database connection established");

    // 4. Rate-limited transport
    let shutdown = CancellationToken::new();
    let transport = Arc::new(ReqwestEngine::new(
        settings.api_key(),
        Duration::from_secs(settings.http.timeout_secs),
    )?);
    let limiter = Arc::new(RateLimiter::from_settings(&settings.rate_limit));
    let fetcher = Arc::new(RateLimitedFetcher::new(
        transport,
        limiter.clone(),
        shutdown.clone(),
    ));
    let endpoints = Endpoints::from_settings(&settings.riot, &settings.crawl)?;

    // 5. Static data and crawl service
    let static_data = StaticDataService::new(fetcher.clone(), endpoints.clone())
        .load()
        .await?;
    let champion_id = static_data.target_champion_key(&settings.crawl.target_champion)?;
    info!(
        "Looking for {} (key {})",
        settings.crawl.target_champion, champion_id
    );

    let repository = Arc::new(MatchRepositoryImpl::new(db.clone()));
    let service = Arc::new(CrawlService::new(
        fetcher,
        endpoints,
        repository,
        CrawlFilter::from_settings(&settings.crawl, champion_id),
    ));

    // 6. Seeds and pool
    let players = service.seed_players(settings.crawl.seed_limit).await?;
    let workers = settings
        .pool
        .workers
        .unwrap_or_else(|| Pool::capacity_for(players.len()));
    let pool = Pool::new(workers, settings.pool.queue_capacity);

    let supervisor = tokio::spawn(handle_errors_and_signals(pool.clone(), shutdown.clone()));

    for player in players {
        debug!("Dispatch for player {}", player.summoner_name);
        pool.dispatch(service.crawl_job(player, &pool));
    }

    // 7. Wait for the crawl frontier to drain
    tokio::select! {
        _ = pool.wait_for_completion() => info!("Jobs completed"),
        _ = shutdown.cancelled() => info!("Crawl interrupted"),
    }

    shutdown.cancel();
    pool.close().await;
    let _ = supervisor.await;

    info!(
        "Channels closed, {} requests sent, {} players visited",
        limiter.total_consumed(),
        service.visited().len()
    );
    Ok(())
}

/// 记录任务错误，收到退出信号时取消运行并关闭工作池
async fn handle_errors_and_signals(pool: Arc<Pool>, shutdown: CancellationToken) {
    let Some(mut errors) = pool.take_errors() else {
        return;
    };

    loop {
        tokio::select! {
            err = errors.recv() => match err {
                Some(e) => error!("Error received '{}'", e),
                None => {
                    debug!("Stopped chan err");
                    return;
                }
            },
            _ = shutdown_signal() => {
                info!("Signal received, closing all");
                shutdown.cancel();
                pool.close().await;
            }
            _ = shutdown.cancelled() => {
                // drain what the workers reported before closing
                while let Ok(e) = errors.try_recv() {
                    error!("Error received '{}'", e);
                }
                return;
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Unable to listen for shutdown signal: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("Unable to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
