use articles_feed_core::{init_logging, ArticleStore, FeedPool};
use articles_feed_server::config::ServerConfig;
use articles_feed_server::{router, AppState};
use log::{error, info, warn};
use std::error::Error;
use std::future::IntoFuture;
use std::process::ExitCode;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_exit module=main status=error error={err}");
            eprintln!("articles-feed: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = ServerConfig::from_env()?;
    init_logging(&config.log.level, config.log.dir.as_deref())?;

    let pool = FeedPool::open(
        &config.database.path,
        config.database.namespace.clone(),
        &config.database.pool,
    )
    .await?;
    let state = AppState::new(ArticleStore::new(pool), config.http.max_page_size);
    let app = router(state, &config.http);

    let listener = TcpListener::bind(config.http.addr).await?;
    info!(
        "event=server_start module=main status=ok addr={} db_path={} namespace={}",
        config.http.addr,
        config.database.path.display(),
        config.database.namespace
    );

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = stop_rx.await;
    });
    let mut server = tokio::spawn(server.into_future());

    tokio::select! {
        joined = &mut server => {
            joined??;
            return Ok(());
        }
        _ = shutdown_signal() => {}
    }

    info!("event=server_shutdown module=main status=start");
    let _ = stop_tx.send(());
    match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
        Ok(joined) => joined??,
        Err(_) => warn!(
            "event=server_shutdown module=main status=error error=grace_period_elapsed grace_ms={}",
            SHUTDOWN_GRACE.as_millis()
        ),
    }
    info!("event=server_shutdown module=main status=ok");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("event=signal_install module=main status=error error={err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("event=signal_install module=main status=error error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
