use ficct_talent::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Finished sessions stay readable this long before they are dropped from memory.
const FINISHED_SESSION_TTL_MINUTES: i64 = 60;
const IDLE_CV_TTL_MINUTES: i64 = 120;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ficct_talent=info,tower_http=info")),
        )
        .init();

    init_config()?;
    let config = get_config();

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool, config.clone())?;
    if !app_state.email_service.is_configured() {
        warn!("EMAIL_API_URL or EMAIL_API_KEY missing, CV shares will be simulated");
    }

    {
        let sessions = app_state.sessions.clone();
        let cvs = app_state.cv_service.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(300));
            loop {
                ticker.tick().await;
                let purged = sessions
                    .purge_finished(chrono::Duration::minutes(FINISHED_SESSION_TTL_MINUTES));
                if purged > 0 {
                    info!(purged, "dropped finished test sessions");
                }
                let purged = cvs.purge_idle(chrono::Duration::minutes(IDLE_CV_TTL_MINUTES));
                if purged > 0 {
                    info!(purged, "dropped idle CV editors");
                }
            }
        });
    }

    let app = routes::build_router(app_state);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
