//! Command-line entry point for the storefront client.
//!
//! Restores the persisted session (refreshing it if it is about to expire),
//! signs in with `STOREFRONT_EMAIL`/`STOREFRONT_PASSWORD` when no session
//! exists, then prints the current user and the first page of products.
//! Finally runs the route guard over the account pages to show where an
//! anonymous visitor would be sent.

use anyhow::Result;
use std::env;
use std::sync::Arc;
use storefront::api::common::PageQuery;
use storefront::auth::guard::{GuardPolicy, RouteGuard, RouteMatch};
use storefront::navigation::{HistoryNavigator, Navigator};
use storefront::storage::{FileStorage, MemoryStorage, SessionStorage};
use storefront::{ApiClient, Config};
use tracing::{info, warn};
use tracing_subscriber::fmt::init;

#[tokio::main]
async fn main() -> Result<()> {
    init();

    let config = Config::from_env()?;
    let storage: Arc<dyn SessionStorage> = match &config.session_file {
        Some(path) => Arc::new(FileStorage::new(path)),
        None => Arc::new(MemoryStorage::new()),
    };

    let client = ApiClient::new(&config, storage)?;
    client.store().initialize().await;

    if !client.store().is_logged_in() {
        match (env::var("STOREFRONT_EMAIL"), env::var("STOREFRONT_PASSWORD")) {
            (Ok(email), Ok(password)) => {
                client.login(&email, &password).await?;
            }
            _ => warn!("No session and no STOREFRONT_EMAIL/STOREFRONT_PASSWORD, continuing anonymously"),
        }
    }

    if client.store().is_logged_in() {
        let user = client.current_user().await?;
        println!("{}", serde_json::to_string_pretty(&user)?);
    }

    let page = client.list_products(&PageQuery::default()).await?;
    info!(
        "Showing page {} of {} ({} products)",
        page.current, page.pages, page.total
    );
    println!("{}", serde_json::to_string_pretty(&page.records)?);

    let policy = GuardPolicy {
        routes: RouteMatch::prefixes(["/orders", "/admin"]),
        redirect_to: Some(config.login_path.clone()),
        ..Default::default()
    };
    let navigator = Arc::new(HistoryNavigator::new("/orders"));
    let guard = RouteGuard::new(policy, client.store().clone(), navigator.clone());
    match guard.evaluate().await {
        Some(target) => info!("Route guard sent /orders to {}", target),
        None => info!("Route guard allowed {}", navigator.current_path()),
    }

    Ok(())
}
