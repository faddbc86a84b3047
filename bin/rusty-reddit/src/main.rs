//! # Rusty-Reddit Binary
//!
//! The entry point that assembles the application based on compile-time features.

use actix_files::Files;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use rr_api::{configure_routes, middleware, ApiOptions, AppState};
use rr_config::{LogSettings, Settings};
use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

#[cfg(not(all(feature = "db-sqlite", feature = "storage-local", feature = "auth-simple")))]
compile_error!("rusty-reddit needs one database, one storage and one auth plugin enabled");

// Feature-gated imports: one implementation per port.
#[cfg(feature = "db-sqlite")]
use rr_db_sqlite::SqliteRepo;

#[cfg(feature = "storage-local")]
use rr_storage_local::LocalMediaStore;

#[cfg(feature = "auth-simple")]
use rr_auth_simple::{SimpleAuthProvider, TokenTtls};

/// `RUST_LOG` wins over the configured filter when set.
fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_tracing(&settings.log);

    // 1. Initialize Database Implementation
    #[cfg(feature = "db-sqlite")]
    let repo = SqliteRepo::with_max_connections(&settings.database.url, settings.database.max_connections)
        .await
        .with_context(|| format!("opening database {}", settings.database.url))?;

    // 2. Initialize Storage Implementation
    #[cfg(feature = "storage-local")]
    let store = {
        tokio::fs::create_dir_all(&settings.media.root)
            .await
            .with_context(|| format!("creating media root {}", settings.media.root))?;
        LocalMediaStore::new(settings.media.root.clone().into(), settings.media.url_prefix.clone())
    };

    // 3. Initialize Auth Implementation
    #[cfg(feature = "auth-simple")]
    let auth = SimpleAuthProvider::new(
        settings.auth.jwt_secret.expose_secret().as_bytes(),
        TokenTtls {
            access: chrono::Duration::seconds(settings.auth.access_ttl_secs),
            refresh: chrono::Duration::seconds(settings.auth.refresh_ttl_secs),
            session: chrono::Duration::seconds(settings.auth.session_ttl_secs),
        },
    );

    // 4. Wrap in AppState (dynamic dispatch keeps handlers plugin-agnostic)
    let state = web::Data::new(AppState {
        repo: Box::new(repo),
        store: Box::new(store),
        auth: Box::new(auth),
        options: ApiOptions {
            page_size: settings.pagination.page_size,
            max_image_bytes: settings.media.max_image_bytes,
            secure_cookies: settings.auth.secure_cookies,
            session_ttl_secs: settings.auth.session_ttl_secs,
        },
    });

    let (host, port) = settings.bind_address();
    let media_prefix = settings.media.url_prefix.trim_end_matches('/').to_string();
    let media_root = settings.media.root.clone();
    tracing::info!(%host, port, media = %media_prefix, "Rusty-Reddit starting");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::security_headers())
            .wrap(middleware::cors_policy())
            .wrap(middleware::standard_middleware())
            .service(Files::new(&media_prefix, &media_root))
            .configure(configure_routes)
    })
    .bind((host, port))?
    .run()
    .await?;

    Ok(())
}
