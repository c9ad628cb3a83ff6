use actix_cors::Cors;
use actix_web::{http::header, App, HttpServer};
use crypto_core::JwtKeys;
use db_pool::{create_pool as create_pg_pool, DbConfig as DbPoolConfig};
use persona_service::config::StorageBackend;
use persona_service::db::{MemoryStore, PgStore, Store, MIGRATOR};
use persona_service::handlers::auth::CookieSettings;
use persona_service::media::{CloudinaryClient, CloudinaryConfig, MediaHost};
use persona_service::{AppState, Config};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(|| fmt::layer()))
        .init();
}

async fn open_store(config: &Config) -> io::Result<Arc<dyn Store>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Postgres => {
            let db_cfg = DbPoolConfig::for_service(
                "persona-service",
                &config.storage.database_url,
                config.storage.max_connections,
            );
            db_cfg.log_config();

            let pool = create_pg_pool(db_cfg).await.map_err(|e| {
                io::Error::new(
                    io::ErrorKind::Other,
                    format!("Database pool creation failed: {e}"),
                )
            })?;

            MIGRATOR.run(&pool).await.map_err(|e| {
                io::Error::new(
                    io::ErrorKind::Other,
                    format!("Database migrations failed: {e}"),
                )
            })?;
            tracing::info!("Database migrations applied");

            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}

/// Persona Service
///
/// # Routes
///
/// - `/api/auth/*` - Register, login, logout, current account
/// - `/api/users/*` - Public account pages, settings, avatar, search
/// - `/api/profiles/*` - Personas of the signed-in account
/// - `/api/posts/*` - Posts, feeds, likes and comments
/// - `/api/health` - Liveness and readiness
#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.app.log_json);

    tracing::info!("Starting persona-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);
    persona_service::error::set_expose_detail(!config.app.is_production());

    let store = open_store(&config).await?;

    let cloudinary = CloudinaryConfig::new(
        &config.media.cloud_name,
        &config.media.api_key,
        &config.media.api_secret,
        &config.media.root_folder,
    );
    if !cloudinary.is_configured() {
        tracing::warn!("Cloudinary credentials not configured; image uploads will fail");
    }
    let media: Arc<dyn MediaHost> = Arc::new(CloudinaryClient::new(cloudinary).map_err(|e| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("Media client creation failed: {e}"),
        )
    })?);

    let jwt = Arc::new(JwtKeys::from_secret(
        &config.auth.jwt_secret,
        config.auth.jwt_expire_days,
    ));
    let cookies = CookieSettings {
        expire_days: config.auth.cookie_expire_days,
        secure: config.auth.secure_cookies,
    };

    let state = AppState::new(store, media, jwt, cookies, &config.app.default_avatar_url);

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let allowed_origins: Vec<String> = config
        .cors
        .origins()
        .into_iter()
        .map(str::to_string)
        .collect();

    let server = HttpServer::new(move || {
        // Credentialed requests need explicit origins, so `*` mirrors the caller
        let mut cors = Cors::default();
        for origin in &allowed_origins {
            if origin == "*" {
                cors = cors.allowed_origin_fn(|_, _| true);
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors
            .allow_any_method()
            .allowed_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .supports_credentials()
            .max_age(3600);

        let state = state.clone();
        App::new()
            .wrap(actix_middleware::Logging)
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(move |cfg| state.configure(cfg))
    })
    .bind(&bind_address)?
    .run();

    let server_handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received");
        server_handle.stop(true).await;
    });

    server.await?;
    tracing::info!("persona-service stopped");
    Ok(())
}
