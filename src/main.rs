use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feed_service::db;
use feed_service::handlers;
use feed_service::security::jwt::JwtSigner;
use feed_service::services::{FeedService, MediaStore, PostService, ReactionService, VideoProbe};
use feed_service::Config;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting feed-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // Database pool + embedded migrations
    let pool = db::create_pool(&config.database.url, config.database.max_connections)
        .await
        .map_err(|e| io::Error::other(format!("failed to create database pool: {e}")))?;

    db::run_migrations(&pool)
        .await
        .map_err(|e| io::Error::other(format!("failed to run migrations: {e}")))?;

    tracing::info!("Connected to database, migrations applied");

    let media = MediaStore::new(&config.media.upload_dir);
    media.ensure_root().await?;

    let signer = JwtSigner::new(&config.auth);
    let probe = VideoProbe::new(&config.probe);
    let reactions = ReactionService::new(pool.clone());
    let posts = PostService::new(pool.clone());
    let feed = FeedService::new(pool.clone());

    let pool_data = web::Data::new(pool);
    let media_data = web::Data::new(media);
    let signer_data = web::Data::new(signer);
    let probe_data = web::Data::new(probe);
    let reactions_data = web::Data::new(reactions);
    let posts_data = web::Data::new(posts);
    let feed_data = web::Data::new(feed);

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(pool_data.clone())
            .app_data(media_data.clone())
            .app_data(signer_data.clone())
            .app_data(probe_data.clone())
            .app_data(reactions_data.clone())
            .app_data(posts_data.clone())
            .app_data(feed_data.clone())
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/health", web::get().to(handlers::health))
            // User directory
            .route("/users", web::post().to(handlers::register))
            .route("/users", web::get().to(handlers::list_users))
            .route("/users/{id}", web::get().to(handlers::get_user))
            .route("/users/{id}", web::put().to(handlers::update_user))
            .route("/users/{id}", web::delete().to(handlers::delete_user))
            .route("/login", web::post().to(handlers::login))
            // Posts & feed
            .route("/posts/{user_id}", web::post().to(handlers::create_post))
            .route("/posts", web::get().to(handlers::get_feed))
            // Reactions
            .route(
                "/posts/{post_id}/like/{user_id}",
                web::post().to(handlers::like_post),
            )
            .route(
                "/posts/{post_id}/like/{user_id}",
                web::delete().to(handlers::unlike_post),
            )
            .route(
                "/posts/{post_id}/dislike/{user_id}",
                web::post().to(handlers::dislike_post),
            )
            .route(
                "/posts/{post_id}/dislike/{user_id}",
                web::delete().to(handlers::undislike_post),
            )
            // Uploads
            .route("/upload", web::post().to(handlers::upload_file))
            .route("/uploads/{name}", web::get().to(handlers::serve_upload))
            // Video metadata
            .route("/api/video-info", web::post().to(handlers::video_info))
    })
    .bind(&bind_address)?
    .run()
    .await
}
