use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::configuration::Settings;
use crate::logger::RequestLogger;
use crate::metrics::HitCounter;
use crate::middleware::HitCounterMiddleware;
use crate::routes::{
    create_chirp, create_user, delete_chirp, get_chirp, health_check, list_chirps, login, metrics,
    polka_webhook, refresh, reset, revoke, update_user,
};
use crate::store::Store;

pub fn run(listener: TcpListener, store: Store, settings: Settings) -> Result<Server, std::io::Error> {
    let store = web::Data::new(store);
    let issuer = web::Data::new(TokenIssuer::new(&settings.jwt));
    let polka = web::Data::new(settings.polka);
    let hits = Arc::new(HitCounter::default());
    let hits_data = web::Data::from(hits.clone());
    let static_dir = settings.application.static_dir;

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            // Shared state
            .app_data(store.clone())
            .app_data(issuer.clone())
            .app_data(polka.clone())
            .app_data(hits_data.clone())
            .route("/admin/metrics", web::get().to(metrics))
            .service(
                web::scope("/api")
                    .route("/healthz", web::get().to(health_check))
                    .route("/reset", web::post().to(reset))
                    .route("/chirps", web::post().to(create_chirp))
                    .route("/chirps", web::get().to(list_chirps))
                    .route("/chirps/{id}", web::get().to(get_chirp))
                    .route("/chirps/{id}", web::delete().to(delete_chirp))
                    .route("/users", web::post().to(create_user))
                    .route("/users", web::put().to(update_user))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/refresh", web::delete().to(revoke))
                    .route("/polka/webhooks", web::post().to(polka_webhook)),
            )
            // Static files, counted for /admin/metrics
            .service(
                web::scope("/app")
                    .wrap(HitCounterMiddleware::new(hits.clone()))
                    .service(fs::Files::new("/", &static_dir).index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
