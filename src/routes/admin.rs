use actix_web::{web, HttpResponse};

use crate::metrics::HitCounter;

/// GET /admin/metrics
pub async fn metrics(counter: web::Data<HitCounter>) -> HttpResponse {
    let body = format!(
        r#"<html>
<body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {} times!</p>
</body>
</html>"#,
        counter.hits()
    );

    HttpResponse::Ok().content_type("text/html").body(body)
}

/// POST /api/reset
pub async fn reset(counter: web::Data<HitCounter>) -> HttpResponse {
    counter.reset();
    tracing::info!("Hit counter reset");

    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(format!("Hits: {}", counter.hits()))
}
