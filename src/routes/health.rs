use actix_web::{HttpResponse, Responder};

#[derive(serde::Serialize)]
struct HealthReport {
    ok: bool,
    status: &'static str,
}

pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthReport {
        ok: true,
        status: "healthy",
    })
}
