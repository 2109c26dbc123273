use std::net::TcpListener;

use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::header::CONTENT_TYPE;
use actix_web::middleware::Condition;
use actix_web::{web, App, HttpResponse, HttpServer};
use actix_web_lab::middleware::from_fn;
use tracing_actix_web::TracingLogger;

use crate::domain::application::AdminRecipient;
use crate::mail::send_email::EmailClient;
use crate::rate_limit::{enforce_rate_limit, RateLimiter};
use crate::routes::health::health_check;
use crate::routes::home::home;
use crate::routes::subscriptions::{subscribe, SubscribeReply};

/// Largest JSON body accepted by the API.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_BODY_BYTES)
        .error_handler(|err, _req| {
            let response = match &err {
                JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                    HttpResponse::PayloadTooLarge().json(SubscribeReply::failure("PAYLOAD_TOO_LARGE"))
                }
                _ => HttpResponse::BadRequest().json(SubscribeReply::failure("INVALID_BODY")),
            };
            tracing::warn!(error = %err, "Rejected request body");
            InternalError::from_response(err, response).into()
        })
}

fn cors(origin: Option<&str>) -> Cors {
    match origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allowed_methods(vec!["GET", "POST"])
            .allowed_header(CONTENT_TYPE)
            .max_age(3600),
        None => Cors::default(),
    }
}

pub fn run(
    listener: TcpListener,
    email_client: EmailClient,
    admin: AdminRecipient,
    rate_limiter: RateLimiter,
    cors_origin: Option<String>,
) -> Result<Server, std::io::Error> {
    let email_client = web::Data::new(email_client);
    let admin = web::Data::new(admin);
    let rate_limiter = web::Data::new(rate_limiter);

    Ok(HttpServer::new(move || {
        App::new()
            .wrap(from_fn(enforce_rate_limit))
            .wrap(Condition::new(
                cors_origin.is_some(),
                cors(cors_origin.as_deref()),
            ))
            .wrap(TracingLogger::default())
            .app_data(json_config())
            .route("/", web::get().to(home))
            .route("/health", web::get().to(health_check))
            .route("/api/subscribe", web::post().to(subscribe))
            .app_data(email_client.clone())
            .app_data(admin.clone())
            .app_data(rate_limiter.clone())
    })
    .listen(listener)?
    .run())
}
