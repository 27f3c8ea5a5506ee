use crate::app_state::AppState;
use crate::job::run_scrape_job;
use crate::metrics::track_run;
use crate::models::{ScrapeAccepted, ScrapeFailed};
use actix_web::{get, web, HttpResponse, Responder};
use log::{error, info};
use serde_json::json;

/// Run one scrape and publish the result.
///
/// 202 with the data URL on success, 500 with the error message otherwise.
pub async fn scrape(data: web::Data<AppState>) -> impl Responder {
    info!("Scrape requested");

    let outcome = track_run(
        &data.metrics,
        run_scrape_job(data.source.clone(), data.sink.as_ref()),
    )
    .await;

    match outcome {
        Ok(summary) => HttpResponse::Accepted().json(ScrapeAccepted::new(summary.data_url)),
        Err(e) => {
            error!("An error occurred: {}", e);
            HttpResponse::InternalServerError().json(ScrapeFailed::new(e.to_string()))
        }
    }
}

#[get("/metrics")]
async fn get_metrics(data: web::Data<AppState>) -> impl Responder {
    let metrics = data.metrics.snapshot();
    HttpResponse::Ok().json(json!({
        "success_rate": format!("{:.2}%", metrics.success_rate()),
        "metrics": metrics,
    }))
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({"status": "ok"}))
}

/// Register every route on an actix `App`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_metrics)
        .service(health)
        .route("/", web::get().to(scrape))
        .route("/", web::post().to(scrape));
}
