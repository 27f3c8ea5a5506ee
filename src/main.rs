use actix_web::{web, App, HttpServer};
use log::{info, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::sync::Arc;
use ticket_calendar_scraper::app_state::AppState;
use ticket_calendar_scraper::config::Config;
use ticket_calendar_scraper::handlers;

const LOG_CONFIG: &str = "log4rs.yml";

fn init_logging() {
    if log4rs::init_file(LOG_CONFIG, Default::default()).is_ok() {
        return;
    }

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}")))
        .build();
    let fallback = log4rs::config::Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info));

    match fallback {
        Ok(config) => {
            if let Err(e) = log4rs::init_config(config) {
                eprintln!("Failed to initialise logging: {}", e);
            }
        }
        Err(e) => eprintln!("Invalid fallback logging config: {}", e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logging();

    let config = Config::load();
    info!(
        "Target: {} ({} months), storage: {:?} bucket {}",
        config.site.target_url, config.site.max_months, config.storage.kind, config.storage.bucket
    );

    let data = web::Data::new(AppState::new(
        Arc::new(config.create_source()),
        config.storage.create_sink(),
    ));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .configure(handlers::configure)
    })
    .bind(&config.bind_addr)?;

    info!("Listening on {}", config.bind_addr);
    server.run().await
}
