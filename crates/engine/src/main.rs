//! CineRec recommender service
//!
//! Loads the data directory, trains the collaborative model and serves
//! recommendations over HTTP.

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use cinerec_core::{init_logging, load_dotenv, ConfigLoader};
use cinerec_engine::server::{self, AppState};
use cinerec_engine::{DataSet, Recommender, RecommenderConfig};
use std::sync::Arc;
use tracing::{info, warn};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let config = RecommenderConfig::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    init_logging(&config.log_config()).context("Failed to initialise logging")?;

    info!(dir = %config.data.dir.display(), "Starting CineRec service");

    let data = DataSet::load(&config.data).context("Failed to load data set")?;
    let (catalog, ratings) = data
        .into_stores(config.ratings)
        .context("Failed to build catalog and rating stores")?;
    let recommender = Arc::new(Recommender::new(
        Arc::new(catalog),
        Arc::new(ratings),
        &config,
    ));

    let warm = Arc::clone(&recommender);
    match tokio::task::spawn_blocking(move || warm.warm_up())
        .await
        .context("Model training task panicked")?
    {
        Ok(()) => info!("Collaborative model ready"),
        Err(e) => warn!(
            error = %e,
            "Collaborative model unavailable, serving content-based recommendations only"
        ),
    }

    let state = AppState {
        recommender,
        default_top_n: config.recommendation.default_top_n,
    };

    let bind_address = config.bind_address();
    info!(address = %bind_address, "Listening");

    let mut http_server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(middleware::Logger::default())
            .configure(server::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?;

    if let Some(workers) = config.server.workers {
        http_server = http_server.workers(workers);
    }

    http_server.run().await?;
    Ok(())
}
