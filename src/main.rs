use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json,
};
use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use fare_predictor::error::PredictError;
use fare_predictor::features::{passenger_count_label, RateCode, TripDetails, TripType};
use fare_predictor::pipeline::FarePipeline;

const DISCLAIMER: &str =
    "This is an estimate. Actual fares may vary due to traffic, tolls, and other factors.";

// ---------- Server state ----------

#[derive(Clone)]
struct AppState {
    pipeline: Arc<FarePipeline>,
}

// ---------- Response types ----------

#[derive(serde::Serialize)]
struct FareOut {
    fare: f64,
    formatted: String,
    disclaimer: &'static str,
}

impl FareOut {
    fn new(fare: f64) -> Self {
        Self {
            fare,
            formatted: format!("{:.2}", fare),
            disclaimer: DISCLAIMER,
        }
    }
}

// ---------- Handlers ----------

async fn predict(
    State(state): State<AppState>,
    Json(details): Json<TripDetails>,
) -> Result<Json<FareOut>, (StatusCode, Json<serde_json::Value>)> {
    let vector = details.assemble().map_err(reject)?;
    let fare = state.pipeline.predict(&vector).map_err(reject)?;

    tracing::debug!(
        "predicted fare {:.2} (rate_code={} trip_type={} distance={:.2})",
        fare,
        details.rate_code.code(),
        details.trip_type.code(),
        details.trip_distance
    );

    Ok(Json(FareOut::new(fare)))
}

/// The closed selection sets the form offers, with display labels.
async fn options() -> Json<serde_json::Value> {
    Json(options_payload())
}

fn options_payload() -> serde_json::Value {
    json!({
        "rate_codes": RateCode::ALL
            .iter()
            .map(|c| json!({ "code": c.code(), "label": c.label() }))
            .collect::<Vec<_>>(),
        "trip_types": TripType::ALL
            .iter()
            .map(|t| json!({ "code": t.code(), "label": t.label() }))
            .collect::<Vec<_>>(),
        "passenger_counts": (1..=8u8)
            .map(|n| json!({ "count": n, "label": passenger_count_label(n) }))
            .collect::<Vec<_>>(),
    })
}

fn reject(err: PredictError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match err {
        PredictError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PredictError::Shape { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() })))
}

// ---------- Startup ----------

fn warmup_trip() -> TripDetails {
    TripDetails {
        rate_code: RateCode::Standard,
        pickup_longitude: -73.98,
        pickup_latitude: 40.75,
        dropoff_longitude: -73.98,
        dropoff_latitude: 40.75,
        passenger_count: 1,
        trip_distance: 1.0,
        extra: 0.0,
        improvement_surcharge: 0.3,
        trip_type: TripType::StreetHail,
        pickup_date: NaiveDate::from_ymd_opt(2015, 1, 1).expect("valid warmup date"),
        pickup_time: NaiveTime::from_hms_opt(0, 0, 0).expect("valid warmup time"),
        dropoff_date: NaiveDate::from_ymd_opt(2015, 1, 1).expect("valid warmup date"),
        dropoff_time: NaiveTime::from_hms_opt(0, 0, 0).expect("valid warmup time"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let scaler_path = std::env::var("SCALER_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("artifacts/scaler.json"));
    let model_path = std::env::var("MODEL_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("artifacts/model.json"));
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    let pipeline = FarePipeline::load(&scaler_path, &model_path)?;
    tracing::info!(
        "loaded pipeline: {} trees, scaler {:?}, model {:?}",
        pipeline.num_trees(),
        scaler_path,
        model_path
    );

    // Warmup prediction to surface artifact problems before serving.
    let fare = pipeline.predict(&warmup_trip().assemble()?)?;
    tracing::info!("warmup predict ok: {:.2}", fare);

    let state = AppState {
        pipeline: Arc::new(pipeline),
    };

    let app = axum::Router::new()
        .route("/predict", post(predict))
        .route("/options", get(options))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
