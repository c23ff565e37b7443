use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use validator::Validate;

use crate::database::{Database, FoodEntry};
use crate::food::resolve::{FoodResolver, IdentifyError, IdentifyRequest};
use crate::food::Nutrients;

const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024; // 10MB

#[derive(Clone)]
pub struct AppState {
    resolver: Arc<FoodResolver>,
    db: Arc<Database>,
}

#[derive(Serialize)]
struct ApiResponse {
    status: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Serialize)]
struct SaveFoodResponse {
    message: String,
    food: FoodEntry,
}

#[derive(Serialize)]
struct SummaryResponse {
    date: String,
    totals: Nutrients,
}

#[derive(Deserialize, Validate)]
pub struct AddFoodRequest {
    #[serde(rename = "mealType")]
    #[validate(length(min = 1, max = 50))]
    meal_type: String,
    #[validate(length(min = 1, max = 200))]
    name: String,
    #[serde(default)]
    nutrients: Nutrients,
    date: Option<String>,
}

#[derive(Deserialize)]
pub struct DateQuery {
    date: Option<String>,
}

/// Create and configure the API router
pub fn create_api(resolver: FoodResolver, db: Database) -> Router {
    let state = AppState {
        resolver: Arc::new(resolver),
        db: Arc::new(db),
    };

    // Fully permissive CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/api/identify", post(identify_handler))
        .route("/api/food/add", post(add_food_handler))
        .route("/api/food/my", get(my_foods_handler))
        .route("/api/food/summary", get(food_summary_handler))
        .route("/api/food/:id", delete(delete_food_handler))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 1024))
        .layer(cors)
        .with_state(state)
}

fn bad_request(error: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

async fn identify_handler(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut name: Option<String> = None;
    let mut image_data: Option<Vec<u8>> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return bad_request(format!("Failed to read multipart field: {}", e)),
        };

        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => match field.text().await {
                Ok(value) => name = Some(value),
                Err(e) => return bad_request(format!("Failed to read name field: {}", e)),
            },
            "image" => match field.bytes().await {
                Ok(data) => {
                    if data.len() > MAX_IMAGE_BYTES {
                        return bad_request(format!(
                            "Image too large. Max size is {} bytes",
                            MAX_IMAGE_BYTES
                        ));
                    }
                    if image::guess_format(&data).is_err() {
                        return bad_request(
                            "Uploaded file is not a recognizable image.".to_string(),
                        );
                    }
                    image_data = Some(data.to_vec());
                }
                Err(e) => return bad_request(format!("Failed to read image field: {}", e)),
            },
            _ => {}
        }
    }

    info!(
        "API /identify called (name: {}, image: {})",
        name.is_some(),
        image_data.is_some()
    );

    let request = IdentifyRequest {
        name,
        image: image_data,
    };

    match state.resolver.identify(request).await {
        Ok(identification) => Json(identification).into_response(),
        Err(e) => {
            let status = match &e {
                IdentifyError::ClassificationFailed | IdentifyError::MissingName => {
                    StatusCode::BAD_REQUEST
                }
                IdentifyError::NotFound(_) => StatusCode::NOT_FOUND,
                IdentifyError::Source(source_error) => {
                    error!("Food lookup failed: {}", source_error);
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (status, Json(ErrorResponse { error: e.to_string() })).into_response()
        }
    }
}

async fn add_food_handler(
    State(state): State<AppState>,
    Json(request): Json<AddFoodRequest>,
) -> Response {
    if let Err(e) = request.validate() {
        return bad_request(format!("Invalid food entry: {}", e));
    }

    let date = request.date.clone().unwrap_or_else(today);

    match state
        .db
        .save_food(
            request.meal_type.clone(),
            request.name.clone(),
            request.nutrients.clone(),
            date.clone(),
        )
        .await
    {
        Ok(id) => {
            info!(
                "Food saved: {} ({}) on {}",
                request.name, request.meal_type, date
            );
            Json(SaveFoodResponse {
                message: "Food saved".to_string(),
                food: FoodEntry {
                    id,
                    meal_type: request.meal_type,
                    name: request.name,
                    nutrients: request.nutrients,
                    date,
                    created_at: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                },
            })
            .into_response()
        }
        Err(e) => {
            error!("Save food error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to save food".to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn my_foods_handler(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Response {
    let date = query.date.unwrap_or_else(today);

    match state.db.foods_for_date(date).await {
        Ok(entries) => {
            info!("Fetched {} foods", entries.len());
            Json(entries).into_response()
        }
        Err(e) => {
            error!("Fetch foods error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch foods".to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn food_summary_handler(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Response {
    let date = query.date.unwrap_or_else(today);

    match state.db.daily_summary(date.clone()).await {
        Ok(totals) => Json(SummaryResponse { date, totals }).into_response(),
        Err(e) => {
            error!("Summary error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to compute summary".to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn delete_food_handler(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.db.delete_food(id).await {
        Ok(true) => {
            info!("Food deleted: {}", id);
            Json(MessageResponse {
                message: "Food deleted".to_string(),
            })
            .into_response()
        }
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Food not found".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Delete food error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to delete food".to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn health_check() -> Response {
    Json(ApiResponse {
        status: "Server is running and healthy".to_string(),
    })
    .into_response()
}
