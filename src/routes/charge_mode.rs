use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::State;
use rocket::{get, post, routes};
use std::sync::Arc;

use crate::models::ChargeMode;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ModeRequest {
    pub mode: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(crate = "rocket::serde")]
pub struct ModeResponse {
    pub mode: Option<ChargeMode>,
    pub message: String,
}

#[post("/charge-mode", data = "<request>")]
pub async fn set_mode(
    request: Json<ModeRequest>,
    state: &State<Arc<AppState>>,
) -> Custom<Json<ModeResponse>> {
    match request.mode.parse::<ChargeMode>() {
        Ok(mode) => {
            let message = state.set_mode(mode).await;
            Custom(
                Status::Ok,
                Json(ModeResponse {
                    mode: Some(mode),
                    message,
                }),
            )
        }
        Err(_) => Custom(
            Status::BadRequest,
            Json(ModeResponse {
                mode: None,
                message: "I didn't understand the mode. Please say 'grid' or 'solar'.".to_string(),
            }),
        ),
    }
}

#[get("/charge-mode")]
pub async fn get_mode(state: &State<Arc<AppState>>) -> Json<ModeResponse> {
    let (mode, message) = state.describe_mode().await;
    Json(ModeResponse { mode, message })
}

pub fn routes() -> Vec<rocket::Route> {
    routes![set_mode, get_mode]
}
