use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::{Json, Value};
use rocket::State;
use rocket::{post, routes};
use std::sync::Arc;
use tracing::warn;

use crate::state::{AppState, EventResponse};

/// Source tag carried by scheduler-originated events.
pub const SCHEDULED_EVENT_SOURCE: &str = "aws.events";

/// Generic dispatcher: scheduled events run the nightly policy, anything else is rejected.
#[post("/events", data = "<event>")]
pub async fn dispatch_event(
    event: Json<Value>,
    state: &State<Arc<AppState>>,
) -> Custom<Json<EventResponse>> {
    if event.get("source").and_then(Value::as_str) == Some(SCHEDULED_EVENT_SOURCE) {
        let response = state.run_schedule(state.now()).await;
        return Custom(Status::Ok, Json(response));
    }

    warn!("Unsupported event type");
    Custom(
        Status::BadRequest,
        Json(EventResponse {
            status_code: 400,
            body: "Unsupported event type".to_string(),
        }),
    )
}

#[post("/schedule/run")]
pub async fn run_schedule(state: &State<Arc<AppState>>) -> Json<EventResponse> {
    Json(state.run_schedule(state.now()).await)
}

pub fn routes() -> Vec<rocket::Route> {
    routes![dispatch_event, run_schedule]
}
