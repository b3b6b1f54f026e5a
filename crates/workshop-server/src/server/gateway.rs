//! JSON/HTTP mapping of both services.
//!
//! Handlers decode the JSON body, call the gRPC facade exactly like a gRPC
//! client would and translate the resulting `Status` into an HTTP response.
//! Field names follow the proto messages.
//!
//! | Method | Path | Operation |
//! |---|---|---|
//! | POST | `/v1/workshop/cars` | `Workshop.AcceptCar` |
//! | PUT | `/v1/workshop/cars/{car_id}/paint` | `Workshop.PaintCar` |
//! | GET | `/v1/workshop/cars/{car_id}` | `Workshop.RetrieveCar` |
//! | PUT | `/v1/workshop/cars/{car_id}/painted` | `Workshop.CarPainted` |
//! | POST | `/v1/subworkshop/paint` | `SubWorkshop.PaintCar` |

use crate::server::service::{SubWorkshopService, WorkshopService};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tonic::{Code, Request, Status};
use tower_http::trace::TraceLayer;
use workshop_core::proto::{
    self, CarBody, PaintCarRequest, PaintFinishedRequest, RetrieveCarRequest,
    SubPaintCarRequest, sub_workshop_server::SubWorkshop, workshop_server::Workshop,
};

/// Routes for the services this process serves. A `None` service has no
/// routes.
pub fn router(
    workshop: Option<WorkshopService>,
    sub_workshop: Option<SubWorkshopService>,
) -> Router {
    let mut router = Router::new();

    if let Some(workshop) = workshop {
        router = router.merge(
            Router::new()
                .route("/v1/workshop/cars", post(accept_car))
                .route("/v1/workshop/cars/{car_id}", get(retrieve_car))
                .route("/v1/workshop/cars/{car_id}/paint", put(paint_car))
                .route("/v1/workshop/cars/{car_id}/painted", put(car_painted))
                .with_state(workshop),
        );
    }

    if let Some(sub_workshop) = sub_workshop {
        router = router.merge(
            Router::new()
                .route("/v1/subworkshop/paint", post(sub_paint_car))
                .with_state(sub_workshop),
        );
    }

    router.layer(TraceLayer::new_for_http())
}

#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CarJson {
    pub id: String,
    pub owner: String,
    pub body_style: String,
    pub color: String,
}

impl TryFrom<CarJson> for proto::Car {
    type Error = Status;

    fn try_from(car: CarJson) -> Result<Self, Self::Error> {
        let body_style = if car.body_style.is_empty() {
            CarBody::default()
        } else {
            CarBody::from_str_name(&car.body_style.to_ascii_uppercase()).ok_or_else(|| {
                Status::invalid_argument(format!("unknown body style {}", car.body_style))
            })?
        };

        Ok(Self {
            id: car.id,
            owner: car.owner,
            body_style: body_style.into(),
            color: car.color,
        })
    }
}

impl From<proto::Car> for CarJson {
    fn from(car: proto::Car) -> Self {
        Self {
            body_style: car.body_style().as_str_name().to_owned(),
            id: car.id,
            owner: car.owner,
            color: car.color,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ColorJson {
    pub desired_color: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubPaintJson {
    pub car: Option<CarJson>,
    pub desired_color: String,
    pub callback_service_address: String,
}

/// Body of a successful call without a result.
#[derive(Debug, Serialize)]
pub struct Empty {}

/// A gRPC status rendered as `{"code": .., "message": ..}`.
#[derive(Debug)]
pub struct ApiError(pub Status);

impl From<Status> for ApiError {
    fn from(status: Status) -> Self {
        Self(status)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(Status::invalid_argument(rejection.body_text()))
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: i32,
    message: &'a str,
}

pub const fn http_status(code: Code) -> StatusCode {
    match code {
        Code::Ok => StatusCode::OK,
        Code::InvalidArgument | Code::FailedPrecondition => StatusCode::BAD_REQUEST,
        Code::NotFound => StatusCode::NOT_FOUND,
        Code::AlreadyExists => StatusCode::CONFLICT,
        Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        Code::Cancelled => StatusCode::REQUEST_TIMEOUT,
        Code::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.0.code() as i32,
            message: self.0.message(),
        };
        (http_status(self.0.code()), Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

async fn accept_car(
    State(workshop): State<WorkshopService>,
    payload: Result<Json<CarJson>, JsonRejection>,
) -> ApiResult<Empty> {
    let Json(car) = payload?;
    workshop
        .accept_car(Request::new(proto::Car::try_from(car)?))
        .await?;
    Ok(Json(Empty {}))
}

async fn paint_car(
    State(workshop): State<WorkshopService>,
    Path(car_id): Path<String>,
    payload: Result<Json<ColorJson>, JsonRejection>,
) -> ApiResult<Empty> {
    let Json(body) = payload?;
    workshop
        .paint_car(Request::new(PaintCarRequest {
            car_id,
            desired_color: body.desired_color,
        }))
        .await?;
    Ok(Json(Empty {}))
}

async fn retrieve_car(
    State(workshop): State<WorkshopService>,
    Path(car_id): Path<String>,
) -> ApiResult<CarJson> {
    let car = workshop
        .retrieve_car(Request::new(RetrieveCarRequest { car_id }))
        .await?
        .into_inner();
    Ok(Json(car.into()))
}

async fn car_painted(
    State(workshop): State<WorkshopService>,
    Path(car_id): Path<String>,
    payload: Result<Json<ColorJson>, JsonRejection>,
) -> ApiResult<Empty> {
    let Json(body) = payload?;
    workshop
        .car_painted(Request::new(PaintFinishedRequest {
            car_id,
            desired_color: body.desired_color,
        }))
        .await?;
    Ok(Json(Empty {}))
}

async fn sub_paint_car(
    State(sub_workshop): State<SubWorkshopService>,
    payload: Result<Json<SubPaintJson>, JsonRejection>,
) -> ApiResult<Empty> {
    let Json(body) = payload?;
    let car = match body.car.map(proto::Car::try_from).transpose() {
        Ok(car) => car,
        // A missing callback address is reported before a bad car.
        Err(_) if body.callback_service_address.is_empty() => None,
        Err(status) => return Err(status.into()),
    };
    sub_workshop
        .paint_car(Request::new(SubPaintCarRequest {
            car,
            desired_color: body.desired_color,
            callback_service_address: body.callback_service_address,
        }))
        .await?;
    Ok(Json(Empty {}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::controller::testing::{RecordingNotifier, RecordingPainter};
    use crate::server::controller::{SubWorkshopController, WorkshopController};
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request as HttpRequest};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;
    use workshop_core::store::InMemoryCarStore;

    fn workshop_router() -> Router {
        let controller = WorkshopController::new(
            Arc::new(InMemoryCarStore::new()),
            RecordingPainter::ok(),
            ":5380",
        );
        router(Some(WorkshopService::new(controller)), None)
    }

    async fn call(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = HttpRequest::builder().method(method).uri(uri);
        let body = match body {
            Some(body) => {
                request = request.header("content-type", "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let response = router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[test]
    fn maps_grpc_codes_to_http() {
        assert_eq!(http_status(Code::InvalidArgument), StatusCode::BAD_REQUEST);
        assert_eq!(http_status(Code::FailedPrecondition), StatusCode::BAD_REQUEST);
        assert_eq!(http_status(Code::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(http_status(Code::AlreadyExists), StatusCode::CONFLICT);
        assert_eq!(http_status(Code::Unavailable), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(http_status(Code::Cancelled), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(http_status(Code::DeadlineExceeded), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(http_status(Code::Internal), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(http_status(Code::Unknown), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn car_lifecycle_over_json() {
        let router = workshop_router();

        let car = json!({
            "id": "ABCD1234",
            "owner": "Alice",
            "body_style": "coupe",
            "color": "white",
        });
        let (status, body) =
            call(&router, Method::POST, "/v1/workshop/cars", Some(car.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));

        let (status, body) = call(&router, Method::POST, "/v1/workshop/cars", Some(car)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], json!(Code::AlreadyExists as i32));
        assert_eq!(body["message"], json!("car ABCD1234 already exists"));

        let (status, _) = call(
            &router,
            Method::PUT,
            "/v1/workshop/cars/ABCD1234/painted",
            Some(json!({ "desired_color": "green" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&router, Method::GET, "/v1/workshop/cars/ABCD1234", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "id": "ABCD1234", "owner": "Alice", "body_style": "COUPE", "color": "green" })
        );

        let (status, _) = call(&router, Method::GET, "/v1/workshop/cars/ABCD1234", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn retrieving_an_unpainted_car_is_a_bad_request() {
        let router = workshop_router();
        let car = json!({ "id": "ABCD1234", "owner": "Alice", "color": "white" });
        call(&router, Method::POST, "/v1/workshop/cars", Some(car)).await;

        let (status, body) = call(&router, Method::GET, "/v1/workshop/cars/ABCD1234", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], json!("car ABCD1234 is not painted"));
    }

    #[tokio::test]
    async fn validation_errors_are_bad_requests() {
        let router = workshop_router();

        let (status, body) = call(
            &router,
            Method::PUT,
            "/v1/workshop/cars/ABCD1234/paint",
            Some(json!({ "desired_color": "purple" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], json!("out of ink for purple"));

        let car = json!({ "id": "ABCD1234", "body_style": "limousine" });
        let (status, body) = call(&router, Method::POST, "/v1/workshop/cars", Some(car)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], json!("unknown body style limousine"));
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let router = workshop_router();
        let response = router
            .oneshot(
                HttpRequest::builder()
                    .method(Method::POST)
                    .uri("/v1/workshop/cars")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn only_served_roles_are_routed() {
        let router = workshop_router();
        let (status, _) = call(
            &router,
            Method::POST,
            "/v1/subworkshop/paint",
            Some(json!({ "desired_color": "red" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn sub_workshop_paint_calls_back() {
        let notifier = RecordingNotifier::ok();
        let router = router(
            None,
            Some(SubWorkshopService::new(SubWorkshopController::new(
                notifier.clone(),
            ))),
        );

        let (status, body) = call(
            &router,
            Method::POST,
            "/v1/subworkshop/paint",
            Some(json!({
                "car": { "id": "ABCD1234", "owner": "Alice" },
                "desired_color": "red",
                "callback_service_address": ":5380",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(notifier.calls().len(), 1);

        let (status, body) = call(
            &router,
            Method::POST,
            "/v1/subworkshop/paint",
            Some(json!({ "car": { "id": "ABCD1234" }, "desired_color": "red" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            json!("callback service address cannot be empty")
        );
        assert_eq!(notifier.calls().len(), 1);
    }

    #[tokio::test]
    async fn sub_workshop_checks_callback_address_before_the_car() {
        let notifier = RecordingNotifier::ok();
        let router = router(
            None,
            Some(SubWorkshopService::new(SubWorkshopController::new(
                notifier.clone(),
            ))),
        );

        let (status, body) = call(
            &router,
            Method::POST,
            "/v1/subworkshop/paint",
            Some(json!({
                "car": { "id": "ABCD1234", "body_style": "limousine" },
                "desired_color": "red",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            json!("callback service address cannot be empty")
        );

        let (status, body) = call(
            &router,
            Method::POST,
            "/v1/subworkshop/paint",
            Some(json!({
                "car": { "id": "ABCD1234", "body_style": "limousine" },
                "desired_color": "red",
                "callback_service_address": ":5380",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], json!("unknown body style limousine"));
        assert!(notifier.calls().is_empty());
    }
}
