//! # HTTP Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Method  Path                      Handler                 Store op     │
//! │  ──────  ────                      ───────                 ────────     │
//! │  GET     /employee                 employee::list          list_employees
//! │  POST    /employee                 employee::create        create_employee
//! │  DELETE  /employee                 employee::delete        delete_employee
//! │  GET     /employee/teller/info     employee::tellers       list_tellers │
//! │  GET     /receipt                  receipt::list           full_receipts│
//! │  POST    /receipt                  receipt::create         create_receipt
//! │  GET     /department/info          department::list        list_departments
//! │  GET     /product                  product::list_full      list_full_products
//! │  GET     /product/info             product::list           list_products│
//! │  GET     /supplier/info            supplier::list          list_suppliers
//! │  GET     /supplier/product/{id}    supplier::products      list_products_by_supplier
//! │  GET     /order                    order::list             full_supplier_orders
//! │  POST    /order                    order::create           create_supplier_order
//! │                                                                         │
//! │  anything else (path or method)    not_found  → 404 "404 Not Found"     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Successful writes answer 200 with an empty body. Failures answer 500
//! with the fixed body, see [`crate::error`]; that includes a request
//! exceeding the timeout and a panicking handler.

use std::any::Any;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::{header, HeaderName, HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{BoxError, Router};
use tower::timeout::error::Elapsed;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::{INTERNAL_ERROR_BODY, NOT_FOUND_BODY};
use crate::AppState;

pub mod department;
pub mod employee;
pub mod order;
pub mod product;
pub mod receipt;
pub mod supplier;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Cross-cutting HTTP settings applied as tower layers.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// The single origin allowed by CORS (credentials allowed).
    pub cors_origin: HeaderValue,

    /// Requests running longer than this are aborted.
    pub request_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings {
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            request_timeout: Duration::from_secs(90),
        }
    }
}

/// Request ID generator (UUID v4).
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Answer for unknown paths and for known paths with the wrong method.
async fn not_found(method: Method, uri: axum::http::Uri) -> (StatusCode, &'static str) {
    debug!(%method, %uri, "No route");
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY)
}

/// Turns a middleware error (the request timeout) into the fixed 500.
async fn middleware_failed(err: BoxError) -> (StatusCode, &'static str) {
    if err.is::<Elapsed>() {
        error!("Request timed out");
    } else {
        error!(error = %err, "Request failed in middleware");
    }
    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY)
}

/// A panicking handler still answers with the fixed 500.
fn handler_panicked(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    error!(panic = %detail, "Handler panicked");

    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response()
}

/// Build the router with every route, its state and the tower layers.
pub fn build_router(state: AppState, settings: &HttpSettings) -> Router {
    let routes = Router::new()
        .route(
            "/employee",
            get(employee::list)
                .post(employee::create)
                .delete(employee::delete)
                .fallback(not_found),
        )
        .route(
            "/employee/teller/info",
            get(employee::tellers).fallback(not_found),
        )
        .route(
            "/receipt",
            get(receipt::list).post(receipt::create).fallback(not_found),
        )
        .route(
            "/department/info",
            get(department::list).fallback(not_found),
        )
        .route("/product", get(product::list_full).fallback(not_found))
        .route("/product/info", get(product::list).fallback(not_found))
        .route("/supplier/info", get(supplier::list).fallback(not_found))
        .route(
            "/supplier/product/{id}",
            get(supplier::products).fallback(not_found),
        )
        .route(
            "/order",
            get(order::list).post(order::create).fallback(not_found),
        )
        .fallback(not_found)
        .with_state(state);

    apply_layers(routes, settings)
}

/// Wraps routes in the cross-cutting layers.
///
/// ```text
/// request ─► set x-request-id ─► propagate ─► trace ─► CORS ─► timeout ─► catch panic ─► handler
/// ```
fn apply_layers(routes: Router, settings: &HttpSettings) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(settings.cors_origin.clone())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    routes
        .layer(CatchPanicLayer::custom(handler_panicked))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(middleware_failed))
                .layer(TimeoutLayer::new(settings.request_timeout)),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use backoffice_core::Money;
    use backoffice_db::{InMemoryStore, Store};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;


    async fn seeded_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.add_department(1, "Grocery", "Hall A").await;
        store.add_department(2, "Dairy", "Hall B").await;
        store
            .add_product(1, "Milk", Money::from_units(700), "dairy", 40, 2)
            .await;
        store
            .add_product(9, "Flour", Money::from_units(50), "bakery", 100, 1)
            .await;
        store.add_supplier(5, "Acme").await;
        store.add_loyalty_card(42, 42).await;
        store
    }

    fn app(store: InMemoryStore) -> Router {
        let state = AppState {
            store: Arc::new(store),
        };
        build_router(state, &HttpSettings::default())
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        app.clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn get_json(app: &Router, uri: &str) -> Value {
        let response = send(app, Method::GET, uri, None).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    async fn hire_teller(app: &Router) {
        let response = send(
            app,
            Method::POST,
            "/employee",
            Some(json!({
                "first_name": "Anna",
                "last_name": "Ivanova",
                "middle_name": "S",
                "position": "cashier",
                "salary": 1200,
                "department_id": 1
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_receipt_round_trip() {
        let app = app(seeded_store().await);
        hire_teller(&app).await;

        let response = send(
            &app,
            Method::POST,
            "/receipt",
            Some(json!({
                "teller_id": 1,
                "loyalty_card_number": 0,
                "products": [{"product_id": 1, "quantity": 2, "price": 700, "amount": 1400}]
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.is_empty());

        let receipts = get_json(&app, "/receipt").await;
        let receipt = &receipts[0];
        assert_eq!(receipts.as_array().unwrap().len(), 1);
        assert_eq!(receipt["teller_first_name"], "Anna");
        assert!(receipt["loyalty_card_number"].is_null());
        assert_eq!(receipt["total"].as_f64(), Some(1400.0));
        assert_eq!(receipt["products"].as_array().unwrap().len(), 1);
        assert_eq!(receipt["products"][0]["name"], "Milk");
        assert_eq!(receipt["products"][0]["quantity"], 2);
        assert_eq!(receipt["products"][0]["price"].as_f64(), Some(700.0));
        assert_eq!(receipt["products"][0]["amount"].as_f64(), Some(1400.0));
    }

    #[tokio::test]
    async fn test_supplier_order_round_trip() {
        let app = app(seeded_store().await);

        let response = send(
            &app,
            Method::POST,
            "/order",
            Some(json!({
                "supplier_id": 5,
                "supplier_order_items": [{"product_id": 9, "quantity": 3, "price": 50}]
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let orders = get_json(&app, "/order").await;
        let order = &orders[0];
        assert_eq!(order["supplier_name"], "Acme");
        assert!(order["date_of_receipt"].is_null());
        assert_eq!(order["supplier_order_items"][0]["product_id"], 9);
        assert_eq!(order["supplier_order_items"][0]["quantity"], 3);
        assert_eq!(order["supplier_order_items"][0]["amount"].as_f64(), Some(150.0));

        let products = get_json(&app, "/supplier/product/5").await;
        assert_eq!(products, json!([{"id": 9, "name": "Flour"}]));
    }

    #[tokio::test]
    async fn test_failed_receipt_is_opaque_and_leaves_nothing() {
        let store = seeded_store().await;
        let app = app(store.clone());
        hire_teller(&app).await;

        let response = send(
            &app,
            Method::POST,
            "/receipt",
            Some(json!({
                "teller_id": 1,
                "products": [
                    {"product_id": 1, "quantity": 1, "price": 700, "amount": 700},
                    {"product_id": 404, "quantity": 1, "price": 1, "amount": 1}
                ]
            })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, INTERNAL_ERROR_BODY);
        assert_eq!(store.receipt_count().await, 0);
        assert_eq!(get_json(&app, "/receipt").await, json!([]));
    }

    #[tokio::test]
    async fn test_overflowing_order_amount_is_500() {
        let store = seeded_store().await;
        let app = app(store.clone());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/order")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"supplier_id":5,"supplier_order_items":[{"product_id":9,"quantity":2,"price":50000000000000000000000000000}]}"#,
            ))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, INTERNAL_ERROR_BODY);
        assert_eq!(store.supplier_order_count().await, 0);
    }

    #[tokio::test]
    async fn test_overflowing_receipt_total_is_500() {
        let store = seeded_store().await;
        let app = app(store.clone());
        hire_teller(&app).await;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/receipt")
            .body(Body::from(
                r#"{"teller_id":1,"products":[
                    {"product_id":1,"quantity":1,"price":1,"amount":50000000000000000000000000000},
                    {"product_id":9,"quantity":1,"price":1,"amount":50000000000000000000000000000}
                ]}"#,
            ))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, INTERNAL_ERROR_BODY);
        assert_eq!(store.receipt_count().await, 0);
    }

    #[tokio::test]
    async fn test_panicking_handler_is_500() {
        async fn explode() -> &'static str {
            panic!("handler bug")
        }
        let app = apply_layers(
            Router::new().route("/explode", get(explode)),
            &HttpSettings::default(),
        );

        let response = send(&app, Method::GET, "/explode", None).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, INTERNAL_ERROR_BODY);
    }

    #[tokio::test]
    async fn test_timeout_is_500_with_fixed_body() {
        async fn stall() -> &'static str {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "late"
        }
        let settings = HttpSettings {
            request_timeout: Duration::from_millis(20),
            ..HttpSettings::default()
        };
        let app = apply_layers(Router::new().route("/stall", get(stall)), &settings);

        let response = send(&app, Method::GET, "/stall", None).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, INTERNAL_ERROR_BODY);
    }

    #[tokio::test]
    async fn test_malformed_body_is_500() {
        let app = app(seeded_store().await);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/order")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, INTERNAL_ERROR_BODY);
    }

    #[tokio::test]
    async fn test_non_numeric_supplier_id_is_500() {
        let app = app(seeded_store().await);

        let response = send(&app, Method::GET, "/supplier/product/acme", None).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, INTERNAL_ERROR_BODY);
    }

    #[tokio::test]
    async fn test_store_failure_is_500() {
        let store = seeded_store().await.failing_operation("list_products");
        let app = app(store);

        let response = send(&app, Method::GET, "/product/info", None).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, INTERNAL_ERROR_BODY);
    }

    #[tokio::test]
    async fn test_unknown_route_and_wrong_method_are_404() {
        let app = app(InMemoryStore::new());

        let response = send(&app, Method::GET, "/nowhere", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, NOT_FOUND_BODY);

        let response = send(&app, Method::DELETE, "/receipt", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, NOT_FOUND_BODY);
    }

    #[tokio::test]
    async fn test_empty_listings_are_empty_arrays() {
        let app = app(InMemoryStore::new());

        for uri in [
            "/employee",
            "/employee/teller/info",
            "/receipt",
            "/department/info",
            "/product",
            "/product/info",
            "/supplier/info",
            "/supplier/product/5",
            "/order",
        ] {
            assert_eq!(get_json(&app, uri).await, json!([]), "GET {uri}");
        }
    }

    #[tokio::test]
    async fn test_catalog_listings() {
        let app = app(seeded_store().await);

        let departments = get_json(&app, "/department/info").await;
        assert_eq!(
            departments,
            json!([{"id": 1, "name": "Grocery"}, {"id": 2, "name": "Dairy"}])
        );

        let products = get_json(&app, "/product/info").await;
        assert_eq!(products[0]["id"], 1);
        assert_eq!(products[0]["name"], "Milk");
        assert_eq!(products[0]["quantity"], 40);

        let full = get_json(&app, "/product").await;
        assert_eq!(full[0]["department_name"], "Dairy");
        assert_eq!(full[1]["category"], "bakery");

        let suppliers = get_json(&app, "/supplier/info").await;
        assert_eq!(suppliers, json!([{"id": 5, "name": "Acme"}]));
    }

    #[tokio::test]
    async fn test_employee_lifecycle() {
        let store = seeded_store().await;
        let app = app(store.clone());
        hire_teller(&app).await;

        let response = send(
            &app,
            Method::POST,
            "/employee",
            Some(json!({
                "first_name": "Boris",
                "last_name": "Petrov",
                "middle_name": "A",
                "position": "manager",
                "salary": 2500.5,
                "department_id": 2
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let roster = get_json(&app, "/employee").await;
        assert_eq!(roster.as_array().unwrap().len(), 2);
        assert_eq!(roster[1]["department"], "Dairy");
        assert_eq!(roster[1]["salary"].as_f64(), Some(2500.5));

        let tellers = get_json(&app, "/employee/teller/info").await;
        assert_eq!(
            tellers,
            json!([{"id": 1, "first_name": "Anna", "last_name": "Ivanova", "middle_name": "S"}])
        );

        let response = send(&app, Method::DELETE, "/employee", Some(json!({"employee_id": 2}))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(store.list_employees().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_request_id_and_cors_headers() {
        let app = app(InMemoryStore::new());

        let request = Request::builder()
            .method(Method::GET)
            .uri("/supplier/info")
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
            "true"
        );
    }
}
