//! HTTP客户端集成测试：在本地端口上启动桩后端

use axum::extract::{Json, Multipart, Path};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::Router;
use hms_client::{ClientConfig, HmsApi, HttpApiClient};
use hms_core::{
    AppointmentStatus, Credentials, HmsError, Listing, LoginOutcome, NewDoctor, Role,
};
use serde_json::{json, Value};
use std::time::Duration;

async fn doctor_login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] == "x" {
        (StatusCode::OK, Json(json!({"success": true, "id": 7})))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "error": "Invalid credentials"})),
        )
    }
}

async fn doctors() -> Json<Value> {
    Json(json!({"doctors": [
        {"id": 1, "name": "Dr. Rao", "specialization": "Cardiology", "rating": "4.5"},
        {"id": 2}
    ]}))
}

async fn bills(Path(user_id): Path<u64>) -> Json<Value> {
    assert_eq!(user_id, 4);
    Json(json!([]))
}

async fn status_update(Path(id): Path<u64>, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({"message": format!("Appointment {} is now {}", id, body["status"].as_str().unwrap_or("?"))}))
}

async fn profile(Path(user_id): Path<u64>) -> Json<Value> {
    Json(json!({"user": {"id": user_id, "name": "Asha", "email": "asha@example.com", "phone": ""}}))
}

async fn add_doctor(mut multipart: Multipart) -> Json<Value> {
    let mut names = Vec::new();
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        names.push(field.name().unwrap_or_default().to_string());
    }
    Json(json!({"message": names.join(",")}))
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>")
}

async fn spawn_backend() -> HttpApiClient {
    let app = Router::new()
        .route("/api/doctor/login/", post(doctor_login))
        .route("/api/doctors/", get(doctors))
        .route("/bills/user/:id/", get(bills))
        .route("/appointments/:id/status/", patch(status_update))
        .route("/api/users/:id/", get(profile))
        .route("/add-doctor/", post(add_doctor))
        .route("/appointments/user/:id/", get(broken));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

    HttpApiClient::new(ClientConfig {
        base_url: format!("http://{}", addr),
        request_timeout: Duration::from_secs(5),
    })
    .expect("client")
}

fn credentials(password: &str) -> Credentials {
    Credentials {
        email: "a@b.com".to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_doctor_login_accepted() {
    let client = spawn_backend().await;
    let outcome = client.login(Role::Doctor, &credentials("x")).await.unwrap();
    match outcome {
        LoginOutcome::Accepted(identity) => {
            assert_eq!(identity.id, 7);
            assert_eq!(identity.email, "a@b.com");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_doctor_login_rejected_carries_backend_message() {
    let client = spawn_backend().await;
    let err = client
        .login(Role::Doctor, &credentials("wrong"))
        .await
        .unwrap_err();
    match err {
        HmsError::Backend { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_doctor_directory_is_normalized() {
    let client = spawn_backend().await;
    let doctors = client.list_doctors().await.unwrap().into_vec();
    assert_eq!(doctors.len(), 2);
    assert_eq!(doctors[0].rating_label(), "4.5");
    assert_eq!(doctors[1].name, hms_core::DEFAULT_DOCTOR_NAME);
}

#[tokio::test]
async fn test_empty_bills() {
    let client = spawn_backend().await;
    let bills = client.user_bills(4).await.unwrap();
    assert_eq!(bills, Listing::Empty);
}

#[tokio::test]
async fn test_status_update_sends_capitalized_status() {
    let client = spawn_backend().await;
    let message = client
        .update_appointment_status(11, AppointmentStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(message, "Appointment 11 is now Confirmed");
}

#[tokio::test]
async fn test_profile_unwraps_user_envelope() {
    let client = spawn_backend().await;
    let profile = client.get_user(4).await.unwrap();
    assert_eq!(profile.id, 4);
    assert_eq!(profile.name, "Asha");
    assert_eq!(profile.phone, None);
}

#[tokio::test]
async fn test_add_doctor_sends_multipart_fields() {
    let client = spawn_backend().await;
    let message = client
        .add_doctor(&NewDoctor {
            name: "Dr. Rao".to_string(),
            email: "rao@hospital.org".to_string(),
            password: "secret".to_string(),
            specialization: "Cardiology".to_string(),
            address: "Ward 3".to_string(),
            phone: None,
            experience: Some("10".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(message, "name,email,password,specialization,address,experience");
}

#[tokio::test]
async fn test_non_json_error_body_gets_generic_message() {
    let client = spawn_backend().await;
    let err = client.user_appointments(4).await.unwrap_err();
    match err {
        HmsError::Backend { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Request failed with status 500");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let client = HttpApiClient::new(ClientConfig {
        base_url: format!("http://{}", addr),
        request_timeout: Duration::from_secs(2),
    })
    .unwrap();
    let err = client.list_doctors().await.unwrap_err();
    assert!(matches!(err, HmsError::Transport(_)));
}
