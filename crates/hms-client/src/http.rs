//! 基于reqwest的后端客户端

use crate::api::HmsApi;
use crate::endpoints;
use async_trait::async_trait;
use hms_core::{
    extract_message, Appointment, AppointmentStatus, Bill, BookingRequest, Credentials, Doctor,
    HmsError, Listing, LoginOutcome, NewDoctor, Prescription, ProfileUpdate, Result, Role,
    StatusUpdate, UserProfile,
};
use reqwest::{Method, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 客户端配置
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// 后端根地址
    pub base_url: String,
    /// 单个请求超时时间
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP后端客户端
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(HmsError::Config("API base URL is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| HmsError::Config(format!("cannot build HTTP client: {}", e)))?;

        info!("HTTP client targeting {}", base_url);
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }

    /// 发送请求并把响应转换为JSON或错误
    async fn execute(&self, request: RequestBuilder, what: &str) -> Result<Value> {
        let request_id = Uuid::new_v4().to_string();
        debug!(request_id = %request_id, "Sending {} request", what);

        let response = request
            .header("X-Request-ID", request_id.as_str())
            .send()
            .await
            .map_err(|e| {
                warn!(request_id = %request_id, "{} request failed: {}", what, e);
                if e.is_timeout() {
                    HmsError::Transport(format!("{} request timed out", what))
                } else {
                    HmsError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HmsError::Transport(e.to_string()))?;

        let value = if body.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&body) {
                Ok(value) => value,
                Err(e) if status.is_success() => {
                    return Err(HmsError::Payload(format!(
                        "{} returned invalid JSON: {}",
                        what, e
                    )))
                }
                Err(_) => Value::Null,
            }
        };

        if status.is_success() {
            debug!(request_id = %request_id, "{} request succeeded: {}", what, status);
            Ok(value)
        } else {
            let message = extract_message(&value)
                .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
            warn!(request_id = %request_id, "{} request rejected: {} {}", what, status, message);
            Err(HmsError::Backend {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn get(&self, path: &str, what: &str) -> Result<Value> {
        self.execute(self.request(Method::GET, path), what).await
    }
}

fn success_message(value: &Value, fallback: &str) -> String {
    extract_message(value).unwrap_or_else(|| fallback.to_string())
}

#[async_trait]
impl HmsApi for HttpApiClient {
    async fn login(&self, role: Role, credentials: &Credentials) -> Result<LoginOutcome> {
        info!("Login attempt for {} {}", role, credentials.email);
        let value = self
            .execute(
                self.request(Method::POST, endpoints::login(role))
                    .json(credentials),
                "login",
            )
            .await?;
        Ok(LoginOutcome::from_payload(role, &value, &credentials.email))
    }

    async fn list_doctors(&self) -> Result<Listing<Doctor>> {
        let value = self.get(endpoints::DOCTORS, "doctors").await?;
        Listing::from_payload(value, "doctors")
    }

    async fn get_user(&self, user_id: u64) -> Result<UserProfile> {
        let value = self.get(&endpoints::user(user_id), "profile").await?;
        let value = match value {
            Value::Object(mut map) if map.get("user").map_or(false, Value::is_object) => {
                map.remove("user").unwrap_or_default()
            }
            other => other,
        };
        serde_json::from_value(value)
            .map_err(|e| HmsError::Payload(format!("invalid profile: {}", e)))
    }

    async fn update_user(&self, user_id: u64, update: &ProfileUpdate) -> Result<String> {
        let value = self
            .execute(
                self.request(Method::PUT, &endpoints::user(user_id))
                    .json(update),
                "profile update",
            )
            .await?;
        Ok(success_message(&value, "Profile updated successfully"))
    }

    async fn user_appointments(&self, user_id: u64) -> Result<Listing<Appointment>> {
        let value = self
            .get(&endpoints::user_appointments(user_id), "appointments")
            .await?;
        Listing::from_payload(value, "appointments")
    }

    async fn doctor_appointments(&self, doctor_id: u64) -> Result<Listing<Appointment>> {
        let value = self
            .get(&endpoints::doctor_appointments(doctor_id), "appointments")
            .await?;
        Listing::from_payload(value, "appointments")
    }

    async fn update_appointment_status(
        &self,
        appointment_id: u64,
        status: AppointmentStatus,
    ) -> Result<String> {
        let value = self
            .execute(
                self.request(Method::PATCH, &endpoints::appointment_status(appointment_id))
                    .json(&StatusUpdate { status }),
                "status update",
            )
            .await?;
        Ok(success_message(&value, "Appointment status updated"))
    }

    async fn book_appointment(&self, request: &BookingRequest) -> Result<String> {
        let value = self
            .execute(
                self.request(Method::POST, endpoints::BOOK_APPOINTMENT)
                    .json(request),
                "booking",
            )
            .await?;
        Ok(success_message(&value, "Appointment booked successfully"))
    }

    async fn user_prescriptions(&self, user_id: u64) -> Result<Listing<Prescription>> {
        let value = self
            .get(&endpoints::user_prescriptions(user_id), "prescriptions")
            .await?;
        Listing::from_payload(value, "prescriptions")
    }

    async fn user_bills(&self, user_id: u64) -> Result<Listing<Bill>> {
        let value = self.get(&endpoints::user_bills(user_id), "bills").await?;
        Listing::from_payload(value, "bills")
    }

    async fn add_doctor(&self, doctor: &NewDoctor) -> Result<String> {
        let form = doctor
            .form_fields()
            .into_iter()
            .fold(reqwest::multipart::Form::new(), |form, (name, value)| {
                form.text(name, value)
            });
        let value = self
            .execute(
                self.request(Method::POST, endpoints::ADD_DOCTOR)
                    .multipart(form),
                "add doctor",
            )
            .await?;
        Ok(success_message(&value, "Doctor added successfully"))
    }
}
