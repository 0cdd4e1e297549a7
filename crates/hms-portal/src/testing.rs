//! 页面测试用的内存后端
//!
//! 每个操作返回预先设定的JSON（经过与真实客户端相同的归一化），并记录调用。

use crate::context::PortalContext;
use crate::navigation::Navigator;
use async_trait::async_trait;
use hms_client::HmsApi;
use hms_core::{
    extract_message, Appointment, AppointmentStatus, Bill, BookingRequest, Credentials, Doctor,
    HmsError, Identity, Listing, LoginOutcome, NewDoctor, Prescription, ProfileUpdate, Result,
    Role, UserProfile,
};
use hms_session::{MemoryStorage, SessionContext};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Json(Value),
    Backend(u16, &'static str),
    Transport,
    Hang,
}

#[derive(Default)]
pub(crate) struct FakeApi {
    replies: Mutex<HashMap<&'static str, Reply>>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(self, op: &'static str, reply: Reply) -> Self {
        self.replies.lock().unwrap().insert(op, reply);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn answer(&self, op: &'static str, call: String) -> Result<Value> {
        self.calls.lock().unwrap().push(call);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(op)
            .cloned()
            .unwrap_or(Reply::Backend(404, "Not scripted"));

        match reply {
            Reply::Json(value) => Ok(value),
            Reply::Backend(status, message) => Err(HmsError::Backend {
                status,
                message: message.to_string(),
            }),
            Reply::Transport => Err(HmsError::Transport("connection refused".to_string())),
            Reply::Hang => std::future::pending().await,
        }
    }

    fn message(value: &Value, fallback: &str) -> String {
        extract_message(value).unwrap_or_else(|| fallback.to_string())
    }
}

#[async_trait]
impl HmsApi for FakeApi {
    async fn login(&self, role: Role, credentials: &Credentials) -> Result<LoginOutcome> {
        let value = self
            .answer("login", format!("login {} {}", role, credentials.email))
            .await?;
        Ok(LoginOutcome::from_payload(role, &value, &credentials.email))
    }

    async fn list_doctors(&self) -> Result<Listing<Doctor>> {
        let value = self.answer("doctors", "doctors".to_string()).await?;
        Listing::from_payload(value, "doctors")
    }

    async fn get_user(&self, user_id: u64) -> Result<UserProfile> {
        let value = self.answer("get_user", format!("get_user {}", user_id)).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn update_user(&self, user_id: u64, update: &ProfileUpdate) -> Result<String> {
        let value = self
            .answer("update_user", format!("update_user {} {}", user_id, update.name))
            .await?;
        Ok(Self::message(&value, "Profile updated successfully"))
    }

    async fn user_appointments(&self, user_id: u64) -> Result<Listing<Appointment>> {
        let value = self
            .answer("user_appointments", format!("user_appointments {}", user_id))
            .await?;
        Listing::from_payload(value, "appointments")
    }

    async fn doctor_appointments(&self, doctor_id: u64) -> Result<Listing<Appointment>> {
        let value = self
            .answer("doctor_appointments", format!("doctor_appointments {}", doctor_id))
            .await?;
        Listing::from_payload(value, "appointments")
    }

    async fn update_appointment_status(
        &self,
        appointment_id: u64,
        status: AppointmentStatus,
    ) -> Result<String> {
        let value = self
            .answer(
                "update_status",
                format!("update_status {} {}", appointment_id, status),
            )
            .await?;
        Ok(Self::message(&value, "Appointment status updated"))
    }

    async fn book_appointment(&self, request: &BookingRequest) -> Result<String> {
        let value = self
            .answer(
                "book",
                format!(
                    "book {} {} {} {}",
                    request.user, request.doctor, request.date, request.time
                ),
            )
            .await?;
        Ok(Self::message(&value, "Appointment booked successfully"))
    }

    async fn user_prescriptions(&self, user_id: u64) -> Result<Listing<Prescription>> {
        let value = self
            .answer("prescriptions", format!("prescriptions {}", user_id))
            .await?;
        Listing::from_payload(value, "prescriptions")
    }

    async fn user_bills(&self, user_id: u64) -> Result<Listing<Bill>> {
        let value = self.answer("bills", format!("bills {}", user_id)).await?;
        Listing::from_payload(value, "bills")
    }

    async fn add_doctor(&self, doctor: &NewDoctor) -> Result<String> {
        let value = self
            .answer("add_doctor", format!("add_doctor {}", doctor.email))
            .await?;
        Ok(Self::message(&value, "Doctor added successfully"))
    }
}

/// 以内存存储和零跳转延迟构建页面上下文
pub(crate) async fn portal(api: FakeApi) -> (PortalContext, Arc<FakeApi>) {
    let api = Arc::new(api);
    let session = SessionContext::load(Arc::new(MemoryStorage::new()))
        .await
        .unwrap();
    let ctx = PortalContext::new(api.clone(), session, Navigator::new(), Duration::ZERO);
    (ctx, api)
}

/// 在上下文中登录一个身份
pub(crate) async fn sign_in(ctx: &PortalContext, role: Role, id: u64) -> Identity {
    let identity = Identity {
        id,
        role,
        name: match role {
            Role::User => "Asha".to_string(),
            Role::Doctor => "Dr. Rao".to_string(),
        },
        email: match role {
            Role::User => "asha@example.com".to_string(),
            Role::Doctor => "rao@hospital.org".to_string(),
        },
        specialization: None,
    };
    ctx.session.set_identity(identity.clone()).await.unwrap();
    identity
}
