//! 后端接口定义

use async_trait::async_trait;
use hms_core::{
    Appointment, AppointmentStatus, Bill, BookingRequest, Credentials, Doctor, Listing,
    LoginOutcome, NewDoctor, Prescription, ProfileUpdate, Result, Role, UserProfile,
};

/// 门户使用的后端操作
///
/// 写操作返回后端给出的成功消息（没有时为通用消息）。非2xx响应一律返回
/// `HmsError::Backend`，网络故障返回 `HmsError::Transport`。
#[async_trait]
pub trait HmsApi: Send + Sync {
    /// 登录
    async fn login(&self, role: Role, credentials: &Credentials) -> Result<LoginOutcome>;

    /// 医生目录
    async fn list_doctors(&self) -> Result<Listing<Doctor>>;

    /// 患者资料
    async fn get_user(&self, user_id: u64) -> Result<UserProfile>;

    /// 更新患者资料
    async fn update_user(&self, user_id: u64, update: &ProfileUpdate) -> Result<String>;

    /// 患者的预约
    async fn user_appointments(&self, user_id: u64) -> Result<Listing<Appointment>>;

    /// 医生的预约
    async fn doctor_appointments(&self, doctor_id: u64) -> Result<Listing<Appointment>>;

    /// 更新预约状态，不在本地校验状态转换是否合法
    async fn update_appointment_status(
        &self,
        appointment_id: u64,
        status: AppointmentStatus,
    ) -> Result<String>;

    /// 预约医生
    async fn book_appointment(&self, request: &BookingRequest) -> Result<String>;

    /// 患者处方
    async fn user_prescriptions(&self, user_id: u64) -> Result<Listing<Prescription>>;

    /// 患者账单
    async fn user_bills(&self, user_id: u64) -> Result<Listing<Bill>>;

    /// 新增医生（multipart表单）
    async fn add_doctor(&self, doctor: &NewDoctor) -> Result<String>;
}
