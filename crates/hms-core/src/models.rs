//! 核心数据模型定义
//!
//! 所有实体都是单次页面加载的视图模型，不跨页面缓存。

use crate::utils::{de_money, de_opt_f64, de_opt_text, de_text, parse_id};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// 登录角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Doctor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Doctor => "doctor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" | "patient" => Ok(Role::User),
            "doctor" => Ok(Role::Doctor),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// 登录身份，存在即视为已登录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: u64,
    pub role: Role,
    #[serde(default, deserialize_with = "de_text")]
    pub name: String,
    #[serde(default, deserialize_with = "de_text")]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
}

impl Identity {
    /// 页头显示名称，缺失时退回邮箱
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// 对其他实体的引用：后端返回裸ID或带名称的嵌套对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Reference {
    pub id: u64,
    pub label: Option<String>,
}

impl Reference {
    pub fn new(id: u64) -> Self {
        Self { id, label: None }
    }

    /// 有名称时显示名称，否则显示 `#id`
    pub fn display(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("#{}", self.id),
        }
    }
}

impl TryFrom<Value> for Reference {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if let Some(id) = parse_id(&value) {
            return Ok(Reference::new(id));
        }
        let id = value
            .get("id")
            .and_then(parse_id)
            .ok_or_else(|| format!("invalid reference: {}", value))?;
        let label = ["name", "username", "full_name"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);
        Ok(Reference { id, label })
    }
}

/// 预约状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Confirmed => "Confirmed",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Completed => "Completed",
        }
    }

    /// 状态下拉框的全部选项
    pub fn all() -> [AppointmentStatus; 4] {
        [
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed,
        ]
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "cancelled" | "canceled" => Ok(AppointmentStatus::Cancelled),
            "completed" => Ok(AppointmentStatus::Completed),
            other => Err(format!("unknown appointment status: {}", other)),
        }
    }
}

impl TryFrom<String> for AppointmentStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AppointmentStatus> for String {
    fn from(status: AppointmentStatus) -> Self {
        status.as_str().to_string()
    }
}

/// 预约
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: u64,
    pub doctor: Reference,
    pub user: Reference,
    pub date: String,
    pub time: String,
    pub status: AppointmentStatus,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub symptoms: Option<String>,
}

/// 处方中的单个药品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    #[serde(default, deserialize_with = "de_text")]
    pub name: String,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub dosage: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub frequency: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub duration: Option<String>,
}

impl Medication {
    fn named(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            dosage: None,
            frequency: None,
            duration: None,
        }
    }
}

// 药品字段可能是自由文本、字符串数组或对象数组
fn de_medications<'de, D>(deserializer: D) -> Result<Vec<Medication>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(text) => Ok(text
            .split(|c| c == '\n' || c == ',')
            .filter(|line| !line.trim().is_empty())
            .map(Medication::named)
            .collect()),
        Value::Array(items) => items
            .into_iter()
            .filter(|item| !item.is_null())
            .map(|item| match item {
                Value::String(name) => Ok(Medication::named(&name)),
                other => serde_json::from_value(other).map_err(serde::de::Error::custom),
            })
            .collect(),
        other => Err(serde::de::Error::custom(format!(
            "invalid medications: {}",
            other
        ))),
    }
}

/// 处方
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: u64,
    pub appointment: Reference,
    #[serde(default, deserialize_with = "de_medications")]
    pub medications: Vec<Medication>,
    #[serde(default, deserialize_with = "de_text")]
    pub instructions: String,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub doctor_name: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub created_at: Option<String>,
}

/// 账单支付状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Cancelled,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Cancelled => "Cancelled",
            PaymentStatus::Refunded => "Refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for PaymentStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" | "unpaid" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "cancelled" | "canceled" => Ok(PaymentStatus::Cancelled),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(format!("unknown payment status: {}", other)),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        status.as_str().to_string()
    }
}

/// 账单，总额以后端为准，不在本地重新计算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: u64,
    pub appointment: Reference,
    pub payment_status: PaymentStatus,
    #[serde(default, deserialize_with = "de_money")]
    pub consultation_fee: f64,
    #[serde(default, deserialize_with = "de_money")]
    pub medication_charges: f64,
    #[serde(default, deserialize_with = "de_money")]
    pub lab_test_charges: f64,
    #[serde(default, deserialize_with = "de_money")]
    pub other_charges: f64,
    #[serde(default, deserialize_with = "de_money")]
    pub discount: f64,
    #[serde(default, deserialize_with = "de_money")]
    pub tax: f64,
    #[serde(default, deserialize_with = "de_money")]
    pub total_amount: f64,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub created_at: Option<String>,
}

pub const DEFAULT_DOCTOR_NAME: &str = "Unknown Doctor";
pub const DEFAULT_SPECIALIZATION: &str = "General Physician";
pub const DEFAULT_DOCTOR_IMAGE: &str = "/images/doctor-placeholder.png";
pub const DEFAULT_DOCTOR_ADDRESS: &str = "Address not available";

/// 医生目录条目，缺失字段使用本地默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DoctorRecord")]
pub struct Doctor {
    pub id: u64,
    pub name: String,
    pub specialization: String,
    pub rating: Option<f64>,
    pub image: String,
    pub address: String,
}

impl Doctor {
    /// 评分显示，缺失时为 `N/A`
    pub fn rating_label(&self) -> String {
        match self.rating {
            Some(rating) => format!("{:.1}", rating),
            None => "N/A".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct DoctorRecord {
    #[serde(default)]
    id: Value,
    #[serde(default, deserialize_with = "de_opt_text")]
    name: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    specialization: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    rating: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_text")]
    image: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    address: Option<String>,
}

impl TryFrom<DoctorRecord> for Doctor {
    type Error = String;

    fn try_from(record: DoctorRecord) -> Result<Self, Self::Error> {
        let id = parse_id(&record.id).ok_or_else(|| "doctor entry without id".to_string())?;
        Ok(Doctor {
            id,
            name: record.name.unwrap_or_else(|| DEFAULT_DOCTOR_NAME.to_string()),
            specialization: record
                .specialization
                .unwrap_or_else(|| DEFAULT_SPECIALIZATION.to_string()),
            rating: record.rating,
            image: record.image.unwrap_or_else(|| DEFAULT_DOCTOR_IMAGE.to_string()),
            address: record
                .address
                .unwrap_or_else(|| DEFAULT_DOCTOR_ADDRESS.to_string()),
        })
    }
}

/// 患者个人资料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    #[serde(default, deserialize_with = "de_text")]
    pub name: String,
    #[serde(default, deserialize_with = "de_text")]
    pub email: String,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub age: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub gender: Option<String>,
}

/// 资料更新请求
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// 登录凭据
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// 预约请求
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingRequest {
    pub user: u64,
    pub doctor: u64,
    pub date: String,
    pub time: String,
    pub symptoms: String,
}

/// 预约状态更新请求
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdate {
    pub status: AppointmentStatus,
}

/// 新增医生表单（multipart文本字段）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewDoctor {
    pub name: String,
    pub email: String,
    pub password: String,
    pub specialization: String,
    pub address: String,
    pub phone: Option<String>,
    pub experience: Option<String>,
}

impl NewDoctor {
    /// 转换为multipart表单字段，省略空的可选字段
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("name", self.name.clone()),
            ("email", self.email.clone()),
            ("password", self.password.clone()),
            ("specialization", self.specialization.clone()),
            ("address", self.address.clone()),
        ];
        if let Some(phone) = &self.phone {
            fields.push(("phone", phone.clone()));
        }
        if let Some(experience) = &self.experience {
            fields.push(("experience", experience.clone()));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_doctor_fallbacks() {
        let doctor: Doctor = serde_json::from_value(json!({"id": 3, "name": "  "})).unwrap();
        assert_eq!(doctor.name, DEFAULT_DOCTOR_NAME);
        assert_eq!(doctor.specialization, DEFAULT_SPECIALIZATION);
        assert_eq!(doctor.image, DEFAULT_DOCTOR_IMAGE);
        assert_eq!(doctor.address, DEFAULT_DOCTOR_ADDRESS);
        assert_eq!(doctor.rating_label(), "N/A");
    }

    #[test]
    fn test_doctor_without_id_is_rejected() {
        let result: std::result::Result<Doctor, _> =
            serde_json::from_value(json!({"name": "Dr. Who"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_appointment_with_nested_references() {
        let appointment: Appointment = serde_json::from_value(json!({
            "id": 11,
            "doctor": {"id": 7, "name": "Dr. Rao", "specialization": "Cardiology"},
            "user": 4,
            "date": "2024-05-01",
            "time": "10:30",
            "status": "confirmed",
            "symptoms": ""
        }))
        .unwrap();

        assert_eq!(appointment.doctor.display(), "Dr. Rao");
        assert_eq!(appointment.user.display(), "#4");
        assert_eq!(appointment.status, AppointmentStatus::Confirmed);
        assert_eq!(appointment.symptoms, None);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!("postponed".parse::<AppointmentStatus>().is_err());
        assert_eq!(
            serde_json::to_value(AppointmentStatus::Cancelled).unwrap(),
            json!("Cancelled")
        );
    }

    #[test]
    fn test_bill_accepts_decimal_strings() {
        let bill: Bill = serde_json::from_value(json!({
            "id": 1,
            "appointment": 11,
            "payment_status": "paid",
            "consultation_fee": "500.00",
            "tax": 45,
            "total_amount": "545.00",
            "notes": null
        }))
        .unwrap();

        assert_eq!(bill.consultation_fee, 500.0);
        assert_eq!(bill.medication_charges, 0.0);
        assert_eq!(bill.total_amount, 545.0);
        assert_eq!(bill.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_prescription_medications_from_text() {
        let prescription: Prescription = serde_json::from_value(json!({
            "id": 2,
            "appointment": {"id": 11},
            "medications": "Paracetamol 500mg\nAmoxicillin, Cetirizine",
            "instructions": "After meals"
        }))
        .unwrap();

        let names: Vec<_> = prescription
            .medications
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["Paracetamol 500mg", "Amoxicillin", "Cetirizine"]);
    }

    #[test]
    fn test_profile_with_null_name() {
        let profile: UserProfile =
            serde_json::from_value(json!({"id": 4, "name": null, "email": "a@b.com"})).unwrap();
        assert_eq!(profile.name, "");
        assert_eq!(profile.email, "a@b.com");
        assert_eq!(profile.phone, None);
    }

    #[test]
    fn test_medication_object_with_null_name() {
        let prescription: Prescription = serde_json::from_value(json!({
            "id": 5,
            "appointment": 11,
            "medications": [{"name": null, "dosage": "5ml"}],
            "instructions": 2
        }))
        .unwrap();

        assert_eq!(prescription.medications[0].name, "");
        assert_eq!(prescription.medications[0].dosage.as_deref(), Some("5ml"));
        assert_eq!(prescription.instructions, "2");
    }

    #[test]
    fn test_new_doctor_form_fields_skip_missing_optionals() {
        let form = NewDoctor {
            name: "Dr. Rao".to_string(),
            phone: Some("555-0100".to_string()),
            ..Default::default()
        };
        let keys: Vec<_> = form.form_fields().into_iter().map(|(k, _)| k).collect();
        assert!(keys.contains(&"phone"));
        assert!(!keys.contains(&"experience"));
    }
}
