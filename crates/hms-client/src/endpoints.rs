//! 后端端点路径

use hms_core::Role;

pub const USER_LOGIN: &str = "/api/login/";
pub const DOCTOR_LOGIN: &str = "/api/doctor/login/";
pub const DOCTORS: &str = "/api/doctors/";
pub const ADD_DOCTOR: &str = "/add-doctor/";
pub const BOOK_APPOINTMENT: &str = "/appointments/book/";

pub fn login(role: Role) -> &'static str {
    match role {
        Role::User => USER_LOGIN,
        Role::Doctor => DOCTOR_LOGIN,
    }
}

pub fn user(user_id: u64) -> String {
    format!("/api/users/{}/", user_id)
}

pub fn user_appointments(user_id: u64) -> String {
    format!("/appointments/user/{}/", user_id)
}

pub fn doctor_appointments(doctor_id: u64) -> String {
    format!("/appointments/doctor/{}/", doctor_id)
}

pub fn appointment_status(appointment_id: u64) -> String {
    format!("/appointments/{}/status/", appointment_id)
}

pub fn user_prescriptions(user_id: u64) -> String {
    format!("/api/prescriptions/user/{}/", user_id)
}

pub fn user_bills(user_id: u64) -> String {
    format!("/bills/user/{}/", user_id)
}
