//! # HMS门户页面模块
//!
//! 以无界面视图模型的方式实现门户的各个页面：
//! - 页面上下文：后端接口、会话上下文、导航器，注入到每个页面
//! - 数据加载周期：idle → loading → loaded | empty | failed
//! - 表单提交周期：idle → submitting → succeeded | failed → idle
//! - 请求作用域：页面卸载时取消进行中的请求
//! - 页头：订阅会话变更，始终显示最新的登录状态

pub mod context;
pub mod fetch;
pub mod header;
pub mod navigation;
pub mod pages;
pub mod render;
pub mod scope;
pub mod submit;

#[cfg(test)]
pub(crate) mod testing;

pub use context::PortalContext;
pub use fetch::{FetchCycle, FetchEvent, FetchPhase, FetchState, FetchTransitions};
pub use header::HeaderShell;
pub use navigation::{Navigator, Route};
pub use pages::{
    AddDoctorPage, AppointmentsPage, BillsPage, BookAppointmentPage, DoctorAppointmentsPage,
    DoctorsPage, LoginPage, PrescriptionsPage, ProfilePage,
};
pub use render::Render;
pub use scope::RequestScope;
pub use submit::{SubmitCycle, SubmitState};
