//! 客户端路由与导航

use hms_core::Role;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

/// 门户路由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Register,
    Doctors,
    BookAppointment,
    Appointments,
    Prescriptions,
    Bills,
    Profile,
    AddDoctor,
    DoctorLogin,
    DoctorHome,
    DoctorAppointments,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Doctors => "/doctors",
            Route::BookAppointment => "/book-appointment",
            Route::Appointments => "/appointments",
            Route::Prescriptions => "/prescriptions",
            Route::Bills => "/bills",
            Route::Profile => "/profile",
            Route::AddDoctor => "/add-doctor",
            Route::DoctorLogin => "/doctor/login",
            Route::DoctorHome => "/doctor/home",
            Route::DoctorAppointments => "/doctor/appointments",
        }
    }

    /// 角色对应的登录页
    pub fn login_for(role: Role) -> Route {
        match role {
            Role::User => Route::Login,
            Role::Doctor => Route::DoctorLogin,
        }
    }

    /// 角色登录后的首页
    pub fn home_for(role: Role) -> Route {
        match role {
            Role::User => Route::Home,
            Role::Doctor => Route::DoctorHome,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// 导航器，记录路由跳转历史，克隆后共享同一历史
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    history: Arc<Mutex<Vec<Route>>>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn navigate(&self, route: Route) {
        info!("Navigating to {}", route);
        self.lock().push(route);
    }

    /// 最近一次跳转的目标
    pub fn current(&self) -> Option<Route> {
        self.lock().last().copied()
    }

    pub fn history(&self) -> Vec<Route> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Route>> {
        self.history.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
