//! 门户页面
//!
//! 每个页面持有自己的本地状态和请求作用域。需要登录的页面在发出任何请求之前
//! 检查会话，未登录时显示 "Please login first" 并跳转到登录页。

pub mod add_doctor;
pub mod appointments;
pub mod bills;
pub mod book;
pub mod doctor_appointments;
pub mod doctors;
pub mod login;
pub mod prescriptions;
pub mod profile;

pub use add_doctor::AddDoctorPage;
pub use appointments::AppointmentsPage;
pub use bills::BillsPage;
pub use book::BookAppointmentPage;
pub use doctor_appointments::DoctorAppointmentsPage;
pub use doctors::DoctorsPage;
pub use login::LoginPage;
pub use prescriptions::PrescriptionsPage;
pub use profile::ProfilePage;

use crate::context::PortalContext;
use crate::fetch::FetchCycle;
use crate::navigation::Route;
use crate::scope::RequestScope;
use hms_core::error::LOGIN_REQUIRED_MESSAGE;
use hms_core::{HmsError, Result, Role};
use tracing::warn;

/// 登录检查：返回当前角色ID；未登录时置为错误状态并跳转登录页
pub(crate) fn require_identity<T>(
    ctx: &PortalContext,
    role: Role,
    cycle: &mut FetchCycle<T>,
) -> Result<Option<u64>> {
    match ctx.session.current_id(role) {
        Some(id) => Ok(Some(id)),
        None => {
            warn!("No {} identity, redirecting to login", role);
            cycle.reset();
            cycle.reject(LOGIN_REQUIRED_MESSAGE)?;
            ctx.navigator.navigate(Route::login_for(role));
            Ok(None)
        }
    }
}

/// 提交成功后等待跳转延迟再导航；页面卸载会取消跳转
pub(crate) async fn redirect_after_delay(
    ctx: &PortalContext,
    scope: &RequestScope,
    route: Route,
) -> Result<()> {
    let delay = ctx.redirect_delay;
    scope
        .run(async move {
            tokio::time::sleep(delay).await;
            Ok::<_, HmsError>(())
        })
        .await?;
    ctx.navigator.navigate(route);
    Ok(())
}
