//! 页头导航
//!
//! 订阅会话上下文，每次渲染都读取最新身份；其他组件登录或登出后，
//! 页头无需重新挂载即可反映变化。

use crate::context::PortalContext;
use crate::navigation::Route;
use crate::render::Render;
use hms_core::{Identity, Result, Role};
use tokio::sync::watch;
use tracing::info;

pub const BRAND: &str = "HMS";

pub struct HeaderShell {
    ctx: PortalContext,
    identity: watch::Receiver<Option<Identity>>,
}

impl HeaderShell {
    pub fn new(ctx: &PortalContext) -> Self {
        Self {
            identity: ctx.session.subscribe(),
            ctx: ctx.clone(),
        }
    }

    /// 当前显示的身份
    pub fn identity(&self) -> Option<Identity> {
        self.identity.borrow().clone()
    }

    /// 等待下一次会话变更
    pub async fn changed(&mut self) -> Option<Identity> {
        if self.identity.changed().await.is_err() {
            return self.identity();
        }
        self.identity.borrow_and_update().clone()
    }

    /// 导航链接
    pub fn links(&self) -> Vec<(&'static str, Route)> {
        match self.identity.borrow().as_ref().map(|identity| identity.role) {
            None => vec![
                ("Doctors", Route::Doctors),
                ("Login", Route::Login),
                ("Register", Route::Register),
                ("Doctor Login", Route::DoctorLogin),
            ],
            Some(Role::User) => vec![
                ("Doctors", Route::Doctors),
                ("Book", Route::BookAppointment),
                ("Appointments", Route::Appointments),
                ("Prescriptions", Route::Prescriptions),
                ("Bills", Route::Bills),
                ("Profile", Route::Profile),
            ],
            Some(Role::Doctor) => vec![
                ("Home", Route::DoctorHome),
                ("Appointments", Route::DoctorAppointments),
            ],
        }
    }

    /// 登出：清除会话并整页跳转到对应角色的登录页
    pub async fn logout(&self) -> Result<()> {
        let role = self
            .identity
            .borrow()
            .as_ref()
            .map(|identity| identity.role)
            .unwrap_or(Role::User);
        self.ctx.session.clear_identity().await?;
        info!("Logged out {}", role);
        self.ctx.navigator.navigate(Route::login_for(role));
        Ok(())
    }
}

impl Render for HeaderShell {
    fn render(&self) -> String {
        let links = self
            .links()
            .iter()
            .map(|(label, route)| format!("{} ({})", label, route))
            .collect::<Vec<_>>()
            .join(" | ");

        let account = match self.identity.borrow().as_ref() {
            Some(identity) => format!("{} [{}] | Logout", identity.display_name(), identity.role),
            None => "Login".to_string(),
        };

        format!("{} | {} || {}", BRAND, links, account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{portal, sign_in, FakeApi};

    #[tokio::test]
    async fn test_header_follows_session_changes() {
        let (ctx, _) = portal(FakeApi::new()).await;
        let header = HeaderShell::new(&ctx);
        assert!(header.render().ends_with("|| Login"));

        sign_in(&ctx, Role::User, 4).await;
        assert!(header.render().ends_with("Asha [user] | Logout"));
        assert!(header.links().iter().any(|(_, route)| *route == Route::Bills));

        ctx.session.clear_identity().await.unwrap();
        assert!(header.render().ends_with("|| Login"));
    }

    #[tokio::test]
    async fn test_changed_wakes_on_login() {
        let (ctx, _) = portal(FakeApi::new()).await;
        let mut header = HeaderShell::new(&ctx);

        let session = ctx.session.clone();
        tokio::spawn(async move {
            session
                .set_identity(Identity {
                    id: 7,
                    role: Role::Doctor,
                    name: "Dr. Rao".to_string(),
                    email: "rao@hospital.org".to_string(),
                    specialization: None,
                })
                .await
                .unwrap();
        });

        let identity = header.changed().await.unwrap();
        assert_eq!(identity.id, 7);
    }

    #[tokio::test]
    async fn test_doctor_logout_goes_to_doctor_login() {
        let (ctx, _) = portal(FakeApi::new()).await;
        sign_in(&ctx, Role::Doctor, 7).await;
        let header = HeaderShell::new(&ctx);

        header.logout().await.unwrap();
        assert!(!ctx.session.is_authenticated());
        assert_eq!(ctx.navigator.current(), Some(Route::DoctorLogin));
    }
}
