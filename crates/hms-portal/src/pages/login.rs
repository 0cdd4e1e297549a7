//! 登录页（患者与医生共用）

use crate::context::PortalContext;
use crate::navigation::Route;
use crate::render::{field, section, submit_line, Render};
use crate::scope::RequestScope;
use crate::submit::{require, require_email, SubmitCycle, SubmitState};
use hms_core::{Credentials, LoginOutcome, Result, Role};
use tracing::info;

pub struct LoginPage {
    ctx: PortalContext,
    role: Role,
    scope: RequestScope,
    form: Credentials,
    submit: SubmitCycle,
}

impl LoginPage {
    pub fn new(ctx: &PortalContext, role: Role) -> Self {
        Self {
            ctx: ctx.clone(),
            role,
            scope: RequestScope::new(),
            form: Credentials::default(),
            submit: SubmitCycle::new("login"),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.form.email = email.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.form.password = password.into();
    }

    pub fn state(&self) -> &SubmitState {
        self.submit.state()
    }

    pub fn scope(&self) -> RequestScope {
        self.scope.clone()
    }

    pub fn unmount(&self) {
        self.scope.cancel();
    }

    /// 提交登录
    ///
    /// 成功：持久化身份，跳转到角色首页一次。失败：会话不变，显示消息。
    pub async fn submit(&mut self) -> Result<()> {
        if let Err(e) =
            require_email(&self.form.email).and_then(|_| require("Password", &self.form.password))
        {
            return self.submit.reject_input(e);
        }

        let api = self.ctx.api.clone();
        let outcome = match self
            .submit
            .run(&self.scope, api.login(self.role, &self.form))
            .await?
        {
            Some(outcome) => outcome,
            None => return Ok(()),
        };

        match outcome {
            LoginOutcome::Accepted(identity) => {
                let id = identity.id;
                if let Err(e) = self.ctx.session.set_identity(identity).await {
                    return self.submit.fail(e.user_message());
                }
                info!("{} {} logged in", self.role, id);
                self.submit.succeed("Login successful")?;
                self.form.password.clear();
                self.ctx.navigator.navigate(Route::home_for(self.role));
            }
            LoginOutcome::Rejected(message) => self.submit.fail(message)?,
        }
        Ok(())
    }
}

impl Render for LoginPage {
    fn render(&self) -> String {
        let title = match self.role {
            Role::User => "Patient Login",
            Role::Doctor => "Doctor Login",
        };
        let mut lines = vec![
            field("Email", &self.form.email),
            field("Password", &"*".repeat(self.form.password.chars().count())),
        ];
        if let Some(status) = submit_line(self.submit.state()) {
            lines.push(status);
        }
        section(title, &lines.join("\n"))
    }
}
