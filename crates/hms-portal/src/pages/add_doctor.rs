//! 新增医生页（multipart表单）

use crate::context::PortalContext;
use crate::navigation::Route;
use crate::pages::redirect_after_delay;
use crate::render::{field, section, submit_line, Render};
use crate::scope::RequestScope;
use crate::submit::{require, require_email, SubmitCycle, SubmitState};
use hms_core::{NewDoctor, Result};

pub struct AddDoctorPage {
    ctx: PortalContext,
    scope: RequestScope,
    form: NewDoctor,
    submit: SubmitCycle,
}

impl AddDoctorPage {
    pub fn new(ctx: &PortalContext) -> Self {
        Self {
            ctx: ctx.clone(),
            scope: RequestScope::new(),
            form: NewDoctor::default(),
            submit: SubmitCycle::new("add doctor"),
        }
    }

    pub fn form(&self) -> &NewDoctor {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut NewDoctor {
        &mut self.form
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

    fn validate(&self) -> Result<()> {
        require("Name", &self.form.name)?;
        require_email(&self.form.email)?;
        require("Password", &self.form.password)?;
        require("Specialization", &self.form.specialization)
    }

    /// 提交成功后清空表单，延迟后跳转到医生目录
    pub async fn submit(&mut self) -> Result<()> {
        if let Err(e) = self.validate() {
            return self.submit.reject_input(e);
        }

        let api = self.ctx.api.clone();
        let Some(message) = self
            .submit
            .run(&self.scope, api.add_doctor(&self.form))
            .await?
        else {
            return Ok(());
        };

        self.submit.succeed(message)?;
        self.form = NewDoctor::default();
        redirect_after_delay(&self.ctx, &self.scope, Route::Doctors).await
    }
}

impl Render for AddDoctorPage {
    fn render(&self) -> String {
        let mut lines = vec![
            field("Name", &self.form.name),
            field("Email", &self.form.email),
            field("Password", &"*".repeat(self.form.password.chars().count())),
            field("Specialization", &self.form.specialization),
            field("Address", &self.form.address),
            field("Phone", self.form.phone.as_deref().unwrap_or_default()),
            field("Experience", self.form.experience.as_deref().unwrap_or_default()),
        ];
        if let Some(status) = submit_line(self.submit.state()) {
            lines.push(status);
        }
        section("Add Doctor", &lines.join("\n"))
    }
}
