//! 预约挂号页
//!
//! 挂载时加载医生目录供选择；提交成功后清空表单，延迟后跳转到预约列表。

use crate::context::PortalContext;
use crate::fetch::{FetchCycle, FetchState};
use crate::navigation::Route;
use crate::pages::{redirect_after_delay, require_identity};
use crate::render::{field, fetch_view, section, submit_line, Render};
use crate::scope::RequestScope;
use crate::submit::{require, SubmitCycle, SubmitState};
use chrono::{NaiveDate, NaiveTime};
use hms_core::{BookingRequest, Doctor, HmsError, Result, Role};

/// 预约表单
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingForm {
    pub doctor_id: Option<u64>,
    pub date: String,
    pub time: String,
    pub symptoms: String,
}

impl BookingForm {
    fn validate(&self, doctors: Option<&Vec<Doctor>>) -> Result<u64> {
        let doctor_id = self
            .doctor_id
            .ok_or_else(|| HmsError::Validation("Please select a doctor".to_string()))?;
        if let Some(doctors) = doctors {
            if !doctors.iter().any(|doctor| doctor.id == doctor_id) {
                return Err(HmsError::Validation("Please select a doctor".to_string()));
            }
        }

        require("Date", &self.date)?;
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| HmsError::Validation("Please enter a valid date".to_string()))?;
        require("Time", &self.time)?;
        NaiveTime::parse_from_str(self.time.trim(), "%H:%M")
            .map_err(|_| HmsError::Validation("Please enter a valid time".to_string()))?;
        Ok(doctor_id)
    }
}

pub struct BookAppointmentPage {
    ctx: PortalContext,
    scope: RequestScope,
    doctors: FetchCycle<Vec<Doctor>>,
    form: BookingForm,
    submit: SubmitCycle,
}

impl BookAppointmentPage {
    pub fn new(ctx: &PortalContext) -> Self {
        Self {
            ctx: ctx.clone(),
            scope: RequestScope::new(),
            doctors: FetchCycle::new("doctors"),
            form: BookingForm::default(),
            submit: SubmitCycle::new("booking"),
        }
    }

    pub fn doctors(&self) -> &FetchState<Vec<Doctor>> {
        self.doctors.state()
    }

    pub fn state(&self) -> &SubmitState {
        self.submit.state()
    }

    pub fn form(&self) -> &BookingForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut BookingForm {
        &mut self.form
    }

    pub fn scope(&self) -> RequestScope {
        self.scope.clone()
    }

    pub async fn mount(&mut self) -> Result<()> {
        if require_identity(&self.ctx, Role::User, &mut self.doctors)?.is_none() {
            return Ok(());
        }
        let api = self.ctx.api.clone();
        self.doctors
            .load_listing(&self.scope, api.list_doctors())
            .await
    }

    pub fn unmount(&self) {
        self.scope.cancel();
    }

    pub async fn submit(&mut self) -> Result<()> {
        let Some(user_id) = self.ctx.session.current_id(Role::User) else {
            self.ctx.navigator.navigate(Route::login_for(Role::User));
            return self.submit.reject_input(HmsError::login_required());
        };
        let doctor_id = match self.form.validate(self.doctors.state().data()) {
            Ok(doctor_id) => doctor_id,
            Err(e) => return self.submit.reject_input(e),
        };

        let request = BookingRequest {
            user: user_id,
            doctor: doctor_id,
            date: self.form.date.trim().to_string(),
            time: self.form.time.trim().to_string(),
            symptoms: self.form.symptoms.trim().to_string(),
        };
        let api = self.ctx.api.clone();
        let Some(message) = self
            .submit
            .run(&self.scope, api.book_appointment(&request))
            .await?
        else {
            return Ok(());
        };

        self.submit.succeed(message)?;
        self.form = BookingForm::default();
        redirect_after_delay(&self.ctx, &self.scope, Route::Appointments).await
    }
}

impl Render for BookAppointmentPage {
    fn render(&self) -> String {
        let doctors = fetch_view(self.doctors.state(), "No doctors available", |doctors| {
            doctors
                .iter()
                .map(|doctor| {
                    let marker = if self.form.doctor_id == Some(doctor.id) { "*" } else { " " };
                    format!(
                        " {} [{}] {} ({})",
                        marker, doctor.id, doctor.name, doctor.specialization
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        });

        let mut lines = vec![
            doctors,
            field("Date", &self.form.date),
            field("Time", &self.form.time),
            field("Symptoms", &self.form.symptoms),
        ];
        if let Some(status) = submit_line(self.submit.state()) {
            lines.push(status);
        }
        section("Book Appointment", &lines.join("\n"))
    }
}
