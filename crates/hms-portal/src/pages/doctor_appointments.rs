//! 医生预约管理页
//!
//! 列出当前医生的预约，并允许修改单条预约的状态。状态之间的合法转换
//! 由后端决定，本地不做校验；更新成功后只改写本地列表中对应条目的状态。

use crate::context::PortalContext;
use crate::fetch::{FetchCycle, FetchState};
use crate::navigation::Route;
use crate::pages::appointments::appointment_line;
use crate::pages::require_identity;
use crate::render::{fetch_view, section, submit_line, Render};
use crate::scope::RequestScope;
use crate::submit::{SubmitCycle, SubmitState};
use hms_core::{Appointment, AppointmentStatus, HmsError, Result, Role};
use tracing::info;

pub struct DoctorAppointmentsPage {
    ctx: PortalContext,
    scope: RequestScope,
    appointments: FetchCycle<Vec<Appointment>>,
    status_update: SubmitCycle,
}

impl DoctorAppointmentsPage {
    pub fn new(ctx: &PortalContext) -> Self {
        Self {
            ctx: ctx.clone(),
            scope: RequestScope::new(),
            appointments: FetchCycle::new("doctor appointments"),
            status_update: SubmitCycle::new("status update"),
        }
    }

    pub fn state(&self) -> &FetchState<Vec<Appointment>> {
        self.appointments.state()
    }

    pub fn update_state(&self) -> &SubmitState {
        self.status_update.state()
    }

    pub fn scope(&self) -> RequestScope {
        self.scope.clone()
    }

    pub async fn mount(&mut self) -> Result<()> {
        let Some(doctor_id) =
            require_identity(&self.ctx, Role::Doctor, &mut self.appointments)?
        else {
            return Ok(());
        };
        let api = self.ctx.api.clone();
        self.appointments
            .load_listing(&self.scope, api.doctor_appointments(doctor_id))
            .await
    }

    pub fn unmount(&self) {
        self.scope.cancel();
    }

    /// 修改预约状态
    pub async fn update_status(
        &mut self,
        appointment_id: u64,
        status: AppointmentStatus,
    ) -> Result<()> {
        if self.ctx.session.current_id(Role::Doctor).is_none() {
            self.ctx.navigator.navigate(Route::login_for(Role::Doctor));
            return self.status_update.reject_input(HmsError::login_required());
        }

        let api = self.ctx.api.clone();
        let Some(message) = self
            .status_update
            .run(
                &self.scope,
                api.update_appointment_status(appointment_id, status),
            )
            .await?
        else {
            return Ok(());
        };

        if let FetchState::Loaded(items) = self.appointments.state_mut() {
            if let Some(item) = items.iter_mut().find(|item| item.id == appointment_id) {
                item.status = status;
            }
        }
        info!("Appointment {} set to {}", appointment_id, status);
        self.status_update.succeed(message)
    }
}

impl Render for DoctorAppointmentsPage {
    fn render(&self) -> String {
        let mut body = fetch_view(self.appointments.state(), "No appointments found", |items| {
            items
                .iter()
                .map(|appointment| appointment_line(appointment, &appointment.user.display()))
                .collect::<Vec<_>>()
                .join("\n")
        });
        if let Some(status) = submit_line(self.status_update.state()) {
            body.push('\n');
            body.push_str(&status);
        }
        section("Patient Appointments", &body)
    }
}
