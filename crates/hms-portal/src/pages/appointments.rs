//! 患者预约列表页

use crate::context::PortalContext;
use crate::fetch::{FetchCycle, FetchState};
use crate::pages::require_identity;
use crate::render::{fetch_view, section, Render};
use crate::scope::RequestScope;
use hms_core::{Appointment, Result, Role};

pub struct AppointmentsPage {
    ctx: PortalContext,
    scope: RequestScope,
    appointments: FetchCycle<Vec<Appointment>>,
}

impl AppointmentsPage {
    pub fn new(ctx: &PortalContext) -> Self {
        Self {
            ctx: ctx.clone(),
            scope: RequestScope::new(),
            appointments: FetchCycle::new("appointments"),
        }
    }

    pub fn state(&self) -> &FetchState<Vec<Appointment>> {
        self.appointments.state()
    }

    pub fn scope(&self) -> RequestScope {
        self.scope.clone()
    }

    pub async fn mount(&mut self) -> Result<()> {
        let Some(user_id) = require_identity(&self.ctx, Role::User, &mut self.appointments)?
        else {
            return Ok(());
        };
        let api = self.ctx.api.clone();
        self.appointments
            .load_listing(&self.scope, api.user_appointments(user_id))
            .await
    }

    pub fn unmount(&self) {
        self.scope.cancel();
    }
}

pub(crate) fn appointment_line(appointment: &Appointment, party: &str) -> String {
    let mut line = format!(
        "  #{} {} {} with {} [{}]",
        appointment.id, appointment.date, appointment.time, party, appointment.status
    );
    if let Some(symptoms) = &appointment.symptoms {
        line.push_str(&format!("\n      symptoms: {}", symptoms));
    }
    line
}

impl Render for AppointmentsPage {
    fn render(&self) -> String {
        let body = fetch_view(self.appointments.state(), "No appointments found", |items| {
            items
                .iter()
                .map(|appointment| appointment_line(appointment, &appointment.doctor.display()))
                .collect::<Vec<_>>()
                .join("\n")
        });
        section("My Appointments", &body)
    }
}
