//! 处方列表页

use crate::context::PortalContext;
use crate::fetch::{FetchCycle, FetchState};
use crate::pages::require_identity;
use crate::render::{fetch_view, section, Render};
use crate::scope::RequestScope;
use hms_core::utils::format_timestamp;
use hms_core::{Medication, Prescription, Result, Role};

pub struct PrescriptionsPage {
    ctx: PortalContext,
    scope: RequestScope,
    prescriptions: FetchCycle<Vec<Prescription>>,
}

impl PrescriptionsPage {
    pub fn new(ctx: &PortalContext) -> Self {
        Self {
            ctx: ctx.clone(),
            scope: RequestScope::new(),
            prescriptions: FetchCycle::new("prescriptions"),
        }
    }

    pub fn state(&self) -> &FetchState<Vec<Prescription>> {
        self.prescriptions.state()
    }

    pub fn scope(&self) -> RequestScope {
        self.scope.clone()
    }

    pub async fn mount(&mut self) -> Result<()> {
        let Some(user_id) = require_identity(&self.ctx, Role::User, &mut self.prescriptions)?
        else {
            return Ok(());
        };
        let api = self.ctx.api.clone();
        self.prescriptions
            .load_listing(&self.scope, api.user_prescriptions(user_id))
            .await
    }

    pub fn unmount(&self) {
        self.scope.cancel();
    }
}

fn medication_line(medication: &Medication) -> String {
    let details = [&medication.dosage, &medication.frequency, &medication.duration]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>();
    if details.is_empty() {
        format!("    - {}", medication.name)
    } else {
        format!("    - {} ({})", medication.name, details.join(", "))
    }
}

fn prescription_block(prescription: &Prescription) -> String {
    let mut lines = vec![format!(
        "  Prescription #{} for appointment {}",
        prescription.id,
        prescription.appointment.display()
    )];
    if let Some(doctor) = &prescription.doctor_name {
        lines.push(format!("    Doctor: {}", doctor));
    }
    if let Some(created_at) = &prescription.created_at {
        lines.push(format!("    Issued: {}", format_timestamp(created_at)));
    }
    lines.extend(prescription.medications.iter().map(medication_line));
    if !prescription.instructions.trim().is_empty() {
        lines.push(format!("    Instructions: {}", prescription.instructions.trim()));
    }
    lines.join("\n")
}

impl Render for PrescriptionsPage {
    fn render(&self) -> String {
        let body = fetch_view(self.prescriptions.state(), "No prescriptions found", |items| {
            items
                .iter()
                .map(prescription_block)
                .collect::<Vec<_>>()
                .join("\n\n")
        });
        section("My Prescriptions", &body)
    }
}
