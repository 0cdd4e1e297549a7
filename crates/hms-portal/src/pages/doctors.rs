//! 医生目录页（无需登录）

use crate::context::PortalContext;
use crate::fetch::{FetchCycle, FetchState};
use crate::render::{fetch_view, section, Render};
use crate::scope::RequestScope;
use hms_core::{Doctor, Result};

pub struct DoctorsPage {
    ctx: PortalContext,
    scope: RequestScope,
    doctors: FetchCycle<Vec<Doctor>>,
    query: String,
}

impl DoctorsPage {
    pub fn new(ctx: &PortalContext) -> Self {
        Self {
            ctx: ctx.clone(),
            scope: RequestScope::new(),
            doctors: FetchCycle::new("doctors"),
            query: String::new(),
        }
    }

    pub fn state(&self) -> &FetchState<Vec<Doctor>> {
        self.doctors.state()
    }

    pub fn scope(&self) -> RequestScope {
        self.scope.clone()
    }

    pub async fn mount(&mut self) -> Result<()> {
        let api = self.ctx.api.clone();
        self.doctors
            .load_listing(&self.scope, api.list_doctors())
            .await
    }

    pub fn unmount(&self) {
        self.scope.cancel();
    }

    /// 按姓名或专科过滤（不区分大小写），不重新请求
    pub fn search(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn visible(&self) -> Vec<&Doctor> {
        let query = self.query.trim().to_lowercase();
        self.doctors
            .state()
            .data()
            .map(|doctors| {
                doctors
                    .iter()
                    .filter(|doctor| {
                        query.is_empty()
                            || doctor.name.to_lowercase().contains(&query)
                            || doctor.specialization.to_lowercase().contains(&query)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Render for DoctorsPage {
    fn render(&self) -> String {
        let body = fetch_view(self.doctors.state(), "No doctors found", |_| {
            let visible = self.visible();
            if visible.is_empty() {
                return format!("No doctors match \"{}\"", self.query.trim());
            }
            visible
                .iter()
                .map(|doctor| {
                    format!(
                        "  [{}] {} - {} | rating {} | {}",
                        doctor.id,
                        doctor.name,
                        doctor.specialization,
                        doctor.rating_label(),
                        doctor.address
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        });
        section("Our Doctors", &body)
    }
}
