//! 账单列表页

use crate::context::PortalContext;
use crate::fetch::{FetchCycle, FetchState};
use crate::pages::require_identity;
use crate::render::{fetch_view, section, Render};
use crate::scope::RequestScope;
use hms_core::utils::{format_money, format_timestamp};
use hms_core::{Bill, Result, Role};

pub struct BillsPage {
    ctx: PortalContext,
    scope: RequestScope,
    bills: FetchCycle<Vec<Bill>>,
}

impl BillsPage {
    pub fn new(ctx: &PortalContext) -> Self {
        Self {
            ctx: ctx.clone(),
            scope: RequestScope::new(),
            bills: FetchCycle::new("bills"),
        }
    }

    pub fn state(&self) -> &FetchState<Vec<Bill>> {
        self.bills.state()
    }

    pub fn scope(&self) -> RequestScope {
        self.scope.clone()
    }

    pub async fn mount(&mut self) -> Result<()> {
        let Some(user_id) = require_identity(&self.ctx, Role::User, &mut self.bills)? else {
            return Ok(());
        };
        let api = self.ctx.api.clone();
        self.bills
            .load_listing(&self.scope, api.user_bills(user_id))
            .await
    }

    pub fn unmount(&self) {
        self.scope.cancel();
    }
}

fn bill_block(bill: &Bill) -> String {
    let charges = [
        ("Consultation", bill.consultation_fee),
        ("Medication", bill.medication_charges),
        ("Lab tests", bill.lab_test_charges),
        ("Other", bill.other_charges),
        ("Discount", -bill.discount),
        ("Tax", bill.tax),
    ];

    let mut lines = vec![format!(
        "  Bill #{} (appointment {}) [{}]",
        bill.id,
        bill.appointment.display(),
        bill.payment_status
    )];
    lines.extend(
        charges
            .iter()
            .filter(|(_, amount)| *amount != 0.0)
            .map(|(label, amount)| format!("    {:<14} {:>10}", label, format_money(*amount))),
    );
    // 总额以后端返回为准
    lines.push(format!("    {:<14} {:>10}", "Total", format_money(bill.total_amount)));
    if let Some(notes) = &bill.notes {
        lines.push(format!("    Notes: {}", notes));
    }
    if let Some(created_at) = &bill.created_at {
        lines.push(format!("    Issued: {}", format_timestamp(created_at)));
    }
    lines.join("\n")
}

impl Render for BillsPage {
    fn render(&self) -> String {
        let body = fetch_view(self.bills.state(), "No bills found", |bills| {
            bills.iter().map(bill_block).collect::<Vec<_>>().join("\n\n")
        });
        section("My Bills", &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::Route;
    use crate::testing::{portal, sign_in, FakeApi, Reply};
    use hms_core::{HmsError, PaymentStatus};
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_no_user_id_means_no_request() {
        let (ctx, api) = portal(FakeApi::new()).await;

        let mut page = BillsPage::new(&ctx);
        page.mount().await.unwrap();

        assert_eq!(page.state().error(), Some("Please login first"));
        assert!(api.calls().is_empty());
        assert_eq!(ctx.navigator.current(), Some(Route::Login));
        assert!(page.render().contains("Error: Please login first"));
    }

    #[tokio::test]
    async fn test_total_is_trusted_as_supplied() {
        let api = FakeApi::new().reply(
            "bills",
            Reply::Json(json!({"bills": [{
                "id": 9,
                "appointment": 11,
                "payment_status": "unpaid",
                "consultation_fee": "500.00",
                "medication_charges": 120,
                "discount": "20.00",
                "tax": null,
                "total_amount": "999.99",
                "notes": ""
            }]})),
        );
        let (ctx, api) = portal(api).await;
        sign_in(&ctx, Role::User, 4).await;

        let mut page = BillsPage::new(&ctx);
        page.mount().await.unwrap();

        let bill = &page.state().data().unwrap()[0];
        assert_eq!(bill.payment_status, PaymentStatus::Pending);
        assert_eq!(bill.total_amount, 999.99);
        assert_eq!(bill.notes, None);
        assert_eq!(api.calls(), vec!["bills 4"]);

        let view = page.render();
        assert!(view.contains("Bill #9 (appointment #11) [Pending]"));
        assert!(view.contains("999.99"));
        assert!(view.contains("-20.00"));
        assert!(!view.contains("Tax"));
    }

    #[tokio::test]
    async fn test_empty_bills_and_failure_states() {
        let api = FakeApi::new().reply("bills", Reply::Json(json!([])));
        let (ctx, _) = portal(api).await;
        sign_in(&ctx, Role::User, 4).await;
        let mut page = BillsPage::new(&ctx);
        page.mount().await.unwrap();
        assert_eq!(page.state(), &FetchState::Empty);
        assert!(page.render().ends_with("No bills found"));

        let api = FakeApi::new().reply("bills", Reply::Transport);
        let (ctx, _) = portal(api).await;
        sign_in(&ctx, Role::User, 4).await;
        let mut page = BillsPage::new(&ctx);
        page.mount().await.unwrap();
        assert!(matches!(page.state(), FetchState::Failed(_)));
    }

    #[tokio::test]
    async fn test_unmount_drops_in_flight_request() {
        let api = FakeApi::new().reply("bills", Reply::Hang);
        let (ctx, _) = portal(api).await;
        sign_in(&ctx, Role::User, 4).await;

        let mut page = BillsPage::new(&ctx);
        let scope = page.scope();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            scope.cancel();
        });

        let result = page.mount().await;
        assert!(matches!(result, Err(HmsError::Cancelled)));
        assert_eq!(page.state(), &FetchState::Loading);
    }
}
