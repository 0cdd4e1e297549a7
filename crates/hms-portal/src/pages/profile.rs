//! 个人资料页
//!
//! 加载资料后预填表单；保存成功后同步会话中的姓名和邮箱，页头随即更新。

use crate::context::PortalContext;
use crate::fetch::{FetchCycle, FetchState};
use crate::navigation::Route;
use crate::pages::require_identity;
use crate::render::{field, fetch_view, section, submit_line, Render};
use crate::scope::RequestScope;
use crate::submit::{require, require_email, SubmitCycle, SubmitState};
use hms_core::{HmsError, Identity, ProfileUpdate, Result, Role, UserProfile};
use tracing::info;

pub struct ProfilePage {
    ctx: PortalContext,
    scope: RequestScope,
    profile: FetchCycle<UserProfile>,
    form: ProfileUpdate,
    submit: SubmitCycle,
}

impl ProfilePage {
    pub fn new(ctx: &PortalContext) -> Self {
        Self {
            ctx: ctx.clone(),
            scope: RequestScope::new(),
            profile: FetchCycle::new("profile"),
            form: ProfileUpdate::default(),
            submit: SubmitCycle::new("profile update"),
        }
    }

    pub fn state(&self) -> &FetchState<UserProfile> {
        self.profile.state()
    }

    pub fn save_state(&self) -> &SubmitState {
        self.submit.state()
    }

    pub fn form(&self) -> &ProfileUpdate {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ProfileUpdate {
        &mut self.form
    }

    pub fn scope(&self) -> RequestScope {
        self.scope.clone()
    }

    pub async fn mount(&mut self) -> Result<()> {
        let Some(user_id) = require_identity(&self.ctx, Role::User, &mut self.profile)? else {
            return Ok(());
        };
        let api = self.ctx.api.clone();
        self.profile
            .load(&self.scope, api.get_user(user_id))
            .await?;

        if let Some(profile) = self.profile.state().data() {
            self.form = ProfileUpdate {
                name: profile.name.clone(),
                email: profile.email.clone(),
                phone: profile.phone.clone(),
                address: profile.address.clone(),
            };
        }
        Ok(())
    }

    pub fn unmount(&self) {
        self.scope.cancel();
    }

    /// 保存资料
    pub async fn save(&mut self) -> Result<()> {
        let Some(identity) = self
            .ctx
            .session
            .identity()
            .filter(|identity| identity.role == Role::User)
        else {
            self.ctx.navigator.navigate(Route::login_for(Role::User));
            return self.submit.reject_input(HmsError::login_required());
        };
        if let Err(e) = require("Name", &self.form.name).and_then(|_| require_email(&self.form.email))
        {
            return self.submit.reject_input(e);
        }

        let update = ProfileUpdate {
            name: self.form.name.trim().to_string(),
            email: self.form.email.trim().to_string(),
            phone: normalize(&self.form.phone),
            address: normalize(&self.form.address),
        };
        let user_id = identity.id;
        let api = self.ctx.api.clone();
        let Some(message) = self
            .submit
            .run(&self.scope, api.update_user(user_id, &update))
            .await?
        else {
            return Ok(());
        };

        let refreshed = Identity {
            name: update.name.clone(),
            email: update.email.clone(),
            ..identity
        };
        if let Err(e) = self.ctx.session.set_identity(refreshed).await {
            return self.submit.fail(e.user_message());
        }
        if let FetchState::Loaded(profile) = self.profile.state_mut() {
            profile.name = update.name.clone();
            profile.email = update.email.clone();
            profile.phone = update.phone.clone();
            profile.address = update.address.clone();
        }
        info!("Profile {} updated", user_id);
        self.submit.succeed(message)
    }
}

fn normalize(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl Render for ProfilePage {
    fn render(&self) -> String {
        let details = fetch_view(self.profile.state(), "", |profile| {
            [
                field("Age", profile.age.as_deref().unwrap_or_default()),
                field("Gender", profile.gender.as_deref().unwrap_or_default()),
            ]
            .join("\n")
        });
        let mut lines = vec![
            details,
            field("Name", &self.form.name),
            field("Email", &self.form.email),
            field("Phone", self.form.phone.as_deref().unwrap_or_default()),
            field("Address", self.form.address.as_deref().unwrap_or_default()),
        ];
        if let Some(status) = submit_line(self.submit.state()) {
            lines.push(status);
        }
        section("My Profile", &lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{portal, sign_in, FakeApi, Reply};
    use serde_json::json;

    fn profile() -> Reply {
        Reply::Json(json!({
            "id": 4,
            "name": "Asha",
            "email": "asha@example.com",
            "phone": "98450 12345",
            "address": "",
            "age": 34,
            "gender": "Female"
        }))
    }

    #[tokio::test]
    async fn test_mount_prefills_form() {
        let api = FakeApi::new().reply("get_user", profile());
        let (ctx, api) = portal(api).await;
        sign_in(&ctx, Role::User, 4).await;

        let mut page = ProfilePage::new(&ctx);
        page.mount().await.unwrap();

        assert_eq!(api.calls(), vec!["get_user 4"]);
        assert_eq!(page.form().name, "Asha");
        assert_eq!(page.form().phone.as_deref(), Some("98450 12345"));
        assert_eq!(page.form().address, None);
        let view = page.render();
        assert!(view.contains("Age:"));
        assert!(view.contains("34"));
    }

    #[tokio::test]
    async fn test_save_updates_session_identity() {
        let api = FakeApi::new()
            .reply("get_user", profile())
            .reply("update_user", Reply::Json(json!({})));
        let (ctx, api) = portal(api).await;
        sign_in(&ctx, Role::User, 4).await;

        let mut page = ProfilePage::new(&ctx);
        page.mount().await.unwrap();
        page.form_mut().name = "Asha Nair".to_string();
        page.save().await.unwrap();

        assert_eq!(api.calls(), vec!["get_user 4", "update_user 4 Asha Nair"]);
        assert_eq!(ctx.session.identity().unwrap().name, "Asha Nair");
        assert_eq!(page.state().data().unwrap().name, "Asha Nair");
        assert_eq!(
            page.save_state(),
            &SubmitState::Succeeded("Profile updated successfully".to_string())
        );
    }

    #[tokio::test]
    async fn test_failed_save_leaves_session_alone() {
        let api = FakeApi::new()
            .reply("get_user", profile())
            .reply("update_user", Reply::Backend(400, "Email already in use"));
        let (ctx, _) = portal(api).await;
        sign_in(&ctx, Role::User, 4).await;

        let mut page = ProfilePage::new(&ctx);
        page.mount().await.unwrap();
        page.form_mut().email = "taken@example.com".to_string();
        page.save().await.unwrap();

        assert_eq!(ctx.session.identity().unwrap().email, "asha@example.com");
        assert_eq!(
            page.save_state(),
            &SubmitState::Failed("Email already in use".to_string())
        );
        assert_eq!(page.form().email, "taken@example.com");
    }

    #[tokio::test]
    async fn test_missing_profile_renders_error() {
        let api = FakeApi::new().reply("get_user", Reply::Backend(404, "User not found"));
        let (ctx, _) = portal(api).await;
        sign_in(&ctx, Role::User, 4).await;

        let mut page = ProfilePage::new(&ctx);
        page.mount().await.unwrap();

        assert_eq!(page.state().error(), Some("User not found"));
        assert_eq!(page.form(), &ProfileUpdate::default());
    }

    #[tokio::test]
    async fn test_save_without_identity_redirects_to_login() {
        let api = FakeApi::new().reply("get_user", profile());
        let (ctx, api) = portal(api).await;
        sign_in(&ctx, Role::User, 4).await;

        let mut page = ProfilePage::new(&ctx);
        page.mount().await.unwrap();
        ctx.session.clear_identity().await.unwrap();
        page.save().await.unwrap();

        assert_eq!(api.calls(), vec!["get_user 4"]);
        assert_eq!(ctx.navigator.current(), Some(Route::Login));
        assert_eq!(
            page.save_state(),
            &SubmitState::Failed("Please login first".to_string())
        );
    }

    #[tokio::test]
    async fn test_null_name_still_prefills_email() {
        let api = FakeApi::new().reply(
            "get_user",
            Reply::Json(json!({"id": 4, "name": null, "email": "a@b.com"})),
        );
        let (ctx, _) = portal(api).await;
        sign_in(&ctx, Role::User, 4).await;

        let mut page = ProfilePage::new(&ctx);
        page.mount().await.unwrap();

        assert!(page.state().data().is_some());
        assert_eq!(page.form().name, "");
        assert_eq!(page.form().email, "a@b.com");
    }
}
