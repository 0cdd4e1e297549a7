//! 页面上下文

use crate::navigation::Navigator;
use hms_client::HmsApi;
use hms_session::SessionContext;
use std::sync::Arc;
use std::time::Duration;

/// 注入到页头和每个页面的共享依赖
#[derive(Clone)]
pub struct PortalContext {
    pub api: Arc<dyn HmsApi>,
    pub session: SessionContext,
    pub navigator: Navigator,
    /// 表单提交成功后跳转前的等待时间
    pub redirect_delay: Duration,
}

impl PortalContext {
    pub fn new(
        api: Arc<dyn HmsApi>,
        session: SessionContext,
        navigator: Navigator,
        redirect_delay: Duration,
    ) -> Self {
        Self {
            api,
            session,
            navigator,
            redirect_delay,
        }
    }
}
