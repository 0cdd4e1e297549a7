//! 请求作用域
//!
//! 绑定到页面生命周期。页面卸载时取消作用域，进行中的请求被丢弃，
//! 其结果不会再写回页面状态。

use hms_core::{HmsError, Result};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct RequestScope {
    token: CancellationToken,
}

impl RequestScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        debug!("Request scope cancelled");
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// 在作用域内执行请求，作用域先被取消时返回 `HmsError::Cancelled`
    pub async fn run<F, T>(&self, request: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(HmsError::Cancelled),
            result = request => result,
        }
    }
}
