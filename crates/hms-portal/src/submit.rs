//! 表单提交周期
//!
//! idle → submitting → succeeded | failed → idle。提交中再次提交会被拒绝；
//! 成功或失败后表单仍可编辑，下一次提交从头开始。

use crate::scope::RequestScope;
use hms_core::utils::{is_blank, is_valid_email};
use hms_core::{HmsError, Result};
use std::future::Future;
use tracing::{debug, info, warn};

/// 提交状态
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmitState {
    #[default]
    Idle,
    Submitting,
    Succeeded(String),
    Failed(String),
}

/// 单个表单的提交周期
#[derive(Debug)]
pub struct SubmitCycle {
    what: &'static str,
    state: SubmitState,
}

impl SubmitCycle {
    pub fn new(what: &'static str) -> Self {
        Self {
            what,
            state: SubmitState::Idle,
        }
    }

    pub fn state(&self) -> &SubmitState {
        &self.state
    }

    /// 提交按钮是否禁用
    pub fn is_submitting(&self) -> bool {
        self.state == SubmitState::Submitting
    }

    pub fn begin(&mut self) -> Result<()> {
        if self.is_submitting() {
            warn!("{} already submitting", self.what);
            return Err(HmsError::SubmitInProgress);
        }
        debug!("{}: submitting", self.what);
        self.state = SubmitState::Submitting;
        Ok(())
    }

    pub fn succeed(&mut self, message: impl Into<String>) -> Result<()> {
        self.finish("Succeeded")?;
        let message = message.into();
        info!("{} succeeded: {}", self.what, message);
        self.state = SubmitState::Succeeded(message);
        Ok(())
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<()> {
        self.finish("Failed")?;
        let message = message.into();
        warn!("{} failed: {}", self.what, message);
        self.state = SubmitState::Failed(message);
        Ok(())
    }

    /// 输入校验失败，请求不会发出
    pub fn reject_input(&mut self, err: HmsError) -> Result<()> {
        if self.is_submitting() {
            return Err(HmsError::SubmitInProgress);
        }
        self.state = SubmitState::Failed(err.user_message());
        Ok(())
    }

    pub fn reset(&mut self) -> Result<()> {
        if self.is_submitting() {
            return Err(HmsError::SubmitInProgress);
        }
        self.state = SubmitState::Idle;
        Ok(())
    }

    fn finish(&self, event: &str) -> Result<()> {
        if self.is_submitting() {
            Ok(())
        } else {
            Err(HmsError::InvalidStateTransition {
                from: format!("{:?}", self.state),
                event: event.to_string(),
            })
        }
    }

    /// 执行一次写请求
    ///
    /// 成功时返回结果，由调用方决定成功消息；失败时进入错误状态并返回 `None`。
    /// 作用域被取消时返回 `HmsError::Cancelled`。
    pub async fn run<F, T>(&mut self, scope: &RequestScope, request: F) -> Result<Option<T>>
    where
        F: Future<Output = Result<T>>,
    {
        if scope.is_cancelled() {
            return Err(HmsError::Cancelled);
        }
        self.begin()?;

        match scope.run(request).await {
            Ok(value) => Ok(Some(value)),
            Err(HmsError::Cancelled) => Err(HmsError::Cancelled),
            Err(e) => {
                self.fail(e.user_message())?;
                Ok(None)
            }
        }
    }
}

/// 对应HTML `required`
pub fn require(label: &str, value: &str) -> Result<()> {
    if is_blank(value) {
        return Err(HmsError::Validation(format!("{} is required", label)));
    }
    Ok(())
}

/// 对应HTML `type=email`
pub fn require_email(value: &str) -> Result<()> {
    require("Email", value)?;
    if !is_valid_email(value) {
        return Err(HmsError::Validation(
            "Please enter a valid email address".to_string(),
        ));
    }
    Ok(())
}
