//! 错误定义模块

use thiserror::Error;

/// 未登录时页面显示的提示
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please login first";

/// 门户统一错误类型
#[derive(Error, Debug)]
pub enum HmsError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("网络错误: {0}")]
    Transport(String),

    #[error("后端错误 ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("响应格式错误: {0}")]
    Payload(String),

    #[error("未登录: {0}")]
    Unauthenticated(String),

    #[error("验证错误: {0}")]
    Validation(String),

    #[error("存储错误: {0}")]
    Storage(String),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("表单正在提交")]
    SubmitInProgress,

    #[error("无效状态转换: 从 {from} 到 {event}")]
    InvalidStateTransition { from: String, event: String },

    #[error("请求已取消")]
    Cancelled,
}

impl HmsError {
    /// 未登录错误，消息固定为页面提示
    pub fn login_required() -> Self {
        HmsError::Unauthenticated(LOGIN_REQUIRED_MESSAGE.to_string())
    }

    /// 转换为页面上显示给用户的消息
    pub fn user_message(&self) -> String {
        match self {
            HmsError::Backend { message, .. } => message.clone(),
            HmsError::Unauthenticated(msg) | HmsError::Validation(msg) => msg.clone(),
            HmsError::Transport(_) => {
                "Unable to reach the server. Please try again later.".to_string()
            }
            HmsError::Payload(_) | HmsError::Serialization(_) => {
                "Unexpected response from the server.".to_string()
            }
            HmsError::SubmitInProgress => "A submission is already in progress.".to_string(),
            HmsError::Cancelled => "Request cancelled.".to_string(),
            other => other.to_string(),
        }
    }

    /// 是否为取消导致的错误
    pub fn is_cancelled(&self) -> bool {
        matches!(self, HmsError::Cancelled)
    }
}

/// 门户统一结果类型
pub type Result<T> = std::result::Result<T, HmsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_is_shown_verbatim() {
        let err = HmsError::Backend {
            status: 400,
            message: "Invalid credentials".to_string(),
        };
        assert_eq!(err.user_message(), "Invalid credentials");
    }

    #[test]
    fn test_transport_message_is_generic() {
        let err = HmsError::Transport("connection refused".to_string());
        assert!(!err.user_message().contains("refused"));
        assert!(!err.user_message().is_empty());
    }

    #[test]
    fn test_login_required() {
        assert_eq!(HmsError::login_required().user_message(), "Please login first");
    }
}
