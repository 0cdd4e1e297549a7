//! 后端响应归一化
//!
//! 后端的JSON形态并不统一：列表可能是裸数组，也可能包在对象里；登录响应的
//! ID可能在顶层，也可能在嵌套的 `user` / `doctor` 对象里。这里把它们统一
//! 解析成固定的变体，页面只处理变体，不再猜测形态。

use crate::error::{HmsError, Result};
use crate::models::{Identity, Role};
use crate::utils::parse_id;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// 列表响应
#[derive(Debug, Clone, PartialEq)]
pub enum Listing<T> {
    Items(Vec<T>),
    Empty,
}

impl<T: DeserializeOwned> Listing<T> {
    /// 解析列表响应，接受裸数组，或在 `key` / `data` / `results` 下携带数组的对象
    pub fn from_payload(value: Value, key: &str) -> Result<Self> {
        let items = match value {
            Value::Array(items) => items,
            Value::Object(mut map) => {
                let found = [key, "data", "results"]
                    .iter()
                    .find_map(|k| match map.remove(*k) {
                        Some(Value::Array(items)) => Some(items),
                        _ => None,
                    });
                match found {
                    Some(items) => items,
                    None => {
                        return Err(HmsError::Payload(format!(
                            "expected a list under `{}`",
                            key
                        )))
                    }
                }
            }
            other => {
                return Err(HmsError::Payload(format!(
                    "expected a list, got {}",
                    json_kind(&other)
                )))
            }
        };

        if items.is_empty() {
            return Ok(Listing::Empty);
        }

        let parsed = items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<T>, _>>()
            .map_err(|e| HmsError::Payload(format!("invalid `{}` entry: {}", key, e)))?;
        debug!("Parsed {} `{}` entries", parsed.len(), key);
        Ok(Listing::Items(parsed))
    }
}

impl<T> Listing<T> {
    pub fn len(&self) -> usize {
        match self {
            Listing::Items(items) => items.len(),
            Listing::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Listing::Empty)
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Items(items) => items,
            Listing::Empty => Vec::new(),
        }
    }
}

/// 登录结果
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Accepted(Identity),
    Rejected(String),
}

pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please check your credentials.";

impl LoginOutcome {
    /// 解析2xx登录响应
    ///
    /// `success: false` 或找不到ID都视为拒绝；邮箱缺失时使用登录时输入的邮箱。
    pub fn from_payload(role: Role, value: &Value, submitted_email: &str) -> Self {
        if value.get("success").and_then(Value::as_bool) == Some(false) {
            let message = extract_message(value).unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_string());
            return LoginOutcome::Rejected(message);
        }

        let nested = [role.as_str(), "user", "doctor", "data"]
            .iter()
            .find_map(|key| value.get(*key).filter(|v| v.is_object()));

        let id = value
            .get("id")
            .and_then(parse_id)
            .or_else(|| value.get(&format!("{}_id", role.as_str())).and_then(parse_id))
            .or_else(|| nested.and_then(|n| n.get("id")).and_then(parse_id));

        let id = match id {
            Some(id) => id,
            None => {
                let message =
                    extract_message(value).unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_string());
                return LoginOutcome::Rejected(message);
            }
        };

        let text = |key: &str| -> Option<String> {
            value
                .get(key)
                .or_else(|| nested.and_then(|n| n.get(key)))
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        };

        LoginOutcome::Accepted(Identity {
            id,
            role,
            name: text("name")
                .or_else(|| text("username"))
                .unwrap_or_default(),
            email: text("email").unwrap_or_else(|| submitted_email.trim().to_string()),
            specialization: match role {
                Role::Doctor => text("specialization"),
                Role::User => None,
            },
        })
    }
}

/// 从后端错误响应中提取消息
///
/// 依次尝试 `message`、`error`、`detail`、`non_field_errors[0]`。
pub fn extract_message(value: &Value) -> Option<String> {
    for key in ["message", "error", "detail"] {
        match value.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.clone()),
            Some(Value::Array(items)) => {
                if let Some(s) = items.first().and_then(Value::as_str) {
                    return Some(s.to_string());
                }
            }
            _ => {}
        }
    }
    value
        .get("non_field_errors")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
