//! 纯文本渲染

use crate::fetch::FetchState;
use crate::submit::SubmitState;

/// 页面与页头的文本视图
pub trait Render {
    fn render(&self) -> String;
}

pub const LOADING_TEXT: &str = "Loading...";

/// 按加载状态渲染：加载中占位、空列表提示、错误消息或内容
pub(crate) fn fetch_view<T>(
    state: &FetchState<T>,
    empty_text: &str,
    body: impl FnOnce(&T) -> String,
) -> String {
    match state {
        FetchState::Idle => String::new(),
        FetchState::Loading => LOADING_TEXT.to_string(),
        FetchState::Loaded(data) => body(data),
        FetchState::Empty => empty_text.to_string(),
        FetchState::Failed(message) => format!("Error: {}", message),
    }
}

/// 提交状态提示行
pub(crate) fn submit_line(state: &SubmitState) -> Option<String> {
    match state {
        SubmitState::Idle => None,
        SubmitState::Submitting => Some("Submitting...".to_string()),
        SubmitState::Succeeded(message) => Some(format!("Success: {}", message)),
        SubmitState::Failed(message) => Some(format!("Error: {}", message)),
    }
}

pub(crate) fn section(title: &str, body: &str) -> String {
    format!("== {} ==\n{}", title, body)
}

/// 表单字段行，空值显示 `-`
pub(crate) fn field(label: &str, value: &str) -> String {
    let value = if value.trim().is_empty() { "-" } else { value };
    format!("  {:<16} {}", format!("{}:", label), value)
}
