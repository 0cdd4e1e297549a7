//! # HMS后端客户端
//!
//! 门户与REST后端之间的唯一接缝：
//! - `HmsApi` 接口，页面只依赖它
//! - 基于reqwest的HTTP实现，负责错误消息提取与响应归一化
//! - 后端端点路径

pub mod api;
pub mod endpoints;
pub mod http;

pub use api::HmsApi;
pub use http::{ClientConfig, HttpApiClient};
