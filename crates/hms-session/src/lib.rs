//! # HMS会话模块
//!
//! 提供门户的客户端会话状态：
//! - 本地持久化存储：与浏览器local storage相同的键，支持内存与文件两种后端
//! - 会话上下文：身份的唯一数据源，注入到页头和每个页面，并支持变更订阅

pub mod context;
pub mod storage;

pub use context::{keys, SessionContext};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
