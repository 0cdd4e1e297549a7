//! # HMS Core
//!
//! 医院管理门户的核心模块，提供统一错误类型、实体模型、后端响应归一化与通用工具。

pub mod error;
pub mod models;
pub mod payload;
pub mod utils;

pub use error::{HmsError, Result};
pub use models::*;
pub use payload::{extract_message, Listing, LoginOutcome};
