//! ports - 抽象 trait 层
//!
//! 定义远端协作方（数据存储、认证、PDF 生成）的抽象接口

mod auth;
mod generator;
mod repository;

pub use auth::*;
pub use generator::*;
pub use repository::*;
