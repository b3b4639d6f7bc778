//! 应用层：命令与处理器

mod commands;
mod handler;

pub use commands::*;
pub use handler::*;
