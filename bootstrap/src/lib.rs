//! uos-bootstrap - 统一启动骨架
//!
//! 运行时初始化、关闭信号与 metrics 记录

mod recorder;
mod runtime;

pub use recorder::*;
pub use runtime::*;
