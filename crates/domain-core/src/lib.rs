//! uos-domain-core - 销售工具领域核心类型
//!
//! Lead、报价明细编辑器、报价摘要、会话与印尼盾金额

mod editor;
mod lead;
mod money;
mod offer;
mod session;

pub use editor::*;
pub use lead::*;
pub use money::*;
pub use offer::*;
pub use session::*;
