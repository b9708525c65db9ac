//! Web 处理器模块

pub mod pages;
pub mod proxy;
pub mod status;

pub use pages::*;
pub use proxy::*;
pub use status::*;
