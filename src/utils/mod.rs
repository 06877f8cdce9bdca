//! Utils: 文件日志 Actor 与参数校验

pub mod logger;
pub mod validator;
