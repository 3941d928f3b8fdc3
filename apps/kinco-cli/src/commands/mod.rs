//! 命令定义和实现

pub mod config;
pub mod motion;
pub mod query;
pub mod stop;

pub use config::ConfigCommand;
pub use motion::{PositionCommand, VelocityCommand};
pub use query::GetPositionCommand;
pub use stop::StopKind;
