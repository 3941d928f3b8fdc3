//! 驱动层模块
//!
//! 本模块提供 Kinco FD1X3 伺服的运动控制功能，包括：
//! - 模式状态机（速度 / 绝对位置 / 回零握手序列）
//! - 单位换算配置（RPM 比例、编码器分辨率）
//! - 诊断钩子：自动模式纠正与模式切换事件
//! - 串口 Builder（feature `rtu`）
//!
//! 传输层通过构造函数注入，任何实现 [`RegisterTransport`] 的类型都可以驱动控制器，
//! 包括 `&mut T` 与 `Box<dyn RegisterTransport>`。

mod config;
mod controller;
mod error;
pub mod hooks;
pub mod mode;
mod types;

#[cfg(feature = "rtu")]
mod builder;

#[cfg(feature = "rtu")]
pub use builder::ServoBuilder;
pub use config::ControllerConfig;
pub use controller::MotionController;
pub use error::DriverError;
pub use hooks::{DiagnosticCallback, DiagnosticEvent, EventCollector, HookManager};
pub use kinco_transport::{RegisterTransport, TransportError};
#[cfg(feature = "rtu")]
pub use kinco_transport::{RtuConfig, RtuTransport};
pub use mode::OperatingMode;
pub use types::{Position, PositionUnit};
