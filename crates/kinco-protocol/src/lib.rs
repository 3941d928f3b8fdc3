//! # Kinco Protocol
//!
//! Kinco FD1X3 伺服驱动器 Modbus 寄存器协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `codec`: 物理量与寄存器之间的编解码
//! - `registers`: 寄存器地址表与枚举值
//! - `request`: 强类型寄存器写请求
//! - `units`: 强类型物理单位（RPM、弧度）
//!
//! ## 字节序
//!
//! 32 位量占用两个连续的 16 位寄存器，按小端排列：低字在前，高字在后。
//! 这与 Modbus 常见的大端字序不同，是该驱动器固件的约定。

pub mod codec;
pub mod registers;
pub mod request;
pub mod units;

// 重新导出常用类型
pub use codec::*;
pub use registers::*;
pub use request::*;
pub use units::*;

use thiserror::Error;

/// 协议编解码错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// 寄存器数量与物理量宽度不符（例如 32 位量需要恰好 2 个寄存器）
    #[error("Invalid register count: expected {expected}, got {actual}")]
    InvalidRegisterCount { expected: usize, actual: usize },

    #[error("Invalid value for register {field}: 0x{value:04X}")]
    InvalidValue { field: String, value: u16 },
}

impl ProtocolError {
    pub(crate) fn invalid_value(field: &str, value: u16) -> Self {
        ProtocolError::InvalidValue {
            field: field.to_string(),
            value,
        }
    }
}
