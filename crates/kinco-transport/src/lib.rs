//! # Kinco Register Transport
//!
//! 寄存器传输抽象层：把“读/写某地址的寄存器”与具体的 Modbus RTU 主站实现解耦。
//!
//! - [`RegisterTransport`]: 控制器依赖的最小接口
//! - [`rtu::RtuTransport`]: 基于 tokio-modbus 同步客户端的串口实现（feature `rtu`）
//! - [`mock::MockTransport`]: 记录所有访问的测试替身（feature `mock`）
//!
//! 所有操作都是阻塞的：调用线程一直等到串口往返完成或超时。
//! 超时是传输层的属性，上层不做重试。

use std::time::Duration;
use thiserror::Error;

// 重新导出 kinco-protocol 中的功能码
pub use kinco_protocol::FunctionCode;

#[cfg(feature = "rtu")]
pub mod rtu;

#[cfg(feature = "rtu")]
pub use rtu::{RtuConfig, RtuTransport};

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "mock")]
pub use mock::{MockFailure, MockTransport, TransportCall};

/// 传输层统一错误类型
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Read timeout")]
    Timeout,

    /// 从站返回异常响应（非法地址、非法功能码等）
    #[error("Modbus exception: {0}")]
    Exception(String),

    /// 帧错误、CRC 错误等协议层问题
    #[error("Modbus protocol error: {0}")]
    Protocol(String),

    #[error("Function code {function:?} is not valid for {operation}")]
    UnsupportedFunction {
        function: FunctionCode,
        operation: &'static str,
    },

    #[error("Invalid response: expected {expected} registers, got {actual}")]
    InvalidResponse { expected: usize, actual: usize },
}

impl TransportError {
    /// 是否为超时错误
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::Timeout => true,
            TransportError::Io(err) => err.kind() == std::io::ErrorKind::TimedOut,
            _ => false,
        }
    }
}

/// 寄存器传输接口（Modbus 主站）
///
/// 实现者负责组帧、CRC 和超时；调用者只关心地址、功能码和寄存器值。
pub trait RegisterTransport {
    /// 读取 `count` 个连续保持寄存器
    fn read_registers(&mut self, address: u16, count: u16) -> Result<Vec<u16>, TransportError>;

    /// 写单个寄存器
    ///
    /// `function` 通常为 `WriteSingleRegister`；`WriteMultipleRegisters` 会以
    /// 长度为 1 的多寄存器写发送。
    fn write_register(
        &mut self,
        address: u16,
        value: u16,
        function: FunctionCode,
    ) -> Result<(), TransportError>;

    /// 写多个连续寄存器
    fn write_registers(
        &mut self,
        address: u16,
        values: &[u16],
        function: FunctionCode,
    ) -> Result<(), TransportError>;

    /// 设置单次调用超时（可选）
    fn set_timeout(&mut self, _timeout: Duration) {}
}

impl<T: RegisterTransport + ?Sized> RegisterTransport for &mut T {
    fn read_registers(&mut self, address: u16, count: u16) -> Result<Vec<u16>, TransportError> {
        (**self).read_registers(address, count)
    }

    fn write_register(
        &mut self,
        address: u16,
        value: u16,
        function: FunctionCode,
    ) -> Result<(), TransportError> {
        (**self).write_register(address, value, function)
    }

    fn write_registers(
        &mut self,
        address: u16,
        values: &[u16],
        function: FunctionCode,
    ) -> Result<(), TransportError> {
        (**self).write_registers(address, values, function)
    }

    fn set_timeout(&mut self, timeout: Duration) {
        (**self).set_timeout(timeout)
    }
}

impl<T: RegisterTransport + ?Sized> RegisterTransport for Box<T> {
    fn read_registers(&mut self, address: u16, count: u16) -> Result<Vec<u16>, TransportError> {
        (**self).read_registers(address, count)
    }

    fn write_register(
        &mut self,
        address: u16,
        value: u16,
        function: FunctionCode,
    ) -> Result<(), TransportError> {
        (**self).write_register(address, value, function)
    }

    fn write_registers(
        &mut self,
        address: u16,
        values: &[u16],
        function: FunctionCode,
    ) -> Result<(), TransportError> {
        (**self).write_registers(address, values, function)
    }

    fn set_timeout(&mut self, timeout: Duration) {
        (**self).set_timeout(timeout)
    }
}

/// 校验读响应长度
pub fn check_response_len(expected: u16, registers: &[u16]) -> Result<(), TransportError> {
    if registers.len() == expected as usize {
        Ok(())
    } else {
        Err(TransportError::InvalidResponse {
            expected: expected as usize,
            actual: registers.len(),
        })
    }
}
