//! Modbus RTU 串口后端
//!
//! 基于 tokio-modbus 的同步客户端。同步客户端内部持有一个单线程运行时，
//! 对调用者表现为普通的阻塞 API。
//!
//! 串口参数固定为 8 数据位、无校验、1 停止位（8N1），与驱动器出厂设置一致。

use crate::{FunctionCode, RegisterTransport, TransportError, check_response_len};
use std::time::Duration;
use tokio_modbus::Slave;
use tokio_modbus::client::sync::{self, Reader, Writer};
use tracing::{debug, info, trace};

/// 默认波特率
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// 默认单次调用超时
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// RTU 连接配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtuConfig {
    /// 串口路径（如 "/dev/ttyUSB0"、"COM1"）
    pub port: String,
    /// 从站地址
    pub slave: u8,
    /// 波特率（默认 115200）
    pub baud_rate: u32,
    /// 单次调用超时（默认 500ms）
    pub timeout: Duration,
}

impl RtuConfig {
    pub fn new(port: impl Into<String>, slave: u8) -> Self {
        Self {
            port: port.into(),
            slave,
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    fn serial_builder(&self) -> tokio_serial::SerialPortBuilder {
        tokio_serial::new(self.port.as_str(), self.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .timeout(self.timeout)
    }
}

/// Modbus RTU 主站
pub struct RtuTransport {
    ctx: sync::Context,
    config: RtuConfig,
}

impl RtuTransport {
    /// 打开串口并绑定从站地址
    ///
    /// # 错误
    /// - `TransportError::Io`: 串口不存在或被占用
    pub fn open(config: RtuConfig) -> Result<Self, TransportError> {
        let builder = config.serial_builder();
        let ctx = sync::rtu::connect_slave_with_timeout(
            &builder,
            Slave(config.slave),
            Some(config.timeout),
        )?;

        info!(
            port = %config.port,
            slave = config.slave,
            baud_rate = config.baud_rate,
            timeout_ms = config.timeout.as_millis() as u64,
            "Modbus RTU link opened"
        );

        Ok(Self { ctx, config })
    }

    pub fn config(&self) -> &RtuConfig {
        &self.config
    }
}

/// 把 tokio-modbus 的双层结果展平为 `TransportError`
fn flatten<T>(result: tokio_modbus::Result<T>) -> Result<T, TransportError> {
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(exception)) => Err(TransportError::Exception(exception.to_string())),
        Err(tokio_modbus::Error::Transport(err)) if err.kind() == std::io::ErrorKind::TimedOut => {
            Err(TransportError::Timeout)
        },
        Err(tokio_modbus::Error::Transport(err)) => Err(TransportError::Io(err)),
        Err(err) => Err(TransportError::Protocol(err.to_string())),
    }
}

impl RegisterTransport for RtuTransport {
    fn read_registers(&mut self, address: u16, count: u16) -> Result<Vec<u16>, TransportError> {
        trace!("read holding registers 0x{:04X} (count {})", address, count);
        let registers = flatten(self.ctx.read_holding_registers(address, count))?;
        check_response_len(count, &registers)?;
        Ok(registers)
    }

    fn write_register(
        &mut self,
        address: u16,
        value: u16,
        function: FunctionCode,
    ) -> Result<(), TransportError> {
        trace!("write register 0x{:04X} <- 0x{:04X} ({:?})", address, value, function);
        match function {
            FunctionCode::WriteSingleRegister => {
                flatten(self.ctx.write_single_register(address, value))
            },
            FunctionCode::WriteMultipleRegisters => {
                flatten(self.ctx.write_multiple_registers(address, &[value]))
            },
            FunctionCode::ReadHoldingRegisters => Err(TransportError::UnsupportedFunction {
                function,
                operation: "write_register",
            }),
        }
    }

    fn write_registers(
        &mut self,
        address: u16,
        values: &[u16],
        function: FunctionCode,
    ) -> Result<(), TransportError> {
        trace!("write registers 0x{:04X} <- {:04X?} ({:?})", address, values, function);
        if function != FunctionCode::WriteMultipleRegisters {
            return Err(TransportError::UnsupportedFunction {
                function,
                operation: "write_registers",
            });
        }
        flatten(self.ctx.write_multiple_registers(address, values))
    }

    fn set_timeout(&mut self, timeout: Duration) {
        debug!("RTU timeout set to {:?}", timeout);
        self.config.timeout = timeout;
        self.ctx.set_timeout(timeout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rtu_config_defaults() {
        let config = RtuConfig::new("/dev/ttyUSB0", 1);
        assert_eq!(config.port, "/dev/ttyUSB0");
        assert_eq!(config.slave, 1);
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_flatten_ok() {
        let result: tokio_modbus::Result<u16> = Ok(Ok(7));
        assert_eq!(flatten(result).unwrap(), 7);
    }

    #[test]
    fn test_flatten_exception() {
        let result: tokio_modbus::Result<()> =
            Ok(Err(tokio_modbus::ExceptionCode::IllegalDataAddress));
        assert!(matches!(flatten(result), Err(TransportError::Exception(_))));
    }

    #[test]
    fn test_flatten_timeout() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "no response");
        let result: tokio_modbus::Result<()> = Err(tokio_modbus::Error::Transport(io));
        assert!(matches!(flatten(result), Err(TransportError::Timeout)));
    }

    #[test]
    fn test_flatten_io() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "unplugged");
        let result: tokio_modbus::Result<()> = Err(tokio_modbus::Error::Transport(io));
        assert!(matches!(flatten(result), Err(TransportError::Io(_))));
    }

    #[test]
    fn test_open_missing_port_fails() {
        let config = RtuConfig::new("/dev/kinco-does-not-exist", 1);
        assert!(RtuTransport::open(config).is_err());
    }
}
