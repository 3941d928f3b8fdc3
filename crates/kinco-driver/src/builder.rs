//! Builder 模式实现
//!
//! 提供链式构造串口 `MotionController` 的便捷方式。

use crate::config::ControllerConfig;
use crate::controller::MotionController;
use crate::error::DriverError;
use kinco_transport::{RtuConfig, RtuTransport};
use std::time::Duration;

/// Servo Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use kinco_driver::ServoBuilder;
/// use std::time::Duration;
///
/// let servo = ServoBuilder::new()
///     .port("/dev/ttyUSB0")
///     .slave(1)
///     .timeout(Duration::from_millis(200))
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ServoBuilder {
    /// 串口路径（必填）
    port: Option<String>,
    /// 从站地址（默认 1）
    slave: Option<u8>,
    /// 波特率（默认 115200）
    baud_rate: Option<u32>,
    /// 单次调用超时（默认 500ms）
    timeout: Option<Duration>,
    controller_config: Option<ControllerConfig>,
}

impl ServoBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置串口路径（如 "/dev/ttyUSB0"、"COM3"）
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    pub fn slave(mut self, slave: u8) -> Self {
        self.slave = Some(slave);
        self
    }

    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = Some(baud_rate);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// 设置单位换算与握手速度配置（可选）
    pub fn controller_config(mut self, config: ControllerConfig) -> Self {
        self.controller_config = Some(config);
        self
    }

    /// 解析出 RTU 连接配置，不打开串口
    ///
    /// # Errors
    /// - `DriverError::InvalidInput`: 未设置串口路径
    pub fn rtu_config(&self) -> Result<RtuConfig, DriverError> {
        let port = self
            .port
            .clone()
            .ok_or_else(|| DriverError::InvalidInput("serial port not set".to_string()))?;

        let mut config = RtuConfig::new(port, self.slave.unwrap_or(1));
        if let Some(baud_rate) = self.baud_rate {
            config.baud_rate = baud_rate;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        Ok(config)
    }

    /// 打开串口并创建控制器
    ///
    /// # Errors
    /// - `DriverError::InvalidInput`: 未设置串口路径
    /// - `DriverError::Config`: 控制器配置无效
    /// - `DriverError::Transport`: 串口打开失败
    pub fn build(self) -> Result<MotionController<RtuTransport>, DriverError> {
        let rtu = self.rtu_config()?;
        let config = self.controller_config.unwrap_or_default();
        // 先校验配置，避免无效配置时占用串口
        config.validate()?;

        let transport = RtuTransport::open(rtu)?;
        MotionController::with_config(transport, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_port_is_invalid_input() {
        let err = ServoBuilder::new().slave(2).build().unwrap_err();
        assert!(matches!(err, DriverError::InvalidInput(_)));
    }

    #[test]
    fn test_rtu_config_defaults_and_overrides() {
        let config = ServoBuilder::new().port("/dev/ttyUSB0").rtu_config().unwrap();
        assert_eq!(config.slave, 1);
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.timeout, Duration::from_millis(500));

        let config = ServoBuilder::new()
            .port("COM3")
            .slave(7)
            .baud_rate(57_600)
            .timeout(Duration::from_millis(100))
            .rtu_config()
            .unwrap();
        assert_eq!(config.port, "COM3");
        assert_eq!(config.slave, 7);
        assert_eq!(config.baud_rate, 57_600);
        assert_eq!(config.timeout, Duration::from_millis(100));
    }

    #[test]
    fn test_invalid_config_rejected_before_open() {
        let err = ServoBuilder::new()
            .port("/dev/kinco-does-not-exist")
            .controller_config(ControllerConfig {
                encoder_resolution: 0,
                ..Default::default()
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, DriverError::Config(_)));
    }

    #[test]
    fn test_missing_serial_device_is_transport_error() {
        let err = ServoBuilder::new()
            .port("/dev/kinco-does-not-exist")
            .build()
            .unwrap_err();
        assert!(matches!(err, DriverError::Transport(_)));
    }
}
