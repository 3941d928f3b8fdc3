//! 驱动层错误类型定义

use kinco_protocol::ProtocolError;
use kinco_transport::TransportError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 寄存器传输错误（超时、异常响应、串口故障）
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// 寄存器编解码错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 无效输入（如缺少串口路径）
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 配置文件解析失败
    #[error("Config error: {0}")]
    Config(String),
}

impl DriverError {
    /// 是否为传输超时
    pub fn is_timeout(&self) -> bool {
        matches!(self, DriverError::Transport(err) if err.is_timeout())
    }
}

impl From<toml::de::Error> for DriverError {
    fn from(err: toml::de::Error) -> Self {
        DriverError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::DriverError;
    use kinco_protocol::ProtocolError;
    use kinco_transport::TransportError;

    #[test]
    fn test_driver_error_display() {
        let driver_error = DriverError::Transport(TransportError::Timeout);
        assert_eq!(driver_error.to_string(), "Transport error: Read timeout");

        let driver_error = DriverError::Protocol(ProtocolError::InvalidRegisterCount {
            expected: 2,
            actual: 3,
        });
        let msg = driver_error.to_string();
        assert!(msg.contains("Invalid register count"), "Protocol error message: {}", msg);

        let driver_error = DriverError::InvalidInput("serial port not set".to_string());
        assert_eq!(driver_error.to_string(), "Invalid input: serial port not set");
    }

    #[test]
    fn test_from_transport_error() {
        let driver_error: DriverError = TransportError::Exception("Illegal function".into()).into();
        match driver_error {
            DriverError::Transport(TransportError::Exception(msg)) => {
                assert_eq!(msg, "Illegal function")
            },
            other => panic!("Expected Transport variant, got {:?}", other),
        }
    }

    #[test]
    fn test_from_protocol_error() {
        let protocol_error = ProtocolError::InvalidRegisterCount {
            expected: 2,
            actual: 1,
        };
        let driver_error: DriverError = protocol_error.into();
        assert!(matches!(
            driver_error,
            DriverError::Protocol(ProtocolError::InvalidRegisterCount {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_is_timeout() {
        assert!(DriverError::Transport(TransportError::Timeout).is_timeout());
        assert!(!DriverError::InvalidInput("x".into()).is_timeout());
    }
}
