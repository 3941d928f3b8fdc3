//! 寄存器地址表
//!
//! Kinco FD1X3 驱动器的 Modbus 寄存器定义，以及各寄存器可写入的枚举值。
//!
//! 地址与功能码来自厂商手册，是固定的外部约定。地址错误在本层无法检测，
//! 只会表现为设备行为异常。

use crate::ProtocolError;
use num_enum::{IntoPrimitive, TryFromPrimitive};

// ============================================================================
// 功能码与访问方向
// ============================================================================

/// Modbus 功能码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FunctionCode {
    /// 读保持寄存器 (0x03)
    ReadHoldingRegisters = 0x03,
    /// 写单个寄存器 (0x06)
    WriteSingleRegister = 0x06,
    /// 写多个寄存器 (0x10)
    WriteMultipleRegisters = 0x10,
}

/// 寄存器访问方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Access {
    Read,
    Write,
}

/// 寄存器描述（静态常量，不可变）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterDescriptor {
    /// 寄存器名称（用于日志）
    pub name: &'static str,
    /// Modbus 地址
    pub address: u16,
    /// 访问方向
    pub access: Access,
    /// 读写时使用的功能码
    pub function: FunctionCode,
    /// 占用的寄存器数量（32 位量为 2）
    pub count: u16,
}

impl RegisterDescriptor {
    const fn write_single(name: &'static str, address: u16) -> Self {
        Self {
            name,
            address,
            access: Access::Write,
            function: FunctionCode::WriteSingleRegister,
            count: 1,
        }
    }

    const fn write_pair(name: &'static str, address: u16) -> Self {
        Self {
            name,
            address,
            access: Access::Write,
            function: FunctionCode::WriteMultipleRegisters,
            count: 2,
        }
    }

    const fn read(name: &'static str, address: u16, count: u16) -> Self {
        Self {
            name,
            address,
            access: Access::Read,
            function: FunctionCode::ReadHoldingRegisters,
            count,
        }
    }

    pub fn is_writable(&self) -> bool {
        self.access == Access::Write
    }

    pub fn is_readable(&self) -> bool {
        self.access == Access::Read
    }
}

// ============================================================================
// 寄存器表
// ============================================================================

/// 控制字 (0x3100)
pub const CONTROL: RegisterDescriptor = RegisterDescriptor::write_single("Control", 0x3100);

/// 状态字 (0x3000)
pub const STATUS: RegisterDescriptor = RegisterDescriptor::read("Status", 0x3000, 1);

/// 工作模式 (0x3500)
pub const OPMODE: RegisterDescriptor = RegisterDescriptor::write_single("Opmode", 0x3500);

/// 速度模式方向 (0x4700)
pub const VELOCITY_DIRECTION: RegisterDescriptor =
    RegisterDescriptor::write_single("VelocityDirection", 0x4700);

/// 目标速度 (0x6F00)
pub const VELOCITY_COMMAND: RegisterDescriptor =
    RegisterDescriptor::write_pair("VelocityCommand", 0x6F00);

/// 实际速度 (0x3B00)
pub const VELOCITY_FEEDBACK: RegisterDescriptor =
    RegisterDescriptor::read("VelocityFeedback", 0x3B00, 2);

/// 目标位置 (0x4000)
pub const POSITION_COMMAND: RegisterDescriptor =
    RegisterDescriptor::write_pair("PositionCommand", 0x4000);

/// 位置模式轮廓速度 (0x4A00)
pub const POSITION_SPEED_COMMAND: RegisterDescriptor =
    RegisterDescriptor::write_pair("PositionSpeedCommand", 0x4A00);

/// 实际位置 (0x3700)
pub const POSITION_FEEDBACK: RegisterDescriptor =
    RegisterDescriptor::read("PositionFeedback", 0x3700, 2);

/// 轮廓加速度 (0x4B00)
///
/// 手册标注为单寄存器，但值是 32 位量，实际以写多个寄存器的方式写入。
pub const PROFILE_ACCELERATION: RegisterDescriptor =
    RegisterDescriptor::write_pair("ProfileAcceleration", 0x4B00);

/// 回零方式 (0x4D00)
pub const HOMING_METHOD: RegisterDescriptor =
    RegisterDescriptor::write_single("HomingMethod", 0x4D00);

/// 回零寻找开关速度 (0x5010)
pub const HOMING_SPEED_SWITCH: RegisterDescriptor =
    RegisterDescriptor::write_pair("HomingSpeedSwitch", 0x5010);

/// 回零寻找零点速度 (0x5020)
pub const HOMING_SPEED_ZERO: RegisterDescriptor =
    RegisterDescriptor::write_pair("HomingSpeedZero", 0x5020);

/// 全部寄存器
pub const REGISTER_MAP: [RegisterDescriptor; 13] = [
    CONTROL,
    STATUS,
    OPMODE,
    VELOCITY_DIRECTION,
    VELOCITY_COMMAND,
    VELOCITY_FEEDBACK,
    POSITION_COMMAND,
    POSITION_SPEED_COMMAND,
    POSITION_FEEDBACK,
    PROFILE_ACCELERATION,
    HOMING_METHOD,
    HOMING_SPEED_SWITCH,
    HOMING_SPEED_ZERO,
];

// ============================================================================
// 控制字命令
// ============================================================================

/// 绝对位置模式启动码
///
/// 厂商手册给出的原始值。位置模式使能序列中会先以
/// [`ControlCommand::AbsolutePositionLatch`] 写一次，再以
/// [`ControlCommand::StartAbsolutePosition`] 写一次，两步不可合并。
pub const CONTROL_START_ABSOLUTE_POSITION: u16 = 0x103F;

/// 两步握手的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandshakeStep {
    Set1,
    Set2,
}

/// 控制字命令
///
/// 部分命令共享同一个原始值（例如 `Start` 与 `Homing(Set1)` 都是 0x000F），
/// 因此使用带标签的枚举而不是带判别值的 C 风格枚举。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlCommand {
    /// 停止 (0x0006)
    Stop,
    /// 使能 (0x000F)
    Start,
    /// 复位到出厂设置 (0x0080)
    Reset,
    /// 快速停止 (0x000B)
    QuickStop,
    /// 绝对位置设定握手 (Set1 = 0x002F, Set2 = 0x003F)
    AbsolutePosition(HandshakeStep),
    /// 绝对位置锁存 (0x103F)
    AbsolutePositionLatch,
    /// 启动绝对位置运动 (0x103F)
    StartAbsolutePosition,
    /// 回零握手 (Set1 = 0x000F, Set2 = 0x001F)
    Homing(HandshakeStep),
}

impl ControlCommand {
    /// 控制字原始值
    pub const fn code(self) -> u16 {
        match self {
            ControlCommand::Stop => 0x0006,
            ControlCommand::Start => 0x000F,
            ControlCommand::Reset => 0x0080,
            ControlCommand::QuickStop => 0x000B,
            ControlCommand::AbsolutePosition(HandshakeStep::Set1) => 0x002F,
            ControlCommand::AbsolutePosition(HandshakeStep::Set2) => 0x003F,
            ControlCommand::AbsolutePositionLatch => CONTROL_START_ABSOLUTE_POSITION,
            ControlCommand::StartAbsolutePosition => CONTROL_START_ABSOLUTE_POSITION,
            ControlCommand::Homing(HandshakeStep::Set1) => 0x000F,
            ControlCommand::Homing(HandshakeStep::Set2) => 0x001F,
        }
    }
}

impl From<ControlCommand> for u16 {
    fn from(command: ControlCommand) -> Self {
        command.code()
    }
}

// ============================================================================
// 枚举寄存器值
// ============================================================================

/// 工作模式 (Opmode)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum OpMode {
    /// 位置模式
    Position = 1,
    /// 速度模式
    Velocity = 3,
    /// 力矩模式
    Torque = 4,
    /// 回零模式
    Home = 6,
}

impl TryFrom<u16> for OpMode {
    type Error = ProtocolError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(OpMode::Position),
            3 => Ok(OpMode::Velocity),
            4 => Ok(OpMode::Torque),
            6 => Ok(OpMode::Home),
            _ => Err(ProtocolError::invalid_value("Opmode", value)),
        }
    }
}

/// 速度模式方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u16)]
pub enum VelocityDirection {
    /// 正向（默认）
    #[default]
    Forward = 0,
    /// 反向
    Backward = 1,
}

impl TryFrom<u16> for VelocityDirection {
    type Error = ProtocolError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VelocityDirection::Forward),
            1 => Ok(VelocityDirection::Backward),
            _ => Err(ProtocolError::invalid_value("VelocityDirection", value)),
        }
    }
}

impl std::str::FromStr for VelocityDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "forward" => Ok(VelocityDirection::Forward),
            "backward" => Ok(VelocityDirection::Backward),
            other => Err(format!(
                "invalid direction '{}', expected 'forward' or 'backward'",
                other
            )),
        }
    }
}

/// 回零方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive)]
#[repr(u16)]
pub enum HomingMethod {
    /// 回到原点开关（方式 19）
    #[default]
    HomeSwitch = 19,
}

impl TryFrom<u16> for HomingMethod {
    type Error = ProtocolError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            19 => Ok(HomingMethod::HomeSwitch),
            _ => Err(ProtocolError::invalid_value("HomingMethod", value)),
        }
    }
}

/// 状态字（原始值）
///
/// 位定义随固件版本变化，这里只保留原始值，不做解释。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusWord(pub u16);

impl StatusWord {
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// 指定位是否置位
    pub const fn bit(self, index: u8) -> bool {
        index < 16 && (self.0 >> index) & 1 == 1
    }
}

impl TryFrom<&[u16]> for StatusWord {
    type Error = ProtocolError;

    fn try_from(registers: &[u16]) -> Result<Self, Self::Error> {
        match registers {
            [word] => Ok(StatusWord(*word)),
            _ => Err(ProtocolError::InvalidRegisterCount {
                expected: 1,
                actual: registers.len(),
            }),
        }
    }
}

impl std::fmt::Display for StatusWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_register_addresses() {
        assert_eq!(CONTROL.address, 0x3100);
        assert_eq!(STATUS.address, 0x3000);
        assert_eq!(OPMODE.address, 0x3500);
        assert_eq!(VELOCITY_DIRECTION.address, 0x4700);
        assert_eq!(VELOCITY_COMMAND.address, 0x6F00);
        assert_eq!(VELOCITY_FEEDBACK.address, 0x3B00);
        assert_eq!(POSITION_COMMAND.address, 0x4000);
        assert_eq!(POSITION_SPEED_COMMAND.address, 0x4A00);
        assert_eq!(POSITION_FEEDBACK.address, 0x3700);
        assert_eq!(PROFILE_ACCELERATION.address, 0x4B00);
        assert_eq!(HOMING_METHOD.address, 0x4D00);
        assert_eq!(HOMING_SPEED_SWITCH.address, 0x5010);
        assert_eq!(HOMING_SPEED_ZERO.address, 0x5020);
    }

    #[test]
    fn test_register_map_addresses_unique() {
        let addresses: HashSet<u16> = REGISTER_MAP.iter().map(|r| r.address).collect();
        assert_eq!(addresses.len(), REGISTER_MAP.len());
    }

    #[test]
    fn test_function_codes_match_access() {
        for reg in REGISTER_MAP.iter() {
            match reg.access {
                Access::Read => {
                    assert_eq!(reg.function, FunctionCode::ReadHoldingRegisters, "{}", reg.name)
                },
                Access::Write if reg.count == 1 => {
                    assert_eq!(reg.function, FunctionCode::WriteSingleRegister, "{}", reg.name)
                },
                Access::Write => {
                    assert_eq!(reg.function, FunctionCode::WriteMultipleRegisters, "{}", reg.name)
                },
            }
        }
    }

    #[test]
    fn test_feedback_registers_are_pairs() {
        assert_eq!(VELOCITY_FEEDBACK.count, 2);
        assert_eq!(POSITION_FEEDBACK.count, 2);
        assert!(VELOCITY_FEEDBACK.is_readable());
        assert!(!POSITION_FEEDBACK.is_writable());
    }

    #[test]
    fn test_function_code_values() {
        assert_eq!(u8::from(FunctionCode::ReadHoldingRegisters), 3);
        assert_eq!(u8::from(FunctionCode::WriteSingleRegister), 6);
        assert_eq!(u8::from(FunctionCode::WriteMultipleRegisters), 16);
        assert_eq!(
            FunctionCode::try_from(0x10).unwrap(),
            FunctionCode::WriteMultipleRegisters
        );
        assert!(FunctionCode::try_from(0x04).is_err());
    }

    #[test]
    fn test_control_codes() {
        assert_eq!(ControlCommand::Stop.code(), 0x0006);
        assert_eq!(ControlCommand::Start.code(), 0x000F);
        assert_eq!(ControlCommand::Reset.code(), 0x0080);
        assert_eq!(ControlCommand::QuickStop.code(), 0x000B);
        assert_eq!(
            ControlCommand::AbsolutePosition(HandshakeStep::Set1).code(),
            0x002F
        );
        assert_eq!(
            ControlCommand::AbsolutePosition(HandshakeStep::Set2).code(),
            0x003F
        );
        assert_eq!(ControlCommand::AbsolutePositionLatch.code(), 0x103F);
        assert_eq!(ControlCommand::StartAbsolutePosition.code(), 0x103F);
        assert_eq!(ControlCommand::Homing(HandshakeStep::Set1).code(), 0x000F);
        assert_eq!(ControlCommand::Homing(HandshakeStep::Set2).code(), 0x001F);
        assert_eq!(u16::from(ControlCommand::Reset), 0x0080);
    }

    #[test]
    fn test_opmode_values() {
        assert_eq!(u16::from(OpMode::Position), 1);
        assert_eq!(u16::from(OpMode::Velocity), 3);
        assert_eq!(u16::from(OpMode::Torque), 4);
        assert_eq!(u16::from(OpMode::Home), 6);
        assert_eq!(OpMode::try_from(3).unwrap(), OpMode::Velocity);
        assert_eq!(
            OpMode::try_from(2),
            Err(ProtocolError::InvalidValue {
                field: "Opmode".to_string(),
                value: 2
            })
        );
    }

    #[test]
    fn test_velocity_direction() {
        assert_eq!(u16::from(VelocityDirection::Forward), 0);
        assert_eq!(u16::from(VelocityDirection::Backward), 1);
        assert_eq!(VelocityDirection::default(), VelocityDirection::Forward);
        assert_eq!(
            "Backward".parse::<VelocityDirection>().unwrap(),
            VelocityDirection::Backward
        );
        assert!("sideways".parse::<VelocityDirection>().is_err());
        assert!(VelocityDirection::try_from(2).is_err());
    }

    #[test]
    fn test_homing_method() {
        assert_eq!(u16::from(HomingMethod::HomeSwitch), 19);
        assert_eq!(HomingMethod::try_from(19).unwrap(), HomingMethod::HomeSwitch);
        assert!(HomingMethod::try_from(17).is_err());
    }

    #[test]
    fn test_status_word() {
        let status = StatusWord::try_from(&[0x0237u16][..]).unwrap();
        assert_eq!(status.bits(), 0x0237);
        assert!(status.bit(0));
        assert!(!status.bit(3));
        assert!(status.bit(9));
        assert!(!status.bit(16));
        assert_eq!(status.to_string(), "0x0237");
        assert!(StatusWord::try_from(&[1u16, 2][..]).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_lowercase_direction() {
        let json = serde_json::to_string(&VelocityDirection::Backward).unwrap();
        assert_eq!(json, "\"backward\"");
        let parsed: OpMode = serde_json::from_str("\"Velocity\"").unwrap();
        assert_eq!(parsed, OpMode::Velocity);
    }
}
