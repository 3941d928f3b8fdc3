//! 寄存器写请求
//!
//! 每个构造函数把一个寄存器与它能接受的值类型绑定在一起，
//! 因此无法把某个寄存器的枚举值写入另一个寄存器。
//!
//! ```rust
//! use kinco_protocol::{ControlCommand, FunctionCode, Payload, WriteRequest};
//!
//! let request = WriteRequest::control(ControlCommand::Stop);
//! assert_eq!(request.address(), 0x3100);
//! assert_eq!(request.function(), FunctionCode::WriteSingleRegister);
//! assert_eq!(request.payload(), Payload::Single(0x0006));
//! ```

use crate::codec::RegisterPair;
use crate::registers::{
    self, ControlCommand, FunctionCode, HomingMethod, OpMode, RegisterDescriptor, VelocityDirection,
};
use std::fmt;

/// 写请求载荷
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Payload {
    /// 单个寄存器
    Single(u16),
    /// 32 位量（两个寄存器，低字在前）
    Pair(RegisterPair),
}

/// 寄存器写请求
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WriteRequest {
    register: &'static RegisterDescriptor,
    payload: Payload,
}

impl WriteRequest {
    const fn single(register: &'static RegisterDescriptor, value: u16) -> Self {
        Self {
            register,
            payload: Payload::Single(value),
        }
    }

    const fn pair(register: &'static RegisterDescriptor, pair: RegisterPair) -> Self {
        Self {
            register,
            payload: Payload::Pair(pair),
        }
    }

    /// 控制字
    pub const fn control(command: ControlCommand) -> Self {
        Self::single(&registers::CONTROL, command.code())
    }

    /// 工作模式
    pub fn opmode(mode: OpMode) -> Self {
        Self::single(&registers::OPMODE, mode.into())
    }

    /// 速度模式方向
    pub fn velocity_direction(direction: VelocityDirection) -> Self {
        Self::single(&registers::VELOCITY_DIRECTION, direction.into())
    }

    /// 目标速度（已编码的原始速度）
    pub const fn velocity_command(value: RegisterPair) -> Self {
        Self::pair(&registers::VELOCITY_COMMAND, value)
    }

    /// 目标位置（编码器计数）
    pub const fn position_command(value: RegisterPair) -> Self {
        Self::pair(&registers::POSITION_COMMAND, value)
    }

    /// 位置模式轮廓速度
    pub const fn position_speed_command(value: RegisterPair) -> Self {
        Self::pair(&registers::POSITION_SPEED_COMMAND, value)
    }

    /// 轮廓加速度
    pub const fn profile_acceleration(value: RegisterPair) -> Self {
        Self::pair(&registers::PROFILE_ACCELERATION, value)
    }

    /// 回零方式
    pub fn homing_method(method: HomingMethod) -> Self {
        Self::single(&registers::HOMING_METHOD, method.into())
    }

    /// 回零寻找开关速度
    pub const fn homing_speed_switch(value: RegisterPair) -> Self {
        Self::pair(&registers::HOMING_SPEED_SWITCH, value)
    }

    /// 回零寻找零点速度
    pub const fn homing_speed_zero(value: RegisterPair) -> Self {
        Self::pair(&registers::HOMING_SPEED_ZERO, value)
    }

    pub fn register(&self) -> &'static RegisterDescriptor {
        self.register
    }

    pub fn address(&self) -> u16 {
        self.register.address
    }

    pub fn function(&self) -> FunctionCode {
        self.register.function
    }

    pub fn payload(&self) -> Payload {
        self.payload
    }
}

impl fmt::Display for WriteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload {
            Payload::Single(value) => write!(
                f,
                "{}(0x{:04X}) <- 0x{:04X}",
                self.register.name, self.register.address, value
            ),
            Payload::Pair(pair) => write!(
                f,
                "{}(0x{:04X}) <- {} [0x{:04X}, 0x{:04X}]",
                self.register.name,
                self.register.address,
                pair.to_value(),
                pair.low,
                pair.high
            ),
        }
    }
}
