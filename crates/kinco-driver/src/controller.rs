//! 运动控制器（模式状态机）
//!
//! 把速度、位置、回零等运动指令翻译为有序的寄存器写序列。
//!
//! # 状态机
//!
//! ```text
//!                set_velocity_mode()
//!   Uninitialized ──────────────────▶ Velocity
//!        ▲  │      set_position_mode()
//!        │  └───────────────────────▶ Position
//!        │
//!        └── stop() / quick_stop() / reset()（任意模式）
//! ```
//!
//! 每一步都是一次阻塞的寄存器 I/O，可能独立失败。任何一步失败都会立即中止序列，
//! 错误原样返回，模式保持不变；已经写入的步骤不会回滚，驱动器可能处于部分配置状态。
//! 控制器不做重试。
//!
//! # 示例
//!
//! ```rust,ignore
//! use kinco_driver::{MotionController, Position};
//! use kinco_protocol::{Rad, Rpm};
//! use kinco_transport::{RtuConfig, RtuTransport};
//!
//! let transport = RtuTransport::open(RtuConfig::new("/dev/ttyUSB0", 1))?;
//! let mut servo = MotionController::new(transport);
//!
//! servo.set_velocity(Rpm(500.0))?;   // 自动进入速度模式
//! servo.stop()?;
//! servo.set_position(Position::Radians(Rad(3.14)))?;  // 自动进入位置模式
//! ```

use crate::config::ControllerConfig;
use crate::error::DriverError;
use crate::hooks::{DiagnosticCallback, DiagnosticEvent, HookManager};
use crate::mode::OperatingMode;
use crate::types::{Position, PositionUnit};
use kinco_protocol::registers::{self, RegisterDescriptor};
use kinco_protocol::{
    ControlCommand, HandshakeStep, HomingMethod, OpMode, Payload, Rad, RegisterPair, Rpm, StatusWord,
    VelocityDirection, WriteRequest, decode_radians, decode_rpm, decode_value, encode_radians,
    encode_rpm, encode_value,
};
use kinco_transport::RegisterTransport;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// 单轴运动控制器
///
/// 独占一个寄存器传输句柄。所有操作都需要 `&mut self`，
/// 因此同一个控制器不能在没有外部互斥的情况下被多个线程驱动。
pub struct MotionController<T: RegisterTransport> {
    transport: T,
    config: ControllerConfig,
    mode: OperatingMode,
    hooks: HookManager,
}

impl<T: RegisterTransport> MotionController<T> {
    /// 使用默认配置创建控制器，初始模式为 `Uninitialized`
    ///
    /// 创建本身不访问设备。
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            config: ControllerConfig::default(),
            mode: OperatingMode::Uninitialized,
            hooks: HookManager::new(),
        }
    }

    /// 使用自定义配置创建控制器
    ///
    /// # 错误
    /// - `DriverError::Config`: 换算常数无效
    pub fn with_config(transport: T, config: ControllerConfig) -> Result<Self, DriverError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(transport)
        })
    }

    /// 控制器当前认为的模式
    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn add_callback(&mut self, callback: Arc<dyn DiagnosticCallback>) {
        self.hooks.add_callback(callback);
    }

    pub fn hooks_mut(&mut self) -> &mut HookManager {
        &mut self.hooks
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// 设置传输层单次调用超时
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.transport.set_timeout(timeout);
    }

    /// 取回传输句柄
    pub fn into_transport(self) -> T {
        self.transport
    }

    // ------------------------------------------------------------------
    // 模式切换
    // ------------------------------------------------------------------

    /// 复位驱动器（恢复出厂参数），模式 → `Uninitialized`
    pub fn reset(&mut self) -> Result<(), DriverError> {
        self.send(WriteRequest::control(ControlCommand::Reset))?;
        self.transition(OperatingMode::Uninitialized);
        Ok(())
    }

    /// 进入速度模式
    ///
    /// 写序列：Stop → Opmode=Velocity → 方向 → 目标速度 0 → Start。
    /// 全部成功后模式 → `Velocity`。
    pub fn set_velocity_mode(&mut self, direction: VelocityDirection) -> Result<(), DriverError> {
        let zero = encode_rpm(0.0, self.config.rpm_scale);
        self.send_sequence(
            "set_velocity_mode",
            &[
                WriteRequest::control(ControlCommand::Stop),
                WriteRequest::opmode(OpMode::Velocity),
                WriteRequest::velocity_direction(direction),
                WriteRequest::velocity_command(zero),
                WriteRequest::control(ControlCommand::Start),
            ],
        )?;
        self.transition(OperatingMode::Velocity);
        Ok(())
    }

    /// 进入绝对位置模式
    ///
    /// 写序列：Stop → Start → Opmode=Position → 读取当前位置 → 目标位置=当前位置 →
    /// 轮廓速度 → 握手 Set1 → Set2 → 0x103F 锁存 → 启动绝对位置。
    /// 以当前位置为目标，进入模式时电机不会移动。
    pub fn set_position_mode(&mut self) -> Result<(), DriverError> {
        const OPERATION: &str = "set_position_mode";

        self.send_sequence(
            OPERATION,
            &[
                WriteRequest::control(ControlCommand::Stop),
                WriteRequest::control(ControlCommand::Start),
                WriteRequest::opmode(OpMode::Position),
            ],
        )?;

        let current = self.read_pair(&registers::POSITION_FEEDBACK).inspect_err(|e| {
            error!("{} aborted while reading current position: {}", OPERATION, e);
        })?;
        debug!("{}: holding current position {}", OPERATION, current.to_value());

        let speed = encode_rpm(self.config.position_mode_speed_rpm, self.config.rpm_scale);
        self.send_sequence(
            OPERATION,
            &[
                WriteRequest::position_command(current),
                WriteRequest::position_speed_command(speed),
                WriteRequest::control(ControlCommand::AbsolutePosition(HandshakeStep::Set1)),
                WriteRequest::control(ControlCommand::AbsolutePosition(HandshakeStep::Set2)),
                WriteRequest::control(ControlCommand::AbsolutePositionLatch),
                WriteRequest::control(ControlCommand::StartAbsolutePosition),
            ],
        )?;
        self.transition(OperatingMode::Position);
        Ok(())
    }

    /// 停止，模式 → `Uninitialized`
    pub fn stop(&mut self) -> Result<(), DriverError> {
        self.send(WriteRequest::control(ControlCommand::Stop))?;
        self.transition(OperatingMode::Uninitialized);
        Ok(())
    }

    /// 快速停止，模式 → `Uninitialized`
    pub fn quick_stop(&mut self) -> Result<(), DriverError> {
        self.send(WriteRequest::control(ControlCommand::QuickStop))?;
        self.transition(OperatingMode::Uninitialized);
        Ok(())
    }

    // ------------------------------------------------------------------
    // 速度
    // ------------------------------------------------------------------

    /// 设置目标速度
    ///
    /// 不在速度模式时，先触发 `ModeCorrection` 事件并以正向进入速度模式。
    pub fn set_velocity(&mut self, rpm: Rpm) -> Result<(), DriverError> {
        if !self.mode.is_velocity() {
            self.correct_mode("set_velocity", OperatingMode::Velocity);
            self.set_velocity_mode(VelocityDirection::Forward)?;
        }
        let value = encode_rpm(rpm.value(), self.config.rpm_scale);
        self.send(WriteRequest::velocity_command(value))
    }

    /// 设置轮廓加速度（与速度同比例编码）
    pub fn set_profile_acceleration(&mut self, acceleration: Rpm) -> Result<(), DriverError> {
        let value = encode_rpm(acceleration.value(), self.config.rpm_scale);
        self.send(WriteRequest::profile_acceleration(value))
    }

    /// 读取实际速度
    pub fn get_velocity(&mut self) -> Result<Rpm, DriverError> {
        let registers = self.read(&registers::VELOCITY_FEEDBACK)?;
        Ok(Rpm(decode_rpm(&registers, self.config.rpm_scale)?))
    }

    // ------------------------------------------------------------------
    // 位置
    // ------------------------------------------------------------------

    /// 设置位置模式轮廓速度
    ///
    /// 不检查当前模式。
    pub fn set_position_speed(&mut self, rpm: Rpm) -> Result<(), DriverError> {
        let value = encode_rpm(rpm.value(), self.config.rpm_scale);
        self.send(WriteRequest::position_speed_command(value))
    }

    /// 设置目标位置
    ///
    /// 不在位置模式时，先触发 `ModeCorrection` 事件并进入位置模式。
    pub fn set_position(&mut self, position: Position) -> Result<(), DriverError> {
        if !self.mode.is_position() {
            self.correct_mode("set_position", OperatingMode::Position);
            self.set_position_mode()?;
        }
        let value = match position {
            Position::Radians(rad) => encode_radians(rad.value(), self.config.encoder_resolution),
            Position::Raw(counts) => encode_value(counts),
        };
        self.send(WriteRequest::position_command(value))
    }

    /// 读取实际位置
    pub fn get_position(&mut self, unit: PositionUnit) -> Result<Position, DriverError> {
        let registers = self.read(&registers::POSITION_FEEDBACK)?;
        let position = match unit {
            PositionUnit::Radians => Position::Radians(
                Rad(decode_radians(&registers, self.config.encoder_resolution)?),
            ),
            PositionUnit::Raw => Position::Raw(decode_value(&registers)?),
        };
        Ok(position)
    }

    // ------------------------------------------------------------------
    // 回零与状态
    // ------------------------------------------------------------------

    /// 启动回零（寻找原点开关）
    ///
    /// 写序列：Stop → 回零握手 Set1 → Opmode=Home → 回零方式 19 → 开关速度 →
    /// 零点速度 → 回零握手 Set2。控制器模式保持不变。
    pub fn start_homing(&mut self) -> Result<(), DriverError> {
        let scale = self.config.rpm_scale;
        let switch_speed = encode_rpm(self.config.homing_speed_switch_rpm, scale);
        let zero_speed = encode_rpm(self.config.homing_speed_zero_rpm, scale);
        self.send_sequence(
            "start_homing",
            &[
                WriteRequest::control(ControlCommand::Stop),
                WriteRequest::control(ControlCommand::Homing(HandshakeStep::Set1)),
                WriteRequest::opmode(OpMode::Home),
                WriteRequest::homing_method(HomingMethod::HomeSwitch),
                WriteRequest::homing_speed_switch(switch_speed),
                WriteRequest::homing_speed_zero(zero_speed),
                WriteRequest::control(ControlCommand::Homing(HandshakeStep::Set2)),
            ],
        )?;
        info!("Homing started (mode remains {})", self.mode);
        Ok(())
    }

    /// 读取状态字
    pub fn get_status(&mut self) -> Result<StatusWord, DriverError> {
        let registers = self.read(&registers::STATUS)?;
        Ok(StatusWord::try_from(registers.as_slice())?)
    }

    // ------------------------------------------------------------------
    // 内部
    // ------------------------------------------------------------------

    fn send(&mut self, request: WriteRequest) -> Result<(), DriverError> {
        debug!("write {}", request);
        match request.payload() {
            Payload::Single(value) => {
                self.transport
                    .write_register(request.address(), value, request.function())?
            },
            Payload::Pair(pair) => {
                self.transport
                    .write_registers(request.address(), &pair.words(), request.function())?
            },
        }
        Ok(())
    }

    /// 按顺序写出整个序列，任意一步失败即中止
    fn send_sequence(
        &mut self,
        operation: &'static str,
        steps: &[WriteRequest],
    ) -> Result<(), DriverError> {
        for (index, step) in steps.iter().enumerate() {
            if let Err(e) = self.send(*step) {
                error!(
                    "{} aborted at step {}/{} ({}): {}",
                    operation,
                    index + 1,
                    steps.len(),
                    step,
                    e
                );
                return Err(e);
            }
        }
        Ok(())
    }

    fn read(&mut self, register: &RegisterDescriptor) -> Result<Vec<u16>, DriverError> {
        let values = self.transport.read_registers(register.address, register.count)?;
        debug!(
            "read {}(0x{:04X}) -> {:04X?}",
            register.name, register.address, values
        );
        Ok(values)
    }

    fn read_pair(&mut self, register: &RegisterDescriptor) -> Result<RegisterPair, DriverError> {
        let values = self.read(register)?;
        Ok(RegisterPair::try_from(values.as_slice())?)
    }

    fn correct_mode(&mut self, operation: &'static str, to: OperatingMode) {
        let event = DiagnosticEvent::ModeCorrection {
            operation,
            from: self.mode,
            to,
        };
        warn!("{}", event);
        self.hooks.trigger_all(&event);
    }

    fn transition(&mut self, to: OperatingMode) {
        let from = self.mode;
        self.mode = to;
        if from != to {
            info!("Servo mode changed: {} -> {}", from, to);
            self.hooks.trigger_all(&DiagnosticEvent::ModeChanged { from, to });
        }
    }
}

impl<T: RegisterTransport> std::fmt::Debug for MotionController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionController")
            .field("mode", &self.mode)
            .field("config", &self.config)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
