//! 控制器工作模式
//!
//! 记录控制器对驱动器当前指令模式的判断。只有模式切换操作
//! （`set_velocity_mode`、`set_position_mode`、`reset`、`stop`、`quick_stop`）
//! 会修改它，并且只在整个寄存器序列全部写成功之后才修改。

use std::fmt;

/// 控制器工作模式
///
/// # 模式说明
///
/// - **Uninitialized**: 刚创建、或停止/复位之后；下一条运动指令会先切换模式
/// - **Velocity**: 已完成速度模式握手，可以直接写目标速度
/// - **Position**: 已完成绝对位置模式握手，可以直接写目标位置
///
/// 回零不是一个独立的控制器模式：`start_homing()` 不修改当前模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OperatingMode {
    #[default]
    Uninitialized,
    Velocity,
    Position,
}

impl OperatingMode {
    pub fn is_velocity(self) -> bool {
        self == Self::Velocity
    }

    pub fn is_position(self) -> bool {
        self == Self::Position
    }

    pub fn is_uninitialized(self) -> bool {
        self == Self::Uninitialized
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Velocity => "velocity",
            Self::Position => "position",
        };
        f.write_str(name)
    }
}
