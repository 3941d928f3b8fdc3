//! 运动命令：速度、位置、回零

use anyhow::{Result, bail};
use clap::Args;
use kinco_driver::{MotionController, Position, RegisterTransport};
use kinco_protocol::{Rad, Rpm, VelocityDirection};

/// 速度命令参数
#[derive(Args, Debug)]
pub struct VelocityCommand {
    /// 目标速度（rpm，可为负）
    #[arg(short, long, allow_hyphen_values = true)]
    pub rpm: f64,

    /// 旋转方向（forward / backward）；指定时先显式进入速度模式
    #[arg(short, long)]
    pub direction: Option<VelocityDirection>,

    /// 轮廓加速度（与速度同单位）
    #[arg(short, long)]
    pub acceleration: Option<f64>,
}

impl VelocityCommand {
    pub fn execute<T: RegisterTransport>(&self, servo: &mut MotionController<T>) -> Result<()> {
        if let Some(direction) = self.direction {
            servo.set_velocity_mode(direction)?;
        }
        if let Some(acceleration) = self.acceleration {
            servo.set_profile_acceleration(Rpm(acceleration))?;
        }

        servo.set_velocity(Rpm(self.rpm))?;
        println!("✅ 目标速度: {}", Rpm(self.rpm));
        Ok(())
    }
}

/// 位置命令参数
#[derive(Args, Debug)]
pub struct PositionCommand {
    /// 目标位置（默认弧度；配合 --raw 为编码器计数）
    #[arg(short, long, allow_hyphen_values = true)]
    pub value: f64,

    /// 以原始编码器计数解释 --value
    #[arg(long)]
    pub raw: bool,

    /// 轮廓速度（rpm），进入位置模式后、写目标位置前设置
    #[arg(short, long)]
    pub speed: Option<f64>,
}

impl PositionCommand {
    /// 解析目标位置
    pub fn target(&self) -> Result<Position> {
        if !self.raw {
            return Ok(Position::Radians(Rad(self.value)));
        }

        if self.value.fract() != 0.0 {
            bail!("原始位置必须是整数: {}", self.value);
        }
        if self.value < f64::from(i32::MIN) || self.value > f64::from(i32::MAX) {
            bail!("原始位置超出 32 位范围: {}", self.value);
        }
        Ok(Position::Raw(self.value as i32))
    }

    pub fn execute<T: RegisterTransport>(&self, servo: &mut MotionController<T>) -> Result<()> {
        let target = self.target()?;

        if let Some(speed) = self.speed {
            servo.set_position_mode()?;
            servo.set_position_speed(Rpm(speed))?;
        }

        servo.set_position(target)?;
        println!("✅ 目标位置: {}", target);
        Ok(())
    }
}

/// 回零
pub fn home<T: RegisterTransport>(servo: &mut MotionController<T>) -> Result<()> {
    servo.start_homing()?;
    println!("✅ 回零已启动");
    Ok(())
}
