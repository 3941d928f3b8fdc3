//! 查询命令：速度、位置、状态字

use anyhow::Result;
use clap::Args;
use kinco_driver::{MotionController, PositionUnit, RegisterTransport};

/// 位置查询参数
#[derive(Args, Debug)]
pub struct GetPositionCommand {
    /// 输出原始编码器计数（默认弧度）
    #[arg(long)]
    pub raw: bool,
}

impl GetPositionCommand {
    pub fn unit(&self) -> PositionUnit {
        if self.raw {
            PositionUnit::Raw
        } else {
            PositionUnit::Radians
        }
    }

    pub fn execute<T: RegisterTransport>(&self, servo: &mut MotionController<T>) -> Result<()> {
        let position = servo.get_position(self.unit())?;
        println!("位置: {}", position);
        Ok(())
    }
}

pub fn get_velocity<T: RegisterTransport>(servo: &mut MotionController<T>) -> Result<()> {
    let rpm = servo.get_velocity()?;
    println!("速度: {}", rpm);
    Ok(())
}

pub fn status<T: RegisterTransport>(servo: &mut MotionController<T>) -> Result<()> {
    let status = servo.get_status()?;
    println!("状态字: {} ({:016b})", status, status.bits());
    Ok(())
}
