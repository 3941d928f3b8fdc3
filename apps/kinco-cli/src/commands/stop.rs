//! 停止类命令
//!
//! 停止、快速停止与复位都会让控制器回到未初始化模式。

use anyhow::Result;
use kinco_driver::{MotionController, RegisterTransport};

/// 停止方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopKind {
    /// 正常停止（控制字 0x0006）
    Stop,
    /// 快速停止（控制字 0x000B）
    QuickStop,
    /// 复位为出厂参数（控制字 0x0080）
    Reset,
}

impl StopKind {
    pub fn execute<T: RegisterTransport>(self, servo: &mut MotionController<T>) -> Result<()> {
        match self {
            StopKind::Stop => {
                servo.stop()?;
                println!("✅ 已停止");
            },
            StopKind::QuickStop => {
                println!("🛑 发送快速停止命令...");
                servo.quick_stop()?;
                println!("✅ 快速停止完成");
            },
            StopKind::Reset => {
                servo.reset()?;
                println!("✅ 驱动器已复位");
            },
        }
        Ok(())
    }
}
