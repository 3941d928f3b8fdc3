//! # Kinco CLI
//!
//! Command-line interface for Kinco FD1X3 servo drives over Modbus RTU.
//!
//! 每个命令独立执行（内部：打开串口 -> 执行 -> 关闭串口）：
//!
//! ```bash
//! # 配置默认串口
//! kinco-cli config set --port /dev/ttyUSB0 --slave 1
//!
//! # 速度模式
//! kinco-cli velocity --rpm 500 --direction backward
//!
//! # 绝对位置（编码器计数），轮廓速度 200 rpm
//! kinco-cli position --value -52500 --raw --speed 200
//!
//! # 临时覆盖串口
//! kinco-cli --port COM3 get-position
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod connection;

use commands::{ConfigCommand, GetPositionCommand, PositionCommand, StopKind, VelocityCommand};
use connection::{ConnectionArgs, Session};

/// Kinco CLI - 伺服驱动器命令行工具
#[derive(Parser, Debug)]
#[command(name = "kinco-cli")]
#[command(about = "Command-line interface for Kinco FD1X3 servo drives", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// 输出诊断事件（自动模式切换等）
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 复位驱动器（恢复出厂参数）
    Reset,

    /// 停止
    Stop,

    /// 快速停止
    QuickStop,

    /// 速度模式运行
    Velocity {
        #[command(flatten)]
        args: VelocityCommand,
    },

    /// 查询实际速度
    GetVelocity,

    /// 运动到绝对位置
    Position {
        #[command(flatten)]
        args: PositionCommand,
    },

    /// 查询实际位置
    GetPosition {
        #[command(flatten)]
        args: GetPositionCommand,
    },

    /// 回零（寻找原点开关）
    Home,

    /// 查询状态字
    Status,
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kinco_cli=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    if let Commands::Config(cmd) = cli.command {
        return cmd.execute();
    }

    let mut session = Session::open(&cli.connection, cli.verbose)?;
    let servo = &mut session.servo;

    match cli.command {
        Commands::Reset => StopKind::Reset.execute(servo)?,
        Commands::Stop => StopKind::Stop.execute(servo)?,
        Commands::QuickStop => StopKind::QuickStop.execute(servo)?,
        Commands::Velocity { args } => args.execute(servo)?,
        Commands::GetVelocity => commands::query::get_velocity(servo)?,
        Commands::Position { args } => args.execute(servo)?,
        Commands::GetPosition { args } => args.execute(servo)?,
        Commands::Home => commands::motion::home(servo)?,
        Commands::Status => commands::query::status(servo)?,
        Commands::Config(_) => {},
    }

    session.finish();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use kinco_protocol::VelocityDirection;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_velocity() {
        let cli = Cli::try_parse_from([
            "kinco-cli",
            "--port",
            "COM3",
            "velocity",
            "--rpm",
            "-250.5",
            "--direction",
            "backward",
        ])
        .unwrap();

        assert_eq!(cli.connection.port.as_deref(), Some("COM3"));
        match cli.command {
            Commands::Velocity { args } => {
                assert_eq!(args.rpm, -250.5);
                assert_eq!(args.direction, Some(VelocityDirection::Backward));
                assert_eq!(args.acceleration, None);
            },
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_position_raw() {
        let cli = Cli::try_parse_from([
            "kinco-cli", "position", "--value", "-52500", "--raw", "--speed", "200",
        ])
        .unwrap();
        match cli.command {
            Commands::Position { args } => {
                assert!(args.raw);
                assert_eq!(args.speed, Some(200.0));
                assert_eq!(args.value, -52500.0);
            },
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_config_set() {
        let cli = Cli::try_parse_from([
            "kinco-cli", "config", "set", "--port", "/dev/ttyUSB0", "--slave", "2",
        ])
        .unwrap();
        assert!(cli.connection.port.is_none());
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigCommand::Set { slave: Some(2), .. })
        ));
    }

    #[test]
    fn test_parse_simple_commands() {
        let parse = |name: &str| Cli::try_parse_from(["kinco-cli", name]).unwrap().command;
        assert!(matches!(parse("reset"), Commands::Reset));
        assert!(matches!(parse("stop"), Commands::Stop));
        assert!(matches!(parse("quick-stop"), Commands::QuickStop));
        assert!(matches!(parse("get-velocity"), Commands::GetVelocity));
        assert!(matches!(parse("home"), Commands::Home));
        assert!(matches!(parse("status"), Commands::Status));
    }

    #[test]
    fn test_invalid_direction_rejected() {
        let result =
            Cli::try_parse_from(["kinco-cli", "velocity", "--rpm", "10", "--direction", "up"]);
        assert!(result.is_err());
    }
}
