//! Mock 传输层
//!
//! 不访问任何硬件：写入落到内存寄存器表，读取从表中取值（未写过的地址为 0）。
//! 每次调用都会被记录，便于断言控制器发出的寄存器序列。
//!
//! `MockTransport` 可以 `clone`，克隆体共享同一份状态：把一份交给控制器，
//! 另一份留在测试里检查调用记录。

use crate::{FunctionCode, RegisterTransport, TransportError, check_response_len};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// 一次被记录的传输调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Read {
        address: u16,
        count: u16,
    },
    WriteSingle {
        address: u16,
        value: u16,
        function: FunctionCode,
    },
    WriteMultiple {
        address: u16,
        values: Vec<u16>,
        function: FunctionCode,
    },
}

impl TransportCall {
    pub fn address(&self) -> u16 {
        match self {
            TransportCall::Read { address, .. }
            | TransportCall::WriteSingle { address, .. }
            | TransportCall::WriteMultiple { address, .. } => *address,
        }
    }

    pub fn is_write(&self) -> bool {
        !matches!(self, TransportCall::Read { .. })
    }
}

/// 注入的故障
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    Timeout,
    Exception(String),
}

impl MockFailure {
    fn to_error(&self) -> TransportError {
        match self {
            MockFailure::Timeout => TransportError::Timeout,
            MockFailure::Exception(msg) => TransportError::Exception(msg.clone()),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<TransportCall>,
    registers: HashMap<u16, u16>,
    failures: HashMap<usize, MockFailure>,
    timeout: Option<Duration>,
}

/// 内存寄存器表 + 调用记录
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按调用顺序返回所有记录
    pub fn calls(&self) -> Vec<TransportCall> {
        self.state.lock().calls.clone()
    }

    /// 只返回写调用
    pub fn writes(&self) -> Vec<TransportCall> {
        self.state.lock().calls.iter().filter(|c| c.is_write()).cloned().collect()
    }

    /// 清空调用记录与尚未触发的故障
    pub fn clear_calls(&self) {
        let mut state = self.state.lock();
        state.calls.clear();
        state.failures.clear();
    }

    /// 预置单个寄存器
    pub fn set_register(&self, address: u16, value: u16) {
        self.state.lock().registers.insert(address, value);
    }

    /// 预置连续寄存器
    pub fn set_registers(&self, address: u16, values: &[u16]) {
        self.state.lock().store(address, values);
    }

    pub fn register(&self, address: u16) -> u16 {
        self.state.lock().registers.get(&address).copied().unwrap_or(0)
    }

    /// 让第 `index` 次调用失败
    ///
    /// 从上次 `clear_calls` 起计数，从 0 开始，读写都计数。
    /// 失败的调用仍会被记录，但不会修改寄存器表。
    pub fn fail_on_call(&self, index: usize, failure: MockFailure) {
        self.state.lock().failures.insert(index, failure);
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.state.lock().timeout
    }
}

impl MockState {
    /// 记录调用，并返回该调用上注入的故障
    fn record(&mut self, call: TransportCall) -> Result<(), TransportError> {
        trace!("mock transport call #{}: {:?}", self.calls.len(), call);
        let index = self.calls.len();
        self.calls.push(call);
        match self.failures.remove(&index) {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }

    fn store(&mut self, address: u16, values: &[u16]) {
        for (offset, value) in values.iter().enumerate() {
            self.registers.insert(address.wrapping_add(offset as u16), *value);
        }
    }
}

impl RegisterTransport for MockTransport {
    fn read_registers(&mut self, address: u16, count: u16) -> Result<Vec<u16>, TransportError> {
        let mut state = self.state.lock();
        state.record(TransportCall::Read { address, count })?;
        let values: Vec<u16> = (0..count)
            .map(|offset| {
                state.registers.get(&address.wrapping_add(offset)).copied().unwrap_or(0)
            })
            .collect();
        check_response_len(count, &values)?;
        Ok(values)
    }

    fn write_register(
        &mut self,
        address: u16,
        value: u16,
        function: FunctionCode,
    ) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.record(TransportCall::WriteSingle {
            address,
            value,
            function,
        })?;
        if function == FunctionCode::ReadHoldingRegisters {
            return Err(TransportError::UnsupportedFunction {
                function,
                operation: "write_register",
            });
        }
        state.store(address, &[value]);
        Ok(())
    }

    fn write_registers(
        &mut self,
        address: u16,
        values: &[u16],
        function: FunctionCode,
    ) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.record(TransportCall::WriteMultiple {
            address,
            values: values.to_vec(),
            function,
        })?;
        if function != FunctionCode::WriteMultipleRegisters {
            return Err(TransportError::UnsupportedFunction {
                function,
                operation: "write_registers",
            });
        }
        state.store(address, values);
        Ok(())
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.state.lock().timeout = Some(timeout);
    }
}
