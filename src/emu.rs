//! Emulator driver: owns the CPU and bus, runs the batched instruction
//! loop, and exposes the trace/breakpoint debugging surface.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info};

use crate::bus::Bus;
use crate::cpu::{Cpu, CpuType, TraceState};
use crate::error::LoadError;

/// Number of instructions executed per run-loop batch before yielding to the
/// host scheduler.
const BATCH_SIZE: u32 = 5_000;
/// Default capacity of the trace ring buffer.
const DEFAULT_TRACE_CAPACITY: usize = 256;

/// One entry in the trace ring buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEntry {
    pub pc: u16,
    pub opcode: u8,
    pub next1: u8,
    pub next2: u8,
    pub regs: TraceState,
}

/// Lifecycle signal emitted by the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmulatorSignal {
    Started,
    Stopped,
    BreakpointHit(u16),
}

/// Fixed-capacity ring buffer of trace entries, oldest overwritten first.
struct TraceRing {
    capacity: usize,
    entries: VecDeque<TraceEntry>,
}

impl TraceRing {
    fn new(capacity: usize) -> Self {
        Self { capacity, entries: VecDeque::with_capacity(capacity) }
    }

    fn push(&mut self, entry: TraceEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    fn snapshot(&self) -> Vec<TraceEntry> {
        self.entries.iter().copied().collect()
    }
}

/// The emulator driver: CPU + bus + run-loop control surface.
pub struct Emulator {
    pub cpu: Cpu,
    pub bus: Bus,
    instruction_count: u64,
    cancel: Arc<AtomicBool>,
    trace_enabled: bool,
    trace: TraceRing,
    breakpoints: std::collections::HashSet<u16>,
    hit_address: Option<u16>,
    signal_tx: Sender<EmulatorSignal>,
    signal_rx: Receiver<EmulatorSignal>,
}

impl Emulator {
    pub fn new(kind: CpuType) -> Self {
        let (signal_tx, signal_rx) = unbounded();
        Self {
            cpu: Cpu::new(kind),
            bus: Bus::new(),
            instruction_count: 0,
            cancel: Arc::new(AtomicBool::new(false)),
            trace_enabled: false,
            trace: TraceRing::new(DEFAULT_TRACE_CAPACITY),
            breakpoints: std::collections::HashSet::new(),
            hit_address: None,
            signal_tx,
            signal_rx,
        }
    }

    /// Load raw bytes into memory at `addr`.
    pub fn load(&mut self, addr: u16, bytes: &[u8]) -> Result<(), LoadError> {
        self.bus.memory.load(addr, bytes)
    }

    pub fn instruction_count(&self) -> u64 {
        self.instruction_count
    }

    pub fn is_halted(&self) -> bool {
        self.cpu.halted()
    }

    /// A receiving end for lifecycle signals; callers can clone the sender
    /// side indirectly by draining this channel from the host's own thread.
    pub fn signals(&self) -> &Receiver<EmulatorSignal> {
        &self.signal_rx
    }

    pub fn set_trace_enabled(&mut self, enabled: bool) {
        self.trace_enabled = enabled;
    }

    pub fn trace_enabled(&self) -> bool {
        self.trace_enabled
    }

    pub fn trace_entries(&self) -> Vec<TraceEntry> {
        self.trace.snapshot()
    }

    pub fn set_breakpoint(&mut self, addr: u16) {
        self.breakpoints.insert(addr);
    }

    pub fn clear_breakpoint(&mut self, addr: u16) {
        self.breakpoints.remove(&addr);
    }

    pub fn clear_all_breakpoints(&mut self) {
        self.breakpoints.clear();
    }

    pub fn hit_address(&self) -> Option<u16> {
        self.hit_address
    }

    pub fn clear_hit(&mut self) {
        self.hit_address = None;
    }

    /// Request cancellation of a running [`Emulator::run`] loop. Observed
    /// after the in-flight instruction completes.
    pub fn request_stop(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn reset(&mut self) {
        self.cpu.reset();
        self.bus.devices.control.reset();
        self.hit_address = None;
        self.cancel.store(false, Ordering::SeqCst);
        debug!("emulator: reset");
    }

    fn record_trace(&mut self) {
        if !self.trace_enabled {
            return;
        }
        let pc = self.cpu.pc();
        let entry = TraceEntry {
            pc,
            opcode: self.bus.read(pc),
            next1: self.bus.read(pc.wrapping_add(1)),
            next2: self.bus.read(pc.wrapping_add(2)),
            regs: self.cpu.trace_state(),
        };
        self.trace.push(entry);
    }

    /// Execute a single instruction, handling pending timer interrupts and
    /// hardware-control reset/halt requests at this instruction boundary.
    pub fn step(&mut self) -> u32 {
        if let Some(vector) = self.bus.devices.timer.tick() {
            let was_enabled = self.cpu.interrupts_enabled();
            self.cpu.interrupt(vector, &mut self.bus);
            if was_enabled {
                // The interrupt-acknowledge cycle consumes this step; the
                // redirected instruction at the vector executes on the next one.
                self.instruction_count += 1;
                return 11;
            }
        }
        if self.bus.devices.control.take_pending_reset() {
            self.reset();
            return 0;
        }
        if self.bus.devices.control.take_pending_halt() {
            self.cancel.store(true, Ordering::SeqCst);
            return 0;
        }
        self.record_trace();
        let states = self.cpu.step(&mut self.bus);
        self.instruction_count += 1;
        states
    }

    /// Run in batches of [`BATCH_SIZE`] instructions until cancelled,
    /// halted, or a breakpoint is hit. Yields to the host scheduler between
    /// batches via a short sleep, matching the cooperative deployment model.
    pub fn run(&mut self) {
        self.cancel.store(false, Ordering::SeqCst);
        let _ = self.signal_tx.send(EmulatorSignal::Started);
        info!("emulator: run loop started");
        'outer: loop {
            for _ in 0..BATCH_SIZE {
                if self.cancel.load(Ordering::SeqCst) || self.cpu.halted() {
                    break 'outer;
                }
                if self.breakpoints.contains(&self.cpu.pc()) {
                    self.hit_address = Some(self.cpu.pc());
                    let _ = self.signal_tx.send(EmulatorSignal::BreakpointHit(self.cpu.pc()));
                    break 'outer;
                }
                self.step();
            }
            std::thread::sleep(Duration::from_micros(1));
        }
        let _ = self.signal_tx.send(EmulatorSignal::Stopped);
        info!("emulator: run loop stopped after {} instructions", self.instruction_count);
    }

    /// Boot from drive 0: read track 0 sector 1 into memory at 0x0000, then
    /// set PC/SP and arm the timer.
    pub fn boot_from_disk(&mut self) {
        self.bus.devices.fdc.out_port(15, 0x00, &mut self.bus.memory);
        self.bus.devices.fdc.out_port(16, 0x00, &mut self.bus.memory);
        self.bus.devices.fdc.out_port(10, 0x00, &mut self.bus.memory);
        self.bus.devices.fdc.out_port(11, 0x00, &mut self.bus.memory);
        self.bus.devices.fdc.out_port(12, 0x01, &mut self.bus.memory);
        self.bus.devices.fdc.out_port(13, 0x00, &mut self.bus.memory);
        self.cpu.set_pc(0x0000);
        self.cpu.set_sp(0xFFFF);
        self.bus.devices.timer.out_port(27, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_and_run_a_tiny_program_halts() {
        let mut emu = Emulator::new(CpuType::Intel8080);
        // MVI A,0x05 ; HLT
        emu.load(0x0000, &[0x3E, 0x05, 0x76]).unwrap();
        emu.cpu.set_pc(0x0000);
        emu.run();
        assert!(emu.is_halted());
        assert_eq!(emu.instruction_count(), 2);
    }

    #[test]
    fn breakpoint_stops_loop_before_executing() {
        let mut emu = Emulator::new(CpuType::Intel8080);
        emu.load(0x0000, &[0x00, 0x00, 0x76]).unwrap();
        emu.cpu.set_pc(0x0000);
        emu.set_breakpoint(0x0001);
        emu.run();
        assert_eq!(emu.hit_address(), Some(0x0001));
        assert_eq!(emu.cpu.pc(), 0x0001);
    }

    #[test]
    fn trace_ring_buffer_caps_at_capacity() {
        let mut emu = Emulator::new(CpuType::Intel8080);
        emu.set_trace_enabled(true);
        let mut program = vec![0x00; 300];
        program.push(0x76);
        emu.load(0x0000, &program).unwrap();
        emu.cpu.set_pc(0x0000);
        emu.run();
        assert_eq!(emu.trace_entries().len(), DEFAULT_TRACE_CAPACITY);
    }

    #[test]
    fn timer_interrupt_delivered_at_instruction_boundary() {
        let mut emu = Emulator::new(CpuType::Intel8080);
        emu.load(0x0000, &[0x00]).unwrap();
        emu.load(0x0038, &[0x76]).unwrap();
        emu.cpu.set_pc(0x0000);
        emu.cpu.interrupt(7, &mut emu.bus); // no-op, interrupts disabled
        assert_ne!(emu.cpu.pc(), 0x0038);
        emu.bus.devices.timer.out_port(27, 1);
        // Enable interrupts the way an EI instruction would, then tick.
        if let Cpu::I8080(c) = &mut emu.cpu {
            c.interrupts_enabled = true;
        }
        emu.step();
        assert_eq!(emu.cpu.pc(), 0x0038);
    }

    #[test]
    fn hardware_control_reset_request_resets_cpu() {
        let mut emu = Emulator::new(CpuType::Intel8080);
        emu.cpu.set_pc(0x1234);
        emu.bus.devices.control.out_port(160, 0xAA);
        emu.bus.devices.control.out_port(160, 1 << 6);
        emu.step();
        assert_eq!(emu.cpu.pc(), 0);
    }
}
