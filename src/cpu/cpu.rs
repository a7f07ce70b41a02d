use thiserror::Error;

use crate::{
    bus::Bus,
    cpu::{
        addressing::{Operand, Resolved},
        flags::{
            FLAG_BREAK, FLAG_CARRY, FLAG_DECIMAL, FLAG_INTERRUPT_DISABLE, FLAG_NEGATIVE,
            FLAG_OVERFLOW, FLAG_UNUSED, FLAG_ZERO,
        },
        opcodes::{Instruction, Mnemonic, OpcodeTable},
        trace::TraceLine,
    },
};

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// PPU dots per CPU cycle (NTSC).
pub const DOTS_PER_CYCLE: usize = 3;

/// Fatal CPU conditions. Anything else the core handles silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("unimplemented opcode ${opcode:02X} at ${pc:04X}")]
    UnimplementedOpcode { opcode: u8, pc: u16 },
}

/// Plain register snapshot for logging and test comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
}

pub struct CPU<B: Bus> {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
    pub cycles: usize,
    pub bus: B,
    opcodes: OpcodeTable,
    fault: Option<CpuError>,
}

impl<B: Bus> CPU<B> {
    /// Power-up state. Call [`CPU::reset`] to load PC from the reset vector.
    pub fn new(bus: B) -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFD,
            pc: 0,
            status: FLAG_INTERRUPT_DISABLE | FLAG_UNUSED,
            cycles: 0,
            bus,
            opcodes: OpcodeTable::new(),
            fault: None,
        }
    }

    pub fn reset(&mut self) {
        self.pc = self.read_word(RESET_VECTOR);

        self.sp = 0xFD; // the reset sequence performs three suppressed pushes from $00
        self.status = FLAG_INTERRUPT_DISABLE | FLAG_UNUSED;

        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.fault = None;

        self.cycles = 7;
    }

    pub fn registers(&self) -> Registers {
        Registers {
            a: self.a,
            x: self.x,
            y: self.y,
            sp: self.sp,
            pc: self.pc,
            status: self.status,
        }
    }

    /// The fault that halted the CPU, if any.
    pub fn fault(&self) -> Option<CpuError> {
        self.fault
    }

    pub fn halted(&self) -> bool {
        self.fault.is_some()
    }

    /// Fetch, decode and execute one instruction, then tick the PPU
    /// `cycles × 3` dots. Returns the pre-execution trace of the instruction.
    pub fn step(&mut self) -> Result<TraceLine, CpuError> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }

        let pc = self.pc;
        let opcode = self.bus.read(pc);
        let instruction = match self.opcodes.decode(opcode, pc).copied() {
            Ok(instruction) => instruction,
            Err(fault) => {
                log::error!("halting: {fault}");
                self.fault = Some(fault);
                return Err(fault);
            }
        };

        let line = self.trace_line(&instruction);
        log::trace!("{line}");

        let resolved = self.resolve(instruction.mode);
        let extra = self.execute(&instruction, resolved);
        if !instruction.manages_pc {
            self.pc = pc.wrapping_add(instruction.bytes as u16);
        }

        let consumed = instruction.cycles as usize + extra;
        self.cycles += consumed;
        self.tick_dots(consumed * DOTS_PER_CYCLE);

        Ok(line)
    }

    /// Advance the PPU one dot at a time, entering NMI as soon as it is raised.
    pub fn tick_dots(&mut self, dots: usize) {
        for _ in 0..dots {
            self.bus.tick_dot();
            if self.bus.poll_nmi() {
                self.nmi();
            }
        }
    }

    /// Capture the state nestest-style logs print before an instruction runs.
    pub fn trace_line(&mut self, instruction: &Instruction) -> TraceLine {
        let mut bytes = [instruction.opcode, 0, 0];
        for i in 1..instruction.bytes as usize {
            bytes[i] = self.bus.read(self.pc.wrapping_add(i as u16));
        }

        TraceLine {
            pc: self.pc,
            bytes,
            len: instruction.bytes,
            mnemonic: instruction.mnemonic,
            mode: instruction.mode,
            unofficial: instruction.unofficial,
            registers: self.registers(),
            cycles: self.cycles,
        }
    }

    /// Run `instruction` against its resolved operand. Returns the cycles
    /// spent beyond the table's base count.
    fn execute(&mut self, instruction: &Instruction, resolved: Resolved) -> usize {
        let op = resolved.operand;
        let mut extra = usize::from(resolved.page_crossed && instruction.mnemonic.page_cross_penalty());

        match instruction.mnemonic {
            // Loads and stores
            Mnemonic::Lda => {
                self.a = self.read_operand(op);
                self.update_zero_and_negative_flags(self.a);
            }
            Mnemonic::Ldx => {
                self.x = self.read_operand(op);
                self.update_zero_and_negative_flags(self.x);
            }
            Mnemonic::Ldy => {
                self.y = self.read_operand(op);
                self.update_zero_and_negative_flags(self.y);
            }
            Mnemonic::Sta => self.write_operand(op, self.a),
            Mnemonic::Stx => self.write_operand(op, self.x),
            Mnemonic::Sty => self.write_operand(op, self.y),

            // Transfers
            Mnemonic::Tax => {
                self.x = self.a;
                self.update_zero_and_negative_flags(self.x);
            }
            Mnemonic::Tay => {
                self.y = self.a;
                self.update_zero_and_negative_flags(self.y);
            }
            Mnemonic::Txa => {
                self.a = self.x;
                self.update_zero_and_negative_flags(self.a);
            }
            Mnemonic::Tya => {
                self.a = self.y;
                self.update_zero_and_negative_flags(self.a);
            }
            Mnemonic::Tsx => {
                self.x = self.sp;
                self.update_zero_and_negative_flags(self.x);
            }
            Mnemonic::Txs => self.sp = self.x,

            // Arithmetic
            Mnemonic::Adc => {
                let value = self.read_operand(op);
                self.add_with_carry(value);
            }
            Mnemonic::Sbc => {
                let value = self.read_operand(op);
                self.add_with_carry(!value);
            }
            Mnemonic::Inc => {
                let value = self.read_operand(op).wrapping_add(1);
                self.write_operand(op, value);
                self.update_zero_and_negative_flags(value);
            }
            Mnemonic::Dec => {
                let value = self.read_operand(op).wrapping_sub(1);
                self.write_operand(op, value);
                self.update_zero_and_negative_flags(value);
            }
            Mnemonic::Inx => {
                self.x = self.x.wrapping_add(1);
                self.update_zero_and_negative_flags(self.x);
            }
            Mnemonic::Iny => {
                self.y = self.y.wrapping_add(1);
                self.update_zero_and_negative_flags(self.y);
            }
            Mnemonic::Dex => {
                self.x = self.x.wrapping_sub(1);
                self.update_zero_and_negative_flags(self.x);
            }
            Mnemonic::Dey => {
                self.y = self.y.wrapping_sub(1);
                self.update_zero_and_negative_flags(self.y);
            }

            // Shifts and rotates
            Mnemonic::Asl => {
                let value = self.read_operand(op);
                let result = self.shift_left(value);
                self.write_operand(op, result);
            }
            Mnemonic::Lsr => {
                let value = self.read_operand(op);
                let result = self.shift_right(value);
                self.write_operand(op, result);
            }
            Mnemonic::Rol => {
                let value = self.read_operand(op);
                let result = self.rotate_left(value);
                self.write_operand(op, result);
            }
            Mnemonic::Ror => {
                let value = self.read_operand(op);
                let result = self.rotate_right(value);
                self.write_operand(op, result);
            }

            // Bitwise
            Mnemonic::And => {
                self.a &= self.read_operand(op);
                self.update_zero_and_negative_flags(self.a);
            }
            Mnemonic::Ora => {
                self.a |= self.read_operand(op);
                self.update_zero_and_negative_flags(self.a);
            }
            Mnemonic::Eor => {
                self.a ^= self.read_operand(op);
                self.update_zero_and_negative_flags(self.a);
            }
            Mnemonic::Bit => {
                let value = self.read_operand(op);
                self.set_flag(FLAG_ZERO, self.a & value == 0);
                self.set_flag(FLAG_NEGATIVE, value & 0x80 != 0);
                self.set_flag(FLAG_OVERFLOW, value & 0x40 != 0);
            }

            // Compares
            Mnemonic::Cmp => {
                let value = self.read_operand(op);
                self.compare(self.a, value);
            }
            Mnemonic::Cpx => {
                let value = self.read_operand(op);
                self.compare(self.x, value);
            }
            Mnemonic::Cpy => {
                let value = self.read_operand(op);
                self.compare(self.y, value);
            }

            // Branches
            Mnemonic::Bcc => extra += self.branch(op, self.status & FLAG_CARRY == 0),
            Mnemonic::Bcs => extra += self.branch(op, self.status & FLAG_CARRY != 0),
            Mnemonic::Bne => extra += self.branch(op, self.status & FLAG_ZERO == 0),
            Mnemonic::Beq => extra += self.branch(op, self.status & FLAG_ZERO != 0),
            Mnemonic::Bpl => extra += self.branch(op, self.status & FLAG_NEGATIVE == 0),
            Mnemonic::Bmi => extra += self.branch(op, self.status & FLAG_NEGATIVE != 0),
            Mnemonic::Bvc => extra += self.branch(op, self.status & FLAG_OVERFLOW == 0),
            Mnemonic::Bvs => extra += self.branch(op, self.status & FLAG_OVERFLOW != 0),

            // Jumps, calls, returns
            Mnemonic::Jmp => self.pc = Self::address_of(op),
            Mnemonic::Jsr => {
                let return_addr = self.pc.wrapping_add(2); // last byte of the JSR
                self.push_word(return_addr);
                self.pc = Self::address_of(op);
            }
            Mnemonic::Rts => self.pc = self.pop_word().wrapping_add(1),
            Mnemonic::Brk => self.brk(),
            Mnemonic::Rti => {
                let status = self.pop();
                self.status = (status & !FLAG_BREAK) | FLAG_UNUSED;
                self.pc = self.pop_word();
            }

            // Stack
            Mnemonic::Pha => self.push(self.a),
            Mnemonic::Php => self.push(self.status | FLAG_BREAK | FLAG_UNUSED),
            Mnemonic::Pla => {
                self.a = self.pop();
                self.update_zero_and_negative_flags(self.a);
            }
            Mnemonic::Plp => {
                let status = self.pop();
                self.status = (status & !FLAG_BREAK) | FLAG_UNUSED;
            }

            // Flags
            Mnemonic::Clc => self.status &= !FLAG_CARRY,
            Mnemonic::Sec => self.status |= FLAG_CARRY,
            Mnemonic::Cli => self.status &= !FLAG_INTERRUPT_DISABLE,
            Mnemonic::Sei => self.status |= FLAG_INTERRUPT_DISABLE,
            Mnemonic::Cld => self.status &= !FLAG_DECIMAL,
            Mnemonic::Sed => self.status |= FLAG_DECIMAL,
            Mnemonic::Clv => self.status &= !FLAG_OVERFLOW,

            Mnemonic::Nop => {}

            // Unofficial combinations
            Mnemonic::Lax => {
                let value = self.read_operand(op);
                self.a = value;
                self.x = value;
                self.update_zero_and_negative_flags(value);
            }
            Mnemonic::Sax => self.write_operand(op, self.a & self.x),
            Mnemonic::Dcp => {
                let value = self.read_operand(op).wrapping_sub(1);
                self.write_operand(op, value);
                self.compare(self.a, value);
            }
            Mnemonic::Isc => {
                let value = self.read_operand(op).wrapping_add(1);
                self.write_operand(op, value);
                self.add_with_carry(!value);
            }
            Mnemonic::Slo => {
                let value = self.read_operand(op);
                let shifted = self.shift_left(value);
                self.write_operand(op, shifted);
                self.a |= shifted;
                self.update_zero_and_negative_flags(self.a);
            }
            Mnemonic::Rla => {
                let value = self.read_operand(op);
                let rotated = self.rotate_left(value);
                self.write_operand(op, rotated);
                self.a &= rotated;
                self.update_zero_and_negative_flags(self.a);
            }
            Mnemonic::Sre => {
                let value = self.read_operand(op);
                let shifted = self.shift_right(value);
                self.write_operand(op, shifted);
                self.a ^= shifted;
                self.update_zero_and_negative_flags(self.a);
            }
            Mnemonic::Rra => {
                let value = self.read_operand(op);
                let rotated = self.rotate_right(value);
                self.write_operand(op, rotated);
                self.add_with_carry(rotated);
            }
        }

        extra
    }

    fn read_operand(&mut self, operand: Operand) -> u8 {
        match operand {
            Operand::Address(addr) => self.bus.read(addr),
            Operand::Accumulator => self.a,
            Operand::None | Operand::Offset(_) => 0,
        }
    }

    fn write_operand(&mut self, operand: Operand, value: u8) {
        match operand {
            Operand::Address(addr) => self.bus.write(addr, value),
            Operand::Accumulator => self.a = value,
            Operand::None | Operand::Offset(_) => {}
        }
    }

    fn address_of(operand: Operand) -> u16 {
        match operand {
            Operand::Address(addr) => addr,
            _ => 0,
        }
    }

    /// Binary ADC; SBC reuses it with the operand inverted.
    fn add_with_carry(&mut self, value: u8) {
        let carry_in = (self.status & FLAG_CARRY) as u16;
        let sum = self.a as u16 + value as u16 + carry_in;
        let result = sum as u8;

        self.set_flag(FLAG_CARRY, sum > 0xFF);
        self.set_flag(
            FLAG_OVERFLOW,
            (!(self.a ^ value) & (self.a ^ result) & 0x80) != 0,
        );

        self.a = result;
        self.update_zero_and_negative_flags(self.a);
    }

    fn compare(&mut self, register: u8, value: u8) {
        let result = register.wrapping_sub(value);
        self.set_flag(FLAG_CARRY, register >= value);
        self.update_zero_and_negative_flags(result);
    }

    fn shift_left(&mut self, value: u8) -> u8 {
        self.set_flag(FLAG_CARRY, value & 0x80 != 0);
        let result = value << 1;
        self.update_zero_and_negative_flags(result);
        result
    }

    fn shift_right(&mut self, value: u8) -> u8 {
        self.set_flag(FLAG_CARRY, value & 0x01 != 0);
        let result = value >> 1;
        self.update_zero_and_negative_flags(result);
        result
    }

    fn rotate_left(&mut self, value: u8) -> u8 {
        let carry_in = self.status & FLAG_CARRY;
        self.set_flag(FLAG_CARRY, value & 0x80 != 0);
        let result = (value << 1) | carry_in;
        self.update_zero_and_negative_flags(result);
        result
    }

    fn rotate_right(&mut self, value: u8) -> u8 {
        let carry_in = if self.status & FLAG_CARRY != 0 { 0x80 } else { 0 };
        self.set_flag(FLAG_CARRY, value & 0x01 != 0);
        let result = (value >> 1) | carry_in;
        self.update_zero_and_negative_flags(result);
        result
    }

    /// Branch relative to the instruction after the 2-byte branch.
    /// Returns 1 when taken, 2 when taken across a page.
    fn branch(&mut self, operand: Operand, condition: bool) -> usize {
        let next = self.pc.wrapping_add(2);
        self.pc = next;

        let Operand::Offset(offset) = operand else {
            return 0;
        };
        if !condition {
            return 0;
        }

        self.pc = next.wrapping_add(offset as u16);
        if (next & 0xFF00) != (self.pc & 0xFF00) { 2 } else { 1 }
    }

    fn brk(&mut self) {
        // BRK is followed by a padding byte, so the return address skips it.
        let return_addr = self.pc.wrapping_add(2);
        self.push_word(return_addr);
        self.push(self.status | FLAG_BREAK | FLAG_UNUSED);

        self.status |= FLAG_INTERRUPT_DISABLE;
        self.pc = self.read_word(IRQ_VECTOR);
    }

    /// Non-maskable interrupt entry. Raised by the PPU at vblank.
    pub fn nmi(&mut self) {
        log::debug!("NMI at ${:04X}", self.pc);

        self.push_word(self.pc);
        self.push((self.status & !FLAG_BREAK) | FLAG_UNUSED);

        self.status |= FLAG_INTERRUPT_DISABLE;
        self.pc = self.read_word(NMI_VECTOR);

        self.cycles += 7;
    }

    fn set_flag(&mut self, flag: u8, value: bool) {
        if value {
            self.status |= flag;
        } else {
            self.status &= !flag;
        }
    }

    fn update_zero_and_negative_flags(&mut self, value: u8) {
        self.set_flag(FLAG_ZERO, value == 0);
        self.set_flag(FLAG_NEGATIVE, value & 0x80 != 0);
    }

    fn read_word(&mut self, addr: u16) -> u16 {
        let lo = self.bus.read(addr) as u16;
        let hi = self.bus.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    pub(crate) fn push(&mut self, value: u8) {
        let addr = 0x0100 | self.sp as u16;
        self.bus.write(addr, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    pub(crate) fn pop(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        let addr = 0x0100 | self.sp as u16;
        self.bus.read(addr)
    }

    /// High byte first, so the low byte ends up at the lower stack address.
    fn push_word(&mut self, value: u16) {
        self.push((value >> 8) as u8);
        self.push(value as u8);
    }

    fn pop_word(&mut self) -> u16 {
        let lo = self.pop() as u16;
        let hi = self.pop() as u16;
        (hi << 8) | lo
    }
}
