use crate::{
    bus::Bus,
    cpu::{
        cpu::{CPU, CpuError, NMI_VECTOR},
        flags::{
            FLAG_BREAK, FLAG_CARRY, FLAG_INTERRUPT_DISABLE, FLAG_NEGATIVE, FLAG_OVERFLOW,
            FLAG_UNUSED, FLAG_ZERO,
        },
    },
};

struct TestBus {
    mem: [u8; 65536],
    dots: usize,
    /// Raise NMI once when `dots` reaches this count.
    nmi_at: Option<usize>,
}

impl TestBus {
    fn new() -> Self {
        Self {
            mem: [0; 65536],
            dots: 0,
            nmi_at: None,
        }
    }
}

impl Bus for TestBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.mem[addr as usize] = data;
    }

    fn tick_dot(&mut self) {
        self.dots += 1;
    }

    fn poll_nmi(&mut self) -> bool {
        if self.nmi_at == Some(self.dots) {
            self.nmi_at = None;
            true
        } else {
            false
        }
    }
}

/// CPU reset into `program` loaded at $8000.
fn cpu_with(program: &[u8]) -> CPU<TestBus> {
    let mut bus = TestBus::new();
    bus.mem[0x8000..0x8000 + program.len()].copy_from_slice(program);
    bus.mem[0xFFFC] = 0x00;
    bus.mem[0xFFFD] = 0x80;

    let mut cpu = CPU::new(bus);
    cpu.reset();
    cpu
}

fn run(cpu: &mut CPU<TestBus>, steps: usize) {
    for _ in 0..steps {
        cpu.step().unwrap();
    }
}

fn flag(cpu: &CPU<TestBus>, flag: u8) -> bool {
    cpu.status & flag != 0
}

#[test]
fn reset_loads_vector_and_power_up_state() {
    let cpu = cpu_with(&[]);
    assert_eq!(cpu.pc, 0x8000);
    assert_eq!(cpu.sp, 0xFD);
    assert_eq!(cpu.status, 0x24);
    assert_eq!(cpu.cycles, 7);
}

#[test]
fn lda_immediate_loads_value() {
    let mut cpu = cpu_with(&[0xA9, 0x42]); // LDA #$42
    run(&mut cpu, 1);
    assert_eq!(cpu.a, 0x42);
    assert_eq!(cpu.pc, 0x8002);
}

#[test]
fn lda_sets_zero_and_negative_for_every_value() {
    let mut cpu = cpu_with(&[0xA9, 0x00]);
    for value in 0..=255u8 {
        cpu.pc = 0x8000;
        cpu.bus.mem[0x8001] = value;
        run(&mut cpu, 1);

        assert_eq!(flag(&cpu, FLAG_ZERO), value == 0, "Z for {value:02X}");
        assert_eq!(flag(&cpu, FLAG_NEGATIVE), value >= 0x80, "N for {value:02X}");
    }
}

#[test]
fn tax_transfers_a_to_x() {
    let mut cpu = cpu_with(&[0xA9, 0x10, 0xAA]); // LDA #$10; TAX
    run(&mut cpu, 2);
    assert_eq!(cpu.x, 0x10);
}

#[test]
fn txs_does_not_touch_flags() {
    let mut cpu = cpu_with(&[0xA2, 0x00, 0x9A]); // LDX #0; TXS
    run(&mut cpu, 1);
    cpu.status &= !FLAG_ZERO;
    run(&mut cpu, 1);
    assert_eq!(cpu.sp, 0x00);
    assert!(!flag(&cpu, FLAG_ZERO));
}

#[test]
fn sta_writes_to_memory() {
    let mut cpu = cpu_with(&[0xA9, 0x33, 0x8D, 0x00, 0x02]); // LDA #$33; STA $0200
    run(&mut cpu, 2);
    assert_eq!(cpu.bus.mem[0x0200], 0x33);
}

#[test]
fn jmp_changes_program_counter() {
    let mut cpu = cpu_with(&[0x4C, 0x00, 0x90]); // JMP $9000
    cpu.bus.mem[0x9000] = 0xA9; // LDA #$55
    cpu.bus.mem[0x9001] = 0x55;
    run(&mut cpu, 2);
    assert_eq!(cpu.a, 0x55);
}

#[test]
fn indirect_jmp_does_not_cross_page() {
    let mut cpu = cpu_with(&[0x6C, 0xFF, 0x02]); // JMP ($02FF)
    cpu.bus.mem[0x02FF] = 0x34;
    cpu.bus.mem[0x0200] = 0x12;
    cpu.bus.mem[0x0300] = 0x56;
    run(&mut cpu, 1);
    assert_eq!(cpu.pc, 0x1234);
}

#[test]
fn inx_increments_x() {
    let mut cpu = cpu_with(&[0xA2, 0x01, 0xE8]); // LDX #$01; INX
    run(&mut cpu, 2);
    assert_eq!(cpu.x, 0x02);
}

#[test]
fn inx_wraps_to_zero() {
    let mut cpu = cpu_with(&[0xA2, 0xFF, 0xE8]);
    run(&mut cpu, 2);
    assert_eq!(cpu.x, 0x00);
    assert!(flag(&cpu, FLAG_ZERO));
    assert!(!flag(&cpu, FLAG_NEGATIVE));
}

#[test]
fn dex_sets_zero_flag() {
    let mut cpu = cpu_with(&[0xA2, 0x01, 0xCA]); // LDX #$01; DEX
    run(&mut cpu, 2);
    assert!(flag(&cpu, FLAG_ZERO));
}

#[test]
fn bne_loops_until_zero() {
    // LDX #3; DEX; BNE -3
    let mut cpu = cpu_with(&[0xA2, 0x03, 0xCA, 0xD0, 0xFD]);
    run(&mut cpu, 7);
    assert_eq!(cpu.x, 0x00);
    assert_eq!(cpu.pc, 0x8005);
}

#[test]
fn zero_page_x_wraps_within_page_zero() {
    let mut cpu = cpu_with(&[0xB5, 0x00]); // LDA $nn,X
    for base in 0..=255u8 {
        for x in 0..=255u8 {
            let target = base.wrapping_add(x) as usize;
            let marker = (base ^ x) | 1;
            cpu.bus.mem[target] = marker;
            cpu.bus.mem[0x8001] = base;
            cpu.x = x;
            cpu.pc = 0x8000;
            run(&mut cpu, 1);
            assert_eq!(cpu.a, marker, "${base:02X},X with X={x:02X}");
        }
    }
}

#[test]
fn zero_page_y_wraps() {
    let mut cpu = cpu_with(&[0xB6, 0xF0]); // LDX $F0,Y
    cpu.y = 0x20;
    cpu.bus.mem[0x0010] = 0x77;
    cpu.bus.mem[0x0110] = 0x99;
    run(&mut cpu, 1);
    assert_eq!(cpu.x, 0x77);
}

#[test]
fn indexed_indirect_pointer_wraps() {
    let mut cpu = cpu_with(&[0xA1, 0xFE]); // LDA ($FE,X)
    cpu.x = 0x01;
    cpu.bus.mem[0x00FF] = 0x00;
    cpu.bus.mem[0x0000] = 0x03;
    cpu.bus.mem[0x0100] = 0x04;
    cpu.bus.mem[0x0300] = 0xAB;
    run(&mut cpu, 1);
    assert_eq!(cpu.a, 0xAB);
}

#[test]
fn indirect_indexed_pointer_wraps_and_adds_y() {
    let mut cpu = cpu_with(&[0xB1, 0xFF]); // LDA ($FF),Y
    cpu.y = 0x10;
    cpu.bus.mem[0x00FF] = 0xF8;
    cpu.bus.mem[0x0000] = 0x02;
    cpu.bus.mem[0x0308] = 0x5C;
    run(&mut cpu, 1);
    assert_eq!(cpu.a, 0x5C);
    // 5 base + 1 for crossing $02F8 -> $0308
    assert_eq!(cpu.cycles, 7 + 6);
}

#[test]
fn stack_push_pop_roundtrip() {
    let mut cpu = cpu_with(&[]);
    for value in 0..=255u8 {
        let sp = cpu.sp;
        cpu.push(value);
        assert_eq!(cpu.bus.mem[0x0100 | sp as usize], value);
        assert_eq!(cpu.pop(), value);
        assert_eq!(cpu.sp, sp);
    }
}

#[test]
fn stack_pointer_wraps() {
    let mut cpu = cpu_with(&[]);
    cpu.sp = 0x00;
    cpu.push(0x42);
    assert_eq!(cpu.sp, 0xFF);
    assert_eq!(cpu.bus.mem[0x0100], 0x42);
    assert_eq!(cpu.pop(), 0x42);
    assert_eq!(cpu.sp, 0x00);
}

#[test]
fn pha_pla_restores_accumulator_and_flags() {
    // LDA #$80; PHA; LDA #$00; PLA
    let mut cpu = cpu_with(&[0xA9, 0x80, 0x48, 0xA9, 0x00, 0x68]);
    run(&mut cpu, 4);
    assert_eq!(cpu.a, 0x80);
    assert!(flag(&cpu, FLAG_NEGATIVE));
    assert_eq!(cpu.sp, 0xFD);
}

#[test]
fn php_sets_break_and_plp_clears_it() {
    let mut cpu = cpu_with(&[0x08, 0x28]); // PHP; PLP
    run(&mut cpu, 1);
    assert_eq!(cpu.bus.mem[0x01FD], 0x24 | FLAG_BREAK | FLAG_UNUSED);

    cpu.bus.mem[0x01FD] = 0xFF;
    run(&mut cpu, 1);
    assert_eq!(cpu.status, 0xFF & !FLAG_BREAK);
}

#[test]
fn jsr_and_rts_work() {
    // JSR $9000; LDA #$11
    let mut cpu = cpu_with(&[0x20, 0x00, 0x90, 0xA9, 0x11]);
    cpu.bus.mem[0x9000] = 0xA9; // LDA #$22
    cpu.bus.mem[0x9001] = 0x22;
    cpu.bus.mem[0x9002] = 0x60; // RTS

    run(&mut cpu, 1);
    assert_eq!(cpu.pc, 0x9000);
    assert_eq!(cpu.sp, 0xFB);
    // Pushed return address is the JSR's last byte.
    assert_eq!(cpu.bus.mem[0x01FD], 0x80);
    assert_eq!(cpu.bus.mem[0x01FC], 0x02);

    run(&mut cpu, 2);
    assert_eq!(cpu.pc, 0x8003);
    assert_eq!(cpu.sp, 0xFD);

    run(&mut cpu, 1);
    assert_eq!(cpu.a, 0x11);
}

#[test]
fn brk_jumps_to_irq_vector() {
    let mut cpu = cpu_with(&[0x00]); // BRK
    cpu.bus.mem[0xFFFE] = 0x00;
    cpu.bus.mem[0xFFFF] = 0x90;
    run(&mut cpu, 1);

    assert_eq!(cpu.pc, 0x9000);
    assert!(flag(&cpu, FLAG_INTERRUPT_DISABLE));
    assert_eq!(cpu.bus.mem[0x01FB], 0x24 | FLAG_BREAK);
}

#[test]
fn brk_rti_returns_past_padding_byte() {
    let mut cpu = cpu_with(&[0x00, 0xEA, 0xA9, 0x07]); // BRK; (pad); LDA #7
    cpu.bus.mem[0xFFFE] = 0x00;
    cpu.bus.mem[0xFFFF] = 0x90;
    cpu.bus.mem[0x9000] = 0x40; // RTI

    run(&mut cpu, 2);
    assert_eq!(cpu.pc, 0x8002);
    assert_eq!(cpu.sp, 0xFD);
    assert!(!flag(&cpu, FLAG_BREAK));
    assert!(flag(&cpu, FLAG_UNUSED));

    run(&mut cpu, 1);
    assert_eq!(cpu.a, 0x07);
}

#[test]
fn brk_rti_restores_status() {
    // SED; CLI; LDA #$7F; ADC #$01 (sets V, N); SEC; BRK; (pad); NOP
    let mut cpu = cpu_with(&[0xF8, 0x58, 0xA9, 0x7F, 0x69, 0x01, 0x38, 0x00, 0xEA, 0xEA]);
    cpu.bus.mem[0xFFFE] = 0x00;
    cpu.bus.mem[0xFFFF] = 0x90;
    cpu.bus.mem[0x9000] = 0x40; // RTI

    run(&mut cpu, 5);
    let before = cpu.status;
    assert_eq!(before & FLAG_INTERRUPT_DISABLE, 0);
    assert_eq!(before, 0xE9); // N V U D C

    run(&mut cpu, 1); // BRK
    assert!(flag(&cpu, FLAG_INTERRUPT_DISABLE));

    run(&mut cpu, 1); // RTI
    assert_eq!(cpu.status, before);
    assert!(!flag(&cpu, FLAG_INTERRUPT_DISABLE));
    assert_eq!(cpu.pc, 0x8009);
}

#[test]
fn nmi_pushes_state_and_jumps_to_vector() {
    let mut cpu = cpu_with(&[]);
    cpu.bus.mem[NMI_VECTOR as usize] = 0x34;
    cpu.bus.mem[NMI_VECTOR as usize + 1] = 0x12;
    cpu.pc = 0x8123;
    cpu.status = 0x24 | FLAG_CARRY;

    cpu.nmi();

    assert_eq!(cpu.pc, 0x1234);
    assert_eq!(cpu.sp, 0xFA);
    assert_eq!(cpu.bus.mem[0x01FD], 0x81);
    assert_eq!(cpu.bus.mem[0x01FC], 0x23);
    assert_eq!(cpu.bus.mem[0x01FB], 0x24 | FLAG_CARRY);
    assert_eq!(cpu.cycles, 7 + 7);
}

#[test]
fn nmi_is_taken_during_instruction_ticks() {
    let mut cpu = cpu_with(&[0xA9, 0x01]); // LDA #1
    cpu.bus.mem[NMI_VECTOR as usize + 1] = 0x90;
    cpu.bus.nmi_at = Some(3);

    run(&mut cpu, 1);

    assert_eq!(cpu.bus.dots, 6);
    assert_eq!(cpu.pc, 0x9000);
    assert_eq!(cpu.a, 0x01);
    // Return address is the instruction after LDA.
    assert_eq!(cpu.bus.mem[0x01FC], 0x02);
    assert_eq!(cpu.cycles, 7 + 2 + 7);
}

#[test]
fn step_ticks_three_dots_per_cycle() {
    let mut cpu = cpu_with(&[0xEA, 0x8D, 0x00, 0x02]); // NOP; STA $0200
    run(&mut cpu, 2);
    assert_eq!(cpu.bus.dots, (2 + 4) * 3);
    assert_eq!(cpu.cycles, 7 + 2 + 4);
}

#[test]
fn adc_sets_overflow_on_signed_overflow() {
    let mut cpu = cpu_with(&[0xA9, 0x50, 0x69, 0x50]); // LDA #$50; ADC #$50
    run(&mut cpu, 2);
    assert_eq!(cpu.a, 0xA0);
    assert!(flag(&cpu, FLAG_OVERFLOW));
    assert!(flag(&cpu, FLAG_NEGATIVE));
    assert!(!flag(&cpu, FLAG_CARRY));
}

#[test]
fn adc_carries_out_and_in() {
    // LDA #$FF; ADC #$01; ADC #$00
    let mut cpu = cpu_with(&[0xA9, 0xFF, 0x69, 0x01, 0x69, 0x00]);
    run(&mut cpu, 2);
    assert_eq!(cpu.a, 0x00);
    assert!(flag(&cpu, FLAG_CARRY));
    assert!(flag(&cpu, FLAG_ZERO));
    assert!(!flag(&cpu, FLAG_OVERFLOW));

    run(&mut cpu, 1);
    assert_eq!(cpu.a, 0x01);
    assert!(!flag(&cpu, FLAG_CARRY));
}

#[test]
fn sbc_borrows_and_overflows() {
    // SEC; LDA #$50; SBC #$F0
    let mut cpu = cpu_with(&[0x38, 0xA9, 0x50, 0xE9, 0xF0]);
    run(&mut cpu, 3);
    assert_eq!(cpu.a, 0x60);
    assert!(!flag(&cpu, FLAG_CARRY));
    assert!(!flag(&cpu, FLAG_OVERFLOW));

    // SEC; LDA #$50; SBC #$B0
    let mut cpu = cpu_with(&[0x38, 0xA9, 0x50, 0xE9, 0xB0]);
    run(&mut cpu, 3);
    assert_eq!(cpu.a, 0xA0);
    assert!(flag(&cpu, FLAG_OVERFLOW));
}

#[test]
fn unofficial_sbc_matches_official() {
    let mut official = cpu_with(&[0x38, 0xA9, 0x10, 0xE9, 0x20]);
    let mut unofficial = cpu_with(&[0x38, 0xA9, 0x10, 0xEB, 0x20]);
    run(&mut official, 3);
    run(&mut unofficial, 3);
    assert_eq!(official.registers(), unofficial.registers());
    assert_eq!(official.a, 0xF0);
}

#[test]
fn cmp_sets_carry_zero_negative() {
    let mut cpu = cpu_with(&[0xA9, 0x40, 0xC9, 0x40, 0xC9, 0x41, 0xC9, 0x10]);
    run(&mut cpu, 2);
    assert!(flag(&cpu, FLAG_ZERO) && flag(&cpu, FLAG_CARRY));

    run(&mut cpu, 1);
    assert!(!flag(&cpu, FLAG_CARRY));
    assert!(flag(&cpu, FLAG_NEGATIVE));

    run(&mut cpu, 1);
    assert!(flag(&cpu, FLAG_CARRY));
    assert!(!flag(&cpu, FLAG_ZERO));
}

#[test]
fn bit_copies_high_bits_and_tests_mask() {
    let mut cpu = cpu_with(&[0xA9, 0x01, 0x24, 0x10]); // LDA #1; BIT $10
    cpu.bus.mem[0x0010] = 0xC0;
    run(&mut cpu, 2);
    assert!(flag(&cpu, FLAG_ZERO));
    assert!(flag(&cpu, FLAG_NEGATIVE));
    assert!(flag(&cpu, FLAG_OVERFLOW));
    assert_eq!(cpu.a, 0x01);
}

#[test]
fn shifts_and_rotates_move_carry() {
    // SEC; LDA #$80; ROL A
    let mut cpu = cpu_with(&[0x38, 0xA9, 0x80, 0x2A]);
    run(&mut cpu, 3);
    assert_eq!(cpu.a, 0x01);
    assert!(flag(&cpu, FLAG_CARRY));

    // CLC; LDA #$01; ROR A
    let mut cpu = cpu_with(&[0x18, 0xA9, 0x01, 0x6A]);
    run(&mut cpu, 3);
    assert_eq!(cpu.a, 0x00);
    assert!(flag(&cpu, FLAG_CARRY));
    assert!(flag(&cpu, FLAG_ZERO));

    // ASL $10; LSR $11
    let mut cpu = cpu_with(&[0x06, 0x10, 0x46, 0x11]);
    cpu.bus.mem[0x0010] = 0xC1;
    cpu.bus.mem[0x0011] = 0x02;
    run(&mut cpu, 1);
    assert_eq!(cpu.bus.mem[0x0010], 0x82);
    assert!(flag(&cpu, FLAG_CARRY));
    run(&mut cpu, 1);
    assert_eq!(cpu.bus.mem[0x0011], 0x01);
    assert!(!flag(&cpu, FLAG_CARRY));
}

#[test]
fn inc_dec_memory() {
    let mut cpu = cpu_with(&[0xE6, 0x20, 0xC6, 0x21]); // INC $20; DEC $21
    cpu.bus.mem[0x0020] = 0xFF;
    run(&mut cpu, 2);
    assert_eq!(cpu.bus.mem[0x0020], 0x00);
    assert_eq!(cpu.bus.mem[0x0021], 0xFF);
    assert!(flag(&cpu, FLAG_NEGATIVE));
}

#[test]
fn lax_and_sax() {
    let mut cpu = cpu_with(&[0xA7, 0x10, 0xA9, 0x0F, 0x87, 0x11]); // LAX $10; LDA #$0F; SAX $11
    cpu.bus.mem[0x0010] = 0x3C;
    run(&mut cpu, 1);
    assert_eq!((cpu.a, cpu.x), (0x3C, 0x3C));

    run(&mut cpu, 2);
    assert_eq!(cpu.bus.mem[0x0011], 0x0C);
}

#[test]
fn dcp_and_isc() {
    // LDA #$40; DCP $10
    let mut cpu = cpu_with(&[0xA9, 0x40, 0xC7, 0x10]);
    cpu.bus.mem[0x0010] = 0x41;
    run(&mut cpu, 2);
    assert_eq!(cpu.bus.mem[0x0010], 0x40);
    assert!(flag(&cpu, FLAG_ZERO) && flag(&cpu, FLAG_CARRY));

    // SEC; LDA #$20; ISC $10
    let mut cpu = cpu_with(&[0x38, 0xA9, 0x20, 0xE7, 0x10]);
    cpu.bus.mem[0x0010] = 0x0F;
    run(&mut cpu, 3);
    assert_eq!(cpu.bus.mem[0x0010], 0x10);
    assert_eq!(cpu.a, 0x10);
}

#[test]
fn slo_rla_sre_rra() {
    // LDA #$01; SLO $10
    let mut cpu = cpu_with(&[0xA9, 0x01, 0x07, 0x10]);
    cpu.bus.mem[0x0010] = 0x81;
    run(&mut cpu, 2);
    assert_eq!(cpu.bus.mem[0x0010], 0x02);
    assert_eq!(cpu.a, 0x03);
    assert!(flag(&cpu, FLAG_CARRY));

    // LDA #$FF; RLA $10 (carry clear)
    let mut cpu = cpu_with(&[0xA9, 0xFF, 0x27, 0x10]);
    cpu.bus.mem[0x0010] = 0x40;
    run(&mut cpu, 2);
    assert_eq!(cpu.a, 0x80);

    // LDA #$FF; SRE $10
    let mut cpu = cpu_with(&[0xA9, 0xFF, 0x47, 0x10]);
    cpu.bus.mem[0x0010] = 0x02;
    run(&mut cpu, 2);
    assert_eq!(cpu.a, 0xFE);

    // LDA #$10; RRA $10 (carry clear)
    let mut cpu = cpu_with(&[0xA9, 0x10, 0x67, 0x10]);
    cpu.bus.mem[0x0010] = 0x02;
    run(&mut cpu, 2);
    assert_eq!(cpu.bus.mem[0x0010], 0x01);
    assert_eq!(cpu.a, 0x11);
}

#[test]
fn unofficial_nops_consume_operands() {
    // NOP $04; NOP $1234,X; NOP #$00; NOP (implied $1A)
    let mut cpu = cpu_with(&[0x04, 0x04, 0x1C, 0x34, 0x12, 0x80, 0x00, 0x1A]);
    run(&mut cpu, 4);
    assert_eq!(cpu.pc, 0x8008);
    assert_eq!(cpu.a, 0);
}

#[test]
fn unimplemented_opcode_halts() {
    let mut cpu = cpu_with(&[0xA9, 0x01, 0x02]); // LDA #1; JAM
    run(&mut cpu, 1);

    let expected = CpuError::UnimplementedOpcode {
        opcode: 0x02,
        pc: 0x8002,
    };
    assert_eq!(cpu.step(), Err(expected));
    assert!(cpu.halted());
    assert_eq!(cpu.fault(), Some(expected));

    let cycles = cpu.cycles;
    assert_eq!(cpu.step(), Err(expected));
    assert_eq!(cpu.pc, 0x8002);
    assert_eq!(cpu.cycles, cycles);

    cpu.reset();
    assert!(!cpu.halted());
    assert_eq!(cpu.fault(), None);
}

#[test]
fn every_populated_opcode_executes() {
    let table = crate::cpu::OpcodeTable::new();
    for opcode in 0..=255u8 {
        if table.get(opcode).is_none() {
            continue;
        }
        let mut cpu = cpu_with(&[opcode, 0x10, 0x02]);
        assert!(cpu.step().is_ok(), "${opcode:02X}");
    }
}

#[test]
fn page_cross_costs_a_cycle_for_reads_only() {
    let mut cpu = cpu_with(&[0xBD, 0xFF, 0x80, 0xBD, 0x00, 0x80]); // LDA $80FF,X; LDA $8000,X
    cpu.x = 1;
    run(&mut cpu, 1);
    assert_eq!(cpu.cycles, 7 + 5);
    run(&mut cpu, 1);
    assert_eq!(cpu.cycles, 7 + 5 + 4);

    let mut cpu = cpu_with(&[0x9D, 0xFF, 0x02]); // STA $02FF,X
    cpu.x = 1;
    run(&mut cpu, 1);
    assert_eq!(cpu.cycles, 7 + 5);
}

#[test]
fn branch_cycles() {
    // CLC; BCS +2 (not taken); BCC +0 (taken)
    let mut cpu = cpu_with(&[0x18, 0xB0, 0x02, 0x90, 0x00]);
    run(&mut cpu, 2);
    assert_eq!(cpu.cycles, 7 + 2 + 2);
    assert_eq!(cpu.pc, 0x8003);
    run(&mut cpu, 1);
    assert_eq!(cpu.cycles, 7 + 2 + 2 + 3);
    assert_eq!(cpu.pc, 0x8005);

    // BNE +$10 from $80FD crosses into $81xx
    let mut cpu = cpu_with(&[]);
    cpu.pc = 0x80FD;
    cpu.bus.mem[0x80FD] = 0xD0;
    cpu.bus.mem[0x80FE] = 0x10;
    run(&mut cpu, 1);
    assert_eq!(cpu.pc, 0x810F);
    assert_eq!(cpu.cycles, 7 + 4);
}

#[test]
fn backward_branch_target() {
    let mut cpu = cpu_with(&[]);
    cpu.pc = 0x8010;
    cpu.bus.mem[0x8010] = 0x10; // BPL -$10
    cpu.bus.mem[0x8011] = 0xF0;
    run(&mut cpu, 1);
    assert_eq!(cpu.pc, 0x8002);
}

#[test]
fn trace_line_matches_nestest_layout() {
    let mut cpu = cpu_with(&[]);
    cpu.pc = 0xC000;
    cpu.bus.mem[0xC000] = 0x4C;
    cpu.bus.mem[0xC001] = 0xF5;
    cpu.bus.mem[0xC002] = 0xC5;

    let line = cpu.step().unwrap();
    assert_eq!(
        line.to_string(),
        format!(
            "C000  4C F5 C5  JMP $C5F5{}A:00 X:00 Y:00 P:24 SP:FD CYC:7",
            " ".repeat(23)
        )
    );
    assert_eq!(line.opcode(), 0x4C);
    assert_eq!(cpu.pc, 0xC5F5);
}

#[test]
fn trace_marks_unofficial_opcodes() {
    let mut cpu = cpu_with(&[0x04, 0xA9, 0x0A, 0xB1, 0x33, 0xD0, 0xFE]);
    assert_eq!(cpu.step().unwrap().disassembly(), "*NOP $A9");
    assert_eq!(cpu.step().unwrap().disassembly(), " ASL A");
    assert_eq!(cpu.step().unwrap().disassembly(), " LDA ($33),Y");
    assert_eq!(cpu.step().unwrap().disassembly(), " BNE $8005");
}
