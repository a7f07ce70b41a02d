//! 6502 processor status register (P) flag bits.
//!
//! P is the only place flag state lives; every handler reads and writes these
//! bits directly on `CPU::status`.

pub const FLAG_CARRY: u8 = 1 << 0;
pub const FLAG_ZERO: u8 = 1 << 1;
pub const FLAG_INTERRUPT_DISABLE: u8 = 1 << 2;
pub const FLAG_DECIMAL: u8 = 1 << 3; // stored, but ADC/SBC stay binary on the 2A03
pub const FLAG_BREAK: u8 = 1 << 4; // only exists in pushed copies of P
pub const FLAG_UNUSED: u8 = 1 << 5; // always 1 when pushed
pub const FLAG_OVERFLOW: u8 = 1 << 6;
pub const FLAG_NEGATIVE: u8 = 1 << 7;

/// Render P as `NV-BDIZC`, upper case for set bits, lower case for clear ones.
pub fn describe(status: u8) -> String {
    const NAMES: [(u8, char); 8] = [
        (FLAG_NEGATIVE, 'N'),
        (FLAG_OVERFLOW, 'V'),
        (FLAG_UNUSED, 'U'),
        (FLAG_BREAK, 'B'),
        (FLAG_DECIMAL, 'D'),
        (FLAG_INTERRUPT_DISABLE, 'I'),
        (FLAG_ZERO, 'Z'),
        (FLAG_CARRY, 'C'),
    ];

    NAMES
        .iter()
        .map(|&(bit, name)| {
            if status & bit != 0 {
                name
            } else {
                name.to_ascii_lowercase()
            }
        })
        .collect()
}
