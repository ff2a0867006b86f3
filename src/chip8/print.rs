//! The pretty print implementation for the [`RegisterSnapshot`](super::RegisterSnapshot), the
//! raw memory and the [`ChipSet`](super::ChipSet) as a whole.

use std::fmt;

use super::{ChipSet, RegisterSnapshot};
use crate::timer::TimerCallback;

/// How many bytes are shown in a single row of the memory dump.
const HEX_PRINT_STEP: usize = 16;

/// The shortcut used for rows that only contain zeros.
const FILLER: &str = "...";

/// The labels shown in the last column of the register view, empty labels leave the
/// column out.
const LABELS: [&str; 8] = ["OP", "PC", "I", "SP", "", "", "DT", "ST"];

impl fmt::Display for RegisterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let special = [
            self.opcode,
            self.program_counter,
            self.index_register,
            self.stack_pointer as u16,
            0,
            0,
            self.delay_timer as u16,
            self.sound_timer as u16,
        ];

        let half = self.registers.len() / 2;
        for i in 0..half {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "V{:X}: {:02X}   V{:X}: {:02X}   S{:X}: {:04X}   S{:X}: {:04X}",
                i,
                self.registers[i],
                i + half,
                self.registers[i + half],
                i,
                self.stack[i],
                i + half,
                self.stack[i + half],
            )?;
            if !LABELS[i].is_empty() {
                write!(f, "   {:>2}: {:04X}", LABELS[i], special[i])?;
            }
        }
        Ok(())
    }
}

/// Prints raw memory as rows of hex bytes, consecutive rows that only contain zeros are
/// folded into a single row.
///
/// ```rust
/// # use octochip::chip8::HexDump;
/// let memory = [0u8; 64];
/// assert_eq!(format!("{}", HexDump(&memory)), "0x0000 - 0x003F : ...");
/// ```
pub struct HexDump<'a>(pub &'a [u8]);

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rows = self.0.chunks(HEX_PRINT_STEP).enumerate().peekable();
        let mut first = true;

        while let Some((index, row)) = rows.next() {
            let from = index * HEX_PRINT_STEP;
            let mut to = from + row.len() - 1;
            let only_null = row.iter().all(|&byte| byte == 0);

            if only_null {
                while let Some((next, r)) = rows.next_if(|(_, r)| r.iter().all(|&b| b == 0)) {
                    to = next * HEX_PRINT_STEP + r.len() - 1;
                }
            }

            if !first {
                writeln!(f)?;
            }
            first = false;

            write!(f, "{:#06X} - {:#06X} :", from, to)?;
            if only_null {
                write!(f, " {}", FILLER)?;
            } else {
                for byte in row {
                    write!(f, " {:02X}", byte)?;
                }
            }
        }
        Ok(())
    }
}

impl<S: TimerCallback> fmt::Display for ChipSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Registers :")?;
        writeln!(f, "{}", self.snapshot())?;
        writeln!(f, "Memory :")?;
        write!(f, "{}", HexDump(&self.memory))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_print() {
        let mut chip = ChipSet::new();
        chip.registers[0x1] = 0xAB;
        chip.registers[0xF] = 0x01;
        chip.stack[0] = 0x0200;
        chip.stack_pointer = 1;
        chip.index_register = 0x0123;
        chip.opcode = 0x2200;
        chip.delay_timer.set_value(0x10);

        let expected = "\
V0: 00   V8: 00   S0: 0200   S8: 0000   OP: 2200
V1: AB   V9: 00   S1: 0000   S9: 0000   PC: 0200
V2: 00   VA: 00   S2: 0000   SA: 0000    I: 0123
V3: 00   VB: 00   S3: 0000   SB: 0000   SP: 0001
V4: 00   VC: 00   S4: 0000   SC: 0000
V5: 00   VD: 00   S5: 0000   SD: 0000
V6: 00   VE: 00   S6: 0000   SE: 0000   DT: 0010
V7: 00   VF: 01   S7: 0000   SF: 0000   ST: 0000";

        assert_eq!(expected, format!("{}", chip.snapshot()));
    }

    #[test]
    fn test_hex_dump_folds_zero_rows() {
        let mut memory = [0u8; 80];
        memory[0x10] = 0xF0;
        memory[0x1F] = 0x90;

        let expected = "\
0x0000 - 0x000F : ...
0x0010 - 0x001F : F0 00 00 00 00 00 00 00 00 00 00 00 00 00 00 90
0x0020 - 0x004F : ...";

        assert_eq!(expected, format!("{}", HexDump(&memory)));
    }

    #[test]
    fn test_hex_dump_short_last_row() {
        let memory = [0x12u8, 0x34, 0x00];
        assert_eq!("0x0000 - 0x0002 : 12 34 00", format!("{}", HexDump(&memory)));
    }

    #[test]
    fn test_full_print_contains_font() {
        let chip = ChipSet::new();
        let print = format!("{}", chip);

        assert!(print.starts_with("Registers :\nV0: 00"));
        assert!(print.contains("0x0000 - 0x000F : F0 90 90 90 F0 20 60 20 20 70 F0 10 F0 80 F0 F0"));
        assert!(print.ends_with("0x0050 - 0x0FFF : ..."));
    }
}
