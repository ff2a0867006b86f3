use crate::{
    definitions::{cpu, display, memory},
    opcode::{
        Arithmetic, ChipOpcodes, Flow, Input, Memory, ProgramCounterStep, Register, Screen, Skip,
        Timers,
    },
    timer::TimerCallback,
    ProcessError,
};

use super::ChipSet;

impl<S: TimerCallback> ChipOpcodes for ChipSet<S> {
    fn screen(&mut self, op: Screen) -> Result<ProgramCounterStep, ProcessError> {
        match op {
            Screen::Clear => self.clear_display(),
            Screen::Draw { x, y, n } => {
                // the sprite starts wrapped around the screen, but everything
                // that would go over the edge is clipped
                let coorx = self.registers[x] as usize % display::WIDTH;
                let coory = self.registers[y] as usize % display::HEIGHT;

                let range = self.index_range(n as usize)?;
                let mut collision = false;

                for (i, row) in self.memory[range].iter().enumerate() {
                    let py = coory + i;
                    if py >= display::HEIGHT {
                        break;
                    }

                    for j in 0..display::SPRITE_WIDTH {
                        let px = coorx + j;
                        if px >= display::WIDTH {
                            break;
                        }

                        let mask = 0x80 >> j;
                        if row & mask == 0 {
                            continue;
                        }

                        let pixel = &mut self.display[py][px];
                        collision |= *pixel == 1;
                        *pixel ^= 1;
                    }
                }

                self.registers[cpu::register::LAST] = collision as u8;
                self.redraw = true;
            }
        }
        Ok(ProgramCounterStep::Next)
    }

    fn flow(&mut self, op: Flow) -> Result<ProgramCounterStep, ProcessError> {
        let step = match op {
            Flow::Return => {
                // return to the opcode after the call
                let pc = self.pop_stack()?;
                log::debug!("return to {:#X}", pc);
                ProgramCounterStep::Jump(pc + memory::opcodes::SIZE)
            }
            Flow::Jump { nnn } => ProgramCounterStep::Jump(nnn),
            Flow::Call { nnn } => {
                self.push_stack(self.program_counter)?;
                ProgramCounterStep::Jump(nnn)
            }
            Flow::JumpOffset { nnn } => ProgramCounterStep::Jump(nnn + self.registers[0] as usize),
        };
        Ok(step)
    }

    fn skip(&self, op: Skip) -> Result<ProgramCounterStep, ProcessError> {
        let cond = match op {
            Skip::EqualConst { x, nn } => self.registers[x] == nn,
            Skip::NotEqualConst { x, nn } => self.registers[x] != nn,
            Skip::Equal { x, y } => self.registers[x] == self.registers[y],
            Skip::NotEqual { x, y } => self.registers[x] != self.registers[y],
            Skip::KeyPressed { x } => self.keyboard.is_pressed(self.registers[x] as usize),
            Skip::KeyNotPressed { x } => !self.keyboard.is_pressed(self.registers[x] as usize),
        };
        Ok(ProgramCounterStep::cond(cond))
    }

    fn register(&mut self, op: Register) -> Result<ProgramCounterStep, ProcessError> {
        match op {
            Register::SetConst { x, nn } => self.registers[x] = nn,
            Register::AddConst { x, nn } => {
                // let VX overflow, but ignore carry
                self.registers[x] = self.registers[x].wrapping_add(nn);
            }
            Register::Alu { ops, x, y } => {
                let vx = self.registers[x];
                let vy = self.registers[y];

                let flag = match ops {
                    Arithmetic::Assign | Arithmetic::Or | Arithmetic::And | Arithmetic::Xor => None,
                    Arithmetic::Add => Some(vx.overflowing_add(vy).1 as u8),
                    Arithmetic::Sub => Some((vx >= vy) as u8),
                    Arithmetic::ShiftRight => Some(vx & 1),
                    Arithmetic::SubReverse => Some((vy >= vx) as u8),
                    Arithmetic::ShiftLeft => Some(vx >> 7),
                };

                // VF is set first, the operands are read again afterwards, so with
                // `X == F` or `Y == F` the new flag takes part in the calculation
                if let Some(flag) = flag {
                    self.registers[cpu::register::LAST] = flag;
                }
                let vx = self.registers[x];
                let vy = self.registers[y];

                self.registers[x] = match ops {
                    Arithmetic::Assign => vy,
                    Arithmetic::Or => vx | vy,
                    Arithmetic::And => vx & vy,
                    Arithmetic::Xor => vx ^ vy,
                    Arithmetic::Add => vx.wrapping_add(vy),
                    Arithmetic::Sub => vx.wrapping_sub(vy),
                    Arithmetic::ShiftRight => vx >> 1,
                    Arithmetic::SubReverse => vy.wrapping_sub(vx),
                    Arithmetic::ShiftLeft => vx << 1,
                };
            }
            Register::Random { x, nn } => {
                // using a fill bytes call here, as the trait RngCore does not
                // support random u8.
                let mut rand = [0u8; 1];
                self.rng.fill_bytes(&mut rand);
                self.registers[x] = rand[0] & nn;
            }
        }
        Ok(ProgramCounterStep::Next)
    }

    fn memory(&mut self, op: Memory) -> Result<ProgramCounterStep, ProcessError> {
        match op {
            Memory::SetIndex { nnn } => self.index_register = nnn as u16,
            Memory::AddIndex { x } => {
                self.index_register = self.index_register.wrapping_add(self.registers[x] as u16);
            }
            Memory::FontSprite { x } => {
                let glyph = self.registers[x] as usize;
                self.index_register =
                    (display::fontset::LOCATION + glyph * display::fontset::GLYPH_SIZE) as u16;
            }
            Memory::StoreBcd { x } => {
                let range = self.index_range(3)?;
                let r = self.registers[x];
                // 246u8 => [2, 4, 6]
                self.memory[range].copy_from_slice(&[r / 100, r / 10 % 10, r % 10]);
            }
            Memory::StoreRegisters { x } => {
                let range = self.index_range(x + 1)?;
                self.memory[range].copy_from_slice(&self.registers[..=x]);
            }
            Memory::FillRegisters { x } => {
                let range = self.index_range(x + 1)?;
                self.registers[..=x].copy_from_slice(&self.memory[range]);
            }
        }
        Ok(ProgramCounterStep::Next)
    }

    fn timer(&mut self, op: Timers) -> Result<ProgramCounterStep, ProcessError> {
        match op {
            Timers::GetDelay { x } => self.registers[x] = self.delay_timer.get_value(),
            Timers::SetDelay { x } => self.delay_timer.set_value(self.registers[x]),
            Timers::SetSound { x } => self.sound_timer.set_value(self.registers[x]),
        }
        Ok(ProgramCounterStep::Next)
    }

    fn input(&mut self, op: Input) -> Result<ProgramCounterStep, ProcessError> {
        let Input::AwaitKeyPress { x } = op;
        match self.keyboard.first_pressed() {
            Some(key) => {
                self.registers[x] = key as u8;
                Ok(ProgramCounterStep::Next)
            }
            // run the same opcode again on the next step
            None => Ok(ProgramCounterStep::None),
        }
    }
}
