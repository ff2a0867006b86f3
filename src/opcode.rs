//! Opcode abstractions, functionality and constants.
//!
//! Executing an opcode happens in two steps, first the raw [`Opcode`](Opcode) is decoded into an
//! [`Instruction`](Instruction), afterwards the instruction gets handed to an implementation of
//! [`ChipOpcodes`](ChipOpcodes). Anything that doesn't decode is an unknown opcode and never
//! reaches the execution step.
use crate::{definitions::memory, OpcodeError, ProcessError};

/// the base mask used for generating all the other sub masks
pub(crate) const OPCODE_MASK_FFFF: u16 = u16::MAX;

/// the mask for the first twelve bits
pub(crate) const OPCODE_MASK_FFF0: u16 = OPCODE_MASK_FFFF << 4;

/// the mask for the first eight bits
pub(crate) const OPCODE_MASK_FF00: u16 = OPCODE_MASK_FFFF << 8;

/// the mask for the first four bits
pub(crate) const OPCODE_MASK_F000: u16 = OPCODE_MASK_FFFF << 12;

/// the mask for the last four bits
pub(crate) const OPCODE_MASK_000F: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FFF0;

/// the mask for the last eight bits
pub(crate) const OPCODE_MASK_00FF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FF00;

/// the mask for the last twelve bits
pub(crate) const OPCODE_MASK_0FFF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_F000;

/// the size of a nibble
const NIBBLE: u16 = 4;

/// a wrapper type for u16 to make it clear what is meant to be used
pub type Opcode = u16;

/// will build an opcode from data and the given point
/// # Arguments
///
/// - `data` - A slice of u8 data entries used to generate the opcodes
/// - `pointer` - Where in the data the opcode shall be extracted, so `pointer` and `pointer + 1`
/// make the opcode up (big-endian)
///
/// # Example
/// ```rust
/// # use octochip::opcode::*;
/// # use octochip::OpcodeError;
/// const SPLIT_OPCODE: [u8; 4] = [0x00, 0xEE, 0x1E, 0xDA];
/// assert_eq!(build_opcode(&SPLIT_OPCODE, 0), Ok(0x00EE));
/// assert_eq!(build_opcode(&SPLIT_OPCODE, 2), Ok(0x1EDA));
/// assert_eq!(
///     build_opcode(&SPLIT_OPCODE, 3),
///     Err(OpcodeError::MemoryInvalid { pointer: 3, len: 4 })
/// );
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, OpcodeError> {
    match (data.get(pointer), data.get(pointer.wrapping_add(1))) {
        (Some(&high), Some(&low)) => Ok(Opcode::from_be_bytes([high, low])),
        _ => Err(OpcodeError::MemoryInvalid {
            pointer,
            len: data.len(),
        }),
    }
}

/// These are special traits used to filter out information
/// from opcodes
pub trait OpcodeTrait {
    /// Returns the opcode family, so the highest nibble shifted down.
    ///
    /// ```rust
    /// # use octochip::opcode::*;
    /// # const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.t(), 0x1);
    /// ```
    fn t(&self) -> u8;

    /// Extracts `NNN` from `TNNN`, an address.
    ///
    /// ```rust
    /// # use octochip::opcode::*;
    /// # const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.nnn(), 0xEDA);
    /// ```
    fn nnn(&self) -> usize;

    /// Extracts `X` and `NN` from `TXNN`, a register index and a constant.
    ///
    /// ```rust
    /// # use octochip::opcode::*;
    /// # const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.xnn(), (0xE, 0xDA));
    /// ```
    fn xnn(&self) -> (usize, u8);

    /// Extracts `X`, `Y` and `N` from `TXYN`, two register indexes and a nibble.
    ///
    /// ```rust
    /// # use octochip::opcode::*;
    /// # const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.xyn(), (0xE, 0xD, 0xA));
    /// ```
    fn xyn(&self) -> (usize, usize, u8);

    /// Extracts `X` from `TXTT`.
    ///
    /// ```rust
    /// # use octochip::opcode::*;
    /// # const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.x(), 0xE);
    /// ```
    fn x(&self) -> usize;
}

impl OpcodeTrait for Opcode {
    fn t(&self) -> u8 {
        ((self & OPCODE_MASK_F000) >> (3 * NIBBLE)) as u8
    }

    fn nnn(&self) -> usize {
        (self & OPCODE_MASK_0FFF) as usize
    }

    fn xnn(&self) -> (usize, u8) {
        (self.x(), (self & OPCODE_MASK_00FF) as u8)
    }

    fn xyn(&self) -> (usize, usize, u8) {
        const MASK: u16 = OPCODE_MASK_00FF ^ OPCODE_MASK_000F;
        let y = ((self & MASK) >> NIBBLE) as usize;
        let n = (self & OPCODE_MASK_000F) as u8;
        (self.x(), y, n)
    }

    fn x(&self) -> usize {
        ((self & OPCODE_MASK_0FFF & OPCODE_MASK_FF00) >> (2 * NIBBLE)) as usize
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents the program steps that the chip
/// can take.
pub enum ProgramCounterStep {
    /// Will not change the program counter
    None,
    /// Will move the program counter to the next opcode
    Next,
    /// Will skip the next opcode
    Skip,
    /// Will simply move the program counter to the given location.
    Jump(usize),
}

impl ProgramCounterStep {
    /// Will return a Skip if the condition is true.
    ///
    /// # Example
    /// ```rust
    /// # use octochip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next, ProgramCounterStep::cond(false));
    /// assert_eq!(ProgramCounterStep::Skip, ProgramCounterStep::cond(true));
    /// ```
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }

    /// Calculates the new program counter, starting from `current`.
    ///
    /// ```rust
    /// # use octochip::opcode::ProgramCounterStep;
    /// assert_eq!(0x202, ProgramCounterStep::Next.apply(0x200));
    /// assert_eq!(0x204, ProgramCounterStep::Skip.apply(0x200));
    /// assert_eq!(0x200, ProgramCounterStep::None.apply(0x200));
    /// assert_eq!(0x300, ProgramCounterStep::Jump(0x300).apply(0x200));
    /// ```
    #[inline]
    pub fn apply(&self, current: usize) -> usize {
        match *self {
            ProgramCounterStep::None => current,
            ProgramCounterStep::Next => current + memory::opcodes::SIZE,
            ProgramCounterStep::Skip => current + 2 * memory::opcodes::SIZE,
            ProgramCounterStep::Jump(pointer) => pointer,
        }
    }
}

/// `00E0` and `DXYN`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// `00E0` - clears the display
    Clear,
    /// `DXYN` - draws an `8 x N` sprite from `I` at `(VX, VY)`
    Draw { x: usize, y: usize, n: u8 },
}

/// Everything that moves the program counter somewhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// `00EE`
    Return,
    /// `1NNN`
    Jump { nnn: usize },
    /// `2NNN`
    Call { nnn: usize },
    /// `BNNN` - jumps to `NNN + V0`
    JumpOffset { nnn: usize },
}

/// The conditional skips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// `3XNN`
    EqualConst { x: usize, nn: u8 },
    /// `4XNN`
    NotEqualConst { x: usize, nn: u8 },
    /// `5XY0`
    Equal { x: usize, y: usize },
    /// `9XY0`
    NotEqual { x: usize, y: usize },
    /// `EX9E`
    KeyPressed { x: usize },
    /// `EXA1`
    KeyNotPressed { x: usize },
}

/// The `8XYT` sub opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arithmetic {
    /// `8XY0` - `VX = VY`
    Assign,
    /// `8XY1` - `VX |= VY`
    Or,
    /// `8XY2` - `VX &= VY`
    And,
    /// `8XY3` - `VX ^= VY`
    Xor,
    /// `8XY4` - `VX += VY`, `VF` is the carry
    Add,
    /// `8XY5` - `VX -= VY`, `VF` is set when there is no borrow
    Sub,
    /// `8XY6` - `VX >>= 1`, `VF` is the shifted out bit
    ShiftRight,
    /// `8XY7` - `VX = VY - VX`, `VF` is set when there is no borrow
    SubReverse,
    /// `8XYE` - `VX <<= 1`, `VF` is the shifted out bit
    ShiftLeft,
}

impl Arithmetic {
    fn decode(n: u8) -> Option<Self> {
        let ops = match n {
            0x0 => Arithmetic::Assign,
            0x1 => Arithmetic::Or,
            0x2 => Arithmetic::And,
            0x3 => Arithmetic::Xor,
            0x4 => Arithmetic::Add,
            0x5 => Arithmetic::Sub,
            0x6 => Arithmetic::ShiftRight,
            0x7 => Arithmetic::SubReverse,
            0xE => Arithmetic::ShiftLeft,
            _ => return None,
        };
        Some(ops)
    }
}

/// Operations writing the general purpose registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// `6XNN`
    SetConst { x: usize, nn: u8 },
    /// `7XNN` - the carry flag is left alone
    AddConst { x: usize, nn: u8 },
    /// `8XYT`
    Alu { ops: Arithmetic, x: usize, y: usize },
    /// `CXNN`
    Random { x: usize, nn: u8 },
}

/// Operations around the index register and the memory it points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Memory {
    /// `ANNN`
    SetIndex { nnn: usize },
    /// `FX1E`
    AddIndex { x: usize },
    /// `FX29`
    FontSprite { x: usize },
    /// `FX33`
    StoreBcd { x: usize },
    /// `FX55`
    StoreRegisters { x: usize },
    /// `FX65`
    FillRegisters { x: usize },
}

/// `FX07`, `FX15` and `FX18`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timers {
    GetDelay { x: usize },
    SetDelay { x: usize },
    SetSound { x: usize },
}

/// `FX0A`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Waits until any key is pressed and stores the key in `VX`.
    AwaitKeyPress { x: usize },
}

/// A fully decoded opcode with all of its operands extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Screen(Screen),
    Flow(Flow),
    Skip(Skip),
    Register(Register),
    Memory(Memory),
    Timer(Timers),
    Input(Input),
}

impl Instruction {
    /// Decodes the opcode, returns `None` for anything that is not a known opcode.
    ///
    /// ```rust
    /// # use octochip::opcode::*;
    /// assert_eq!(Instruction::decode(0x00E0), Some(Instruction::Screen(Screen::Clear)));
    /// assert_eq!(Instruction::decode(0x5121), None);
    /// ```
    pub fn decode(opcode: Opcode) -> Option<Self> {
        let (x, nn) = opcode.xnn();
        let (_, y, n) = opcode.xyn();
        let nnn = opcode.nnn();

        let instruction = match opcode.t() {
            0x0 => match opcode {
                0x00E0 => Instruction::Screen(Screen::Clear),
                0x00EE => Instruction::Flow(Flow::Return),
                _ => return None,
            },
            0x1 => Instruction::Flow(Flow::Jump { nnn }),
            0x2 => Instruction::Flow(Flow::Call { nnn }),
            0x3 => Instruction::Skip(Skip::EqualConst { x, nn }),
            0x4 => Instruction::Skip(Skip::NotEqualConst { x, nn }),
            0x5 if n == 0 => Instruction::Skip(Skip::Equal { x, y }),
            0x6 => Instruction::Register(Register::SetConst { x, nn }),
            0x7 => Instruction::Register(Register::AddConst { x, nn }),
            0x8 => Instruction::Register(Register::Alu {
                ops: Arithmetic::decode(n)?,
                x,
                y,
            }),
            0x9 if n == 0 => Instruction::Skip(Skip::NotEqual { x, y }),
            0xA => Instruction::Memory(Memory::SetIndex { nnn }),
            0xB => Instruction::Flow(Flow::JumpOffset { nnn }),
            0xC => Instruction::Register(Register::Random { x, nn }),
            0xD => Instruction::Screen(Screen::Draw { x, y, n }),
            0xE => match nn {
                0x9E => Instruction::Skip(Skip::KeyPressed { x }),
                0xA1 => Instruction::Skip(Skip::KeyNotPressed { x }),
                _ => return None,
            },
            0xF => match nn {
                0x07 => Instruction::Timer(Timers::GetDelay { x }),
                0x0A => Instruction::Input(Input::AwaitKeyPress { x }),
                0x15 => Instruction::Timer(Timers::SetDelay { x }),
                0x18 => Instruction::Timer(Timers::SetSound { x }),
                0x1E => Instruction::Memory(Memory::AddIndex { x }),
                0x29 => Instruction::Memory(Memory::FontSprite { x }),
                0x33 => Instruction::Memory(Memory::StoreBcd { x }),
                0x55 => Instruction::Memory(Memory::StoreRegisters { x }),
                0x65 => Instruction::Memory(Memory::FillRegisters { x }),
                _ => return None,
            },
            _ => return None,
        };
        Some(instruction)
    }
}

/// Represents a step of the program counter
/// this requires the enum ProgramCounterStep
/// to work.
pub trait ProgramCounter {
    /// will move the program counter forward by a step.
    fn advance(&mut self, step: ProgramCounterStep);
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents a command from the interpreter up to the caller.
pub enum Operation {
    /// If no action has to be taken.
    None,
    /// The chip is waiting for the next key press,
    /// the same opcode will run again on the next step.
    Wait,
    /// The display was changed.
    Draw,
}

/// These are the traits that have to be full filled for a working opcode
/// table.
///
/// Every method either returns how the program counter shall move, or an error. In case of an
/// error no state must have been changed by the method.
pub trait ChipOpcodes: ProgramCounter {
    /// will run a single decoded instruction and move the program counter accordingly
    fn calc(&mut self, instruction: Instruction) -> Result<Operation, ProcessError> {
        log::debug!("instruction {:?}", instruction);

        let (step, operation) = match instruction {
            Instruction::Screen(op) => (self.screen(op)?, Operation::Draw),
            Instruction::Flow(op) => (self.flow(op)?, Operation::None),
            Instruction::Skip(op) => (self.skip(op)?, Operation::None),
            Instruction::Register(op) => (self.register(op)?, Operation::None),
            Instruction::Memory(op) => (self.memory(op)?, Operation::None),
            Instruction::Timer(op) => (self.timer(op)?, Operation::None),
            Instruction::Input(op) => match self.input(op)? {
                ProgramCounterStep::None => (ProgramCounterStep::None, Operation::Wait),
                step => (step, Operation::None),
            },
        };

        self.advance(step);
        Ok(operation)
    }

    /// - `00E0` - Display  - `disp_clear()`        - Clears the screen.
    /// - `DXYN` - Disp     - `draw(Vx,Vy,N)`       - Draws a sprite at coordinate `(VX, VY)` that
    ///   has a width of `8` pixels and a height of `N` pixels. Each row of `8` pixels is read as
    ///   bit-coded starting from memory location `I`; `I` value doesn’t change after the
    ///   execution of this instruction. `VF` is set to `1` if any screen pixels are flipped from
    ///   set to unset when the sprite is drawn, and to `0` if that doesn’t happen.
    fn screen(&mut self, op: Screen) -> Result<ProgramCounterStep, ProcessError>;

    /// - `00EE` - Flow     - `return;`             - Returns from a subroutine.
    /// - `1NNN` - Flow     - `goto NNN;`           - Jumps to address `NNN`.
    /// - `2NNN` - Flow     - `*(0xNNN)()`          - Calls subroutine at `NNN`.
    /// - `BNNN` - Flow     - `PC=V0+NNN`           - Jumps to the address `NNN` plus `V0`.
    fn flow(&mut self, op: Flow) -> Result<ProgramCounterStep, ProcessError>;

    /// - `3XNN` - Cond     - `if(Vx==NN)`
    /// - `4XNN` - Cond     - `if(Vx!=NN)`
    /// - `5XY0` - Cond     - `if(Vx==Vy)`
    /// - `9XY0` - Cond     - `if(Vx!=Vy)`
    /// - `EX9E` - KeyOp    - `if(key()==Vx)`
    /// - `EXA1` - KeyOp    - `if(key()!=Vx)`
    ///
    /// All of them skip the next instruction if the condition holds.
    fn skip(&self, op: Skip) -> Result<ProgramCounterStep, ProcessError>;

    /// - `6XNN` - Const    - `Vx = NN`
    /// - `7XNN` - Const    - `Vx += NN` (Carry flag is not changed)
    /// - `8XYT` - Math / BitOp, see [`Arithmetic`](Arithmetic)
    /// - `CXNN` - Rand     - `Vx=rand()&NN`
    fn register(&mut self, op: Register) -> Result<ProgramCounterStep, ProcessError>;

    /// - `ANNN` - MEM      - `I = NNN`
    /// - `FX1E` - MEM      - `I +=Vx` (`VF` is not affected)
    /// - `FX29` - MEM      - `I=sprite_addr[Vx]`
    /// - `FX33` - BCD      - stores the hundreds, tens and ones of `VX` at `I`, `I+1` and `I+2`
    /// - `FX55` - MEM      - `reg_dump(Vx,&I)`
    /// - `FX65` - MEM      - `reg_load(Vx,&I)`
    fn memory(&mut self, op: Memory) -> Result<ProgramCounterStep, ProcessError>;

    /// - `FX07` - Timer    - `Vx = get_delay()`
    /// - `FX15` - Timer    - `delay_timer(Vx)`
    /// - `FX18` - Sound    - `sound_timer(Vx)`
    fn timer(&mut self, op: Timers) -> Result<ProgramCounterStep, ProcessError>;

    /// - `FX0A` - KeyOp    - `Vx = get_key()` - A key press is awaited, and then stored in `VX`.
    ///
    /// Returns [`ProgramCounterStep::None`](ProgramCounterStep::None) as long as no key is
    /// pressed.
    fn input(&mut self, op: Input) -> Result<ProgramCounterStep, ProcessError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_simple() {
        assert_eq!(
            Instruction::decode(0x00EE),
            Some(Instruction::Flow(Flow::Return))
        );
    }

    #[test]
    fn test_decode_simple_fail() {
        assert_eq!(Instruction::decode(0x00E1), None);
        assert_eq!(Instruction::decode(0x0123), None);
        assert_eq!(Instruction::decode(0xFFFF), None);
    }

    #[test]
    fn test_decode_multiple() {
        let tests = [
            (0x00E0, Some(Instruction::Screen(Screen::Clear))),
            (0x1919, Some(Instruction::Flow(Flow::Jump { nnn: 0x919 }))),
            (0x2222, Some(Instruction::Flow(Flow::Call { nnn: 0x222 }))),
            (
                0x3123,
                Some(Instruction::Skip(Skip::EqualConst { x: 0x1, nn: 0x23 })),
            ),
            (
                0x4123,
                Some(Instruction::Skip(Skip::NotEqualConst { x: 0x1, nn: 0x23 })),
            ),
            (
                0x5120,
                Some(Instruction::Skip(Skip::Equal { x: 0x1, y: 0x2 })),
            ),
            (0x5121, None),
            (
                0x6123,
                Some(Instruction::Register(Register::SetConst { x: 0x1, nn: 0x23 })),
            ),
            (
                0x7123,
                Some(Instruction::Register(Register::AddConst { x: 0x1, nn: 0x23 })),
            ),
            (
                0x8124,
                Some(Instruction::Register(Register::Alu {
                    ops: Arithmetic::Add,
                    x: 0x1,
                    y: 0x2,
                })),
            ),
            (
                0x812E,
                Some(Instruction::Register(Register::Alu {
                    ops: Arithmetic::ShiftLeft,
                    x: 0x1,
                    y: 0x2,
                })),
            ),
            (0x8128, None),
            (
                0x9120,
                Some(Instruction::Skip(Skip::NotEqual { x: 0x1, y: 0x2 })),
            ),
            (0x9121, None),
            (
                0xA222,
                Some(Instruction::Memory(Memory::SetIndex { nnn: 0x222 })),
            ),
            (
                0xB222,
                Some(Instruction::Flow(Flow::JumpOffset { nnn: 0x222 })),
            ),
            (
                0xC123,
                Some(Instruction::Register(Register::Random { x: 0x1, nn: 0x23 })),
            ),
            (
                0xD123,
                Some(Instruction::Screen(Screen::Draw {
                    x: 0x1,
                    y: 0x2,
                    n: 0x3,
                })),
            ),
            (
                0xE19E,
                Some(Instruction::Skip(Skip::KeyPressed { x: 0x1 })),
            ),
            (
                0xE1A1,
                Some(Instruction::Skip(Skip::KeyNotPressed { x: 0x1 })),
            ),
            (0xE111, None),
            (
                0xF007,
                Some(Instruction::Timer(Timers::GetDelay { x: 0x0 })),
            ),
            (
                0xF30A,
                Some(Instruction::Input(Input::AwaitKeyPress { x: 0x3 })),
            ),
            (
                0xF015,
                Some(Instruction::Timer(Timers::SetDelay { x: 0x0 })),
            ),
            (
                0xF018,
                Some(Instruction::Timer(Timers::SetSound { x: 0x0 })),
            ),
            (
                0xF01E,
                Some(Instruction::Memory(Memory::AddIndex { x: 0x0 })),
            ),
            (
                0xF029,
                Some(Instruction::Memory(Memory::FontSprite { x: 0x0 })),
            ),
            (
                0xF033,
                Some(Instruction::Memory(Memory::StoreBcd { x: 0x0 })),
            ),
            (
                0xF555,
                Some(Instruction::Memory(Memory::StoreRegisters { x: 0x5 })),
            ),
            (
                0xF565,
                Some(Instruction::Memory(Memory::FillRegisters { x: 0x5 })),
            ),
            (0xF0AA, None),
        ];
        for (value, res) in tests.iter() {
            assert_eq!(Instruction::decode(*value), *res, "opcode {:#06X}", value);
        }
    }

    #[test]
    fn test_every_eight_sub_opcode() {
        for n in 0x0..=0xF {
            let decoded = Instruction::decode(0x8120 | n);
            let expected = matches!(n, 0x0..=0x7 | 0xE);
            assert_eq!(decoded.is_some(), expected, "sub opcode {:#X}", n);
        }
    }

    #[test]
    fn test_build_opcode_last_byte() {
        let data = [0u8; 4];
        assert!(build_opcode(&data, 2).is_ok());
        assert!(build_opcode(&data, 3).is_err());
        assert!(build_opcode(&data, usize::MAX).is_err());
    }
}
