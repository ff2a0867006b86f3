use std::ops::Range;

use {
    crate::{
        definitions::{cpu, display, memory},
        devices::Keyboard,
        error::{LoadError, OpcodeError, ProcessError, StackError},
        opcode::{self, ChipOpcodes, Instruction, Opcode, Operation, ProgramCounter, ProgramCounterStep},
        timer::{LogCallback, NoCallback, Timer, TimerCallback},
    },
    rand::RngCore,
};

/// The pixels of the display, addressed as `display[y][x]`. Every cell is either `0` or `1`.
pub type Framebuffer = [[u8; display::WIDTH]; display::HEIGHT];

/// A copy of all the registers, used for debug views of the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterSnapshot {
    /// `V0` to `VF`
    pub registers: [u8; cpu::register::SIZE],
    /// all the stack slots, including the unused ones
    pub stack: [u16; cpu::stack::SIZE],
    /// the last fetched opcode
    pub opcode: Opcode,
    pub program_counter: u16,
    pub index_register: u16,
    pub stack_pointer: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
}

/// The ChipSet struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instant on the
/// Chip8 CPU.
///
/// The chipset is driven by calling [`step`](ChipSet::step), every call runs exactly one
/// opcode and ticks both timers once.
pub struct ChipSet<S: TimerCallback = LogCallback> {
    /// all two bytes long and stored big-endian
    pub(super) opcode: Opcode,
    /// - `0x000-0x1FF` - Chip 8 interpreter (contains font set in emu)
    /// - `0x000-0x050` - Used for the built in `4x5` pixel font set (`0-F`)
    /// - `0x200-0xFFF` - Program ROM and work RAM
    pub(super) memory: Vec<u8>,
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions. In an addition operation, `VF` is the carry flag, while in subtraction, it
    /// is the "no borrow" flag. In the draw instruction `VF` is set upon pixel collision.
    pub(super) registers: [u8; cpu::register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`
    pub(super) index_register: u16,
    /// The program counter is a CPU register in the computer processor which has the address of the
    /// next instruction to be executed from memory.
    pub(super) program_counter: usize,
    /// The stack is only used to store return addresses when subroutines are called.
    pub(super) stack: [u16; cpu::stack::SIZE],
    /// Points to the next free slot of the stack.
    pub(super) stack_pointer: usize,
    /// Delay timer: This timer is intended to be used for timing the events of games. Its value
    /// can be set and read.
    pub(super) delay_timer: Timer<NoCallback>,
    /// Sound timer: This timer is used for sound effects. The callback is the buzzer.
    pub(super) sound_timer: Timer<S>,
    /// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
    /// `(64 x 32)`.
    pub(super) display: Box<Framebuffer>,
    /// Is set as soon as the display changes, the caller has to reset it.
    pub(super) redraw: bool,
    pub(super) keyboard: Keyboard,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
}

impl ChipSet {
    /// will create a new chipset object, the buzzer only writes to the log
    pub fn new() -> Self {
        Self::with_callback(LogCallback)
    }
}

impl Default for ChipSet {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TimerCallback> ChipSet<S> {
    /// will create a new chipset, `callback` is run every time the sound timer runs out
    pub fn with_callback(callback: S) -> Self {
        let mut chip = Self {
            opcode: 0,
            memory: vec![0; memory::SIZE],
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER,
            stack: [0; cpu::stack::SIZE],
            stack_pointer: 0,
            delay_timer: Timer::new(0),
            sound_timer: Timer::with_callback(0, callback),
            display: Box::new([[0; display::WIDTH]; display::HEIGHT]),
            redraw: true,
            keyboard: Keyboard::new(),
            rng: Box::new(rand::rngs::OsRng),
        };
        chip.reset();
        chip
    }

    /// Replaces the random number generator used by `CXNN`.
    pub fn set_rng<R: RngCore + Send + 'static>(&mut self, rng: R) {
        self.rng = Box::new(rng);
    }

    /// Brings the chip back into the power on state, the font is written back into memory.
    pub fn reset(&mut self) {
        self.opcode = 0;
        self.memory.iter_mut().for_each(|byte| *byte = 0);
        self.memory[display::fontset::LOCATION
            ..(display::fontset::LOCATION + display::fontset::FONTSET.len())]
            .copy_from_slice(&display::fontset::FONTSET);

        self.registers = [0; cpu::register::SIZE];
        self.index_register = 0;
        self.program_counter = cpu::PROGRAM_COUNTER;
        self.stack = [0; cpu::stack::SIZE];
        self.stack_pointer = 0;
        self.delay_timer.set_value(0);
        self.sound_timer.set_value(0);
        self.clear_display();
        self.keyboard.reset();

        log::info!("chipset reset");
    }

    /// Writes the program into memory starting at the program start `0x200`.
    ///
    /// Nothing else is touched, so [`reset`](ChipSet::reset) has to be called before loading a
    /// new program.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        if program.len() >= cpu::PROGRAM_CAPACITY {
            return Err(LoadError::ProgramTooLarge {
                len: program.len(),
                capacity: cpu::PROGRAM_CAPACITY,
            });
        }

        self.memory[cpu::PROGRAM_COUNTER..(cpu::PROGRAM_COUNTER + program.len())]
            .copy_from_slice(program);

        log::info!("loaded program of {} bytes", program.len());
        Ok(())
    }

    /// will advance the program by a single step
    ///
    /// The timers are ticked even if the opcode failed. After an error the chip should not be
    /// stepped any further until it was reset.
    pub fn step(&mut self) -> Result<Operation, ProcessError> {
        let result = self.execute();
        self.delay_timer.tick();
        self.sound_timer.tick();

        if let Err(err) = &result {
            log::warn!("{}", err);
        }
        result
    }

    /// fetches, decodes and runs the opcode at the program counter
    fn execute(&mut self) -> Result<Operation, ProcessError> {
        self.opcode = opcode::build_opcode(&self.memory, self.program_counter)?;

        let instruction =
            Instruction::decode(self.opcode).ok_or(OpcodeError::UnknownOpcode {
                opcode: self.opcode,
                pc: self.program_counter,
            })?;

        self.calc(instruction)
    }

    /// Will write keyboard data into interncal keyboard representation.
    pub fn set_keyboard(&mut self, keys: &[bool]) {
        self.keyboard.set_mult(keys);
    }

    /// Will set the value of the given key
    pub fn set_key(&mut self, key: usize, to: bool) {
        self.keyboard.set_key(key, to)
    }

    /// Will get the current state of the keyboard
    pub fn get_keyboard(&self) -> &[bool] {
        self.keyboard.get_keys()
    }

    /// will return the sound timer
    pub fn get_sound_timer(&self) -> u8 {
        self.sound_timer.get_value()
    }

    /// will return the delay timer
    pub fn get_delay_timer(&self) -> u8 {
        self.delay_timer.get_value()
    }

    /// Will return the current display configuration
    pub fn get_display(&self) -> &Framebuffer {
        &self.display
    }

    /// Has the display changed since the flag was last cleared.
    pub fn framebuffer_changed(&self) -> bool {
        self.redraw
    }

    /// Marks the current frame as consumed.
    pub fn clear_framebuffer_changed(&mut self) {
        self.redraw = false;
    }

    pub fn get_registers(&self) -> &[u8] {
        &self.registers
    }

    pub fn get_memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn get_program_counter(&self) -> usize {
        self.program_counter
    }

    /// Takes a copy of all the registers.
    pub fn snapshot(&self) -> RegisterSnapshot {
        RegisterSnapshot {
            registers: self.registers,
            stack: self.stack,
            opcode: self.opcode,
            program_counter: self.program_counter as u16,
            index_register: self.index_register,
            stack_pointer: self.stack_pointer as u8,
            delay_timer: self.get_delay_timer(),
            sound_timer: self.get_sound_timer(),
        }
    }

    pub(super) fn clear_display(&mut self) {
        for row in self.display.iter_mut() {
            for pixel in row.iter_mut() {
                *pixel = 0;
            }
        }
        self.redraw = true;
    }

    /// Will push the current pointer to the stack
    /// stack_pointer is always one bigger then the
    /// entry it points to
    pub(super) fn push_stack(&mut self, pointer: usize) -> Result<(), StackError> {
        if self.stack_pointer == self.stack.len() {
            return Err(StackError::Full);
        }
        self.stack[self.stack_pointer] = pointer as u16;
        self.stack_pointer += 1;
        Ok(())
    }

    /// Will pop from the stack and zero the popped slot
    pub(super) fn pop_stack(&mut self) -> Result<usize, StackError> {
        if self.stack_pointer == 0 {
            return Err(StackError::Empty);
        }
        self.stack_pointer -= 1;
        let pointer = self.stack[self.stack_pointer];
        self.stack[self.stack_pointer] = 0;
        Ok(pointer as usize)
    }

    /// The memory range `I..I+len`, or an error if it doesn't fit into memory.
    pub(super) fn index_range(&self, len: usize) -> Result<Range<usize>, ProcessError> {
        let start = self.index_register as usize;
        let end = start + len;
        if end > self.memory.len() {
            Err(ProcessError::Memory {
                address: start.max(self.memory.len()),
            })
        } else {
            Ok(start..end)
        }
    }
}

impl<S: TimerCallback> ProgramCounter for ChipSet<S> {
    fn advance(&mut self, step: ProgramCounterStep) {
        self.program_counter = step.apply(self.program_counter);
    }
}

