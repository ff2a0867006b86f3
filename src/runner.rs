use crate::{
    chip8::ChipSet,
    devices::{DisplayCommands, KeyboardCommands},
    timer::TimerCallback,
    ProcessError,
};

/// Drives the chip for up to `cycles` steps.
///
/// Before every step the keyboard state is copied into the chip, after every step that
/// changed the framebuffer the display gets the new frame. The run stops at the first failing
/// step and returns its error.
pub fn run<S, D, K>(
    chip: &mut ChipSet<S>,
    display: &mut D,
    keyboard: &K,
    cycles: u64,
) -> Result<(), ProcessError>
where
    S: TimerCallback,
    D: DisplayCommands,
    K: KeyboardCommands,
{
    for cycle in 0..cycles {
        chip.set_keyboard(&keyboard.get_keyboard());

        if let Err(err) = chip.step() {
            log::warn!("stopped after {} cycles", cycle);
            return Err(err);
        }

        if chip.framebuffer_changed() {
            /* draw the screen */
            display.display(chip.get_display());
            chip.clear_framebuffer_changed();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        definitions::keyboard,
        devices::{MockDisplayCommands, MockKeyboardCommands},
        error::OpcodeError,
        timer::NoCallback,
    };

    fn setup_chip(program: &[u8]) -> ChipSet<NoCallback> {
        let mut chip = ChipSet::with_callback(NoCallback);
        chip.load_program(program).unwrap();
        chip.clear_framebuffer_changed();
        chip
    }

    fn idle_keyboard() -> MockKeyboardCommands {
        let mut board = MockKeyboardCommands::new();
        board
            .expect_get_keyboard()
            .return_const([false; keyboard::SIZE]);
        board
    }

    #[test]
    fn test_run_draws_on_change() {
        // clear, draw the `0` glyph, loop
        let mut chip = setup_chip(&[0x00, 0xE0, 0xD0, 0x05, 0x12, 0x04]);

        let mut display = MockDisplayCommands::new();
        display
            .expect_display()
            .withf(|pixels| pixels.iter().flatten().all(|&p| p == 0))
            .times(1)
            .return_const(());
        display
            .expect_display()
            .withf(|pixels| pixels[0][..4] == [1u8, 1, 1, 1])
            .times(1)
            .return_const(());

        assert_eq!(Ok(()), run(&mut chip, &mut display, &idle_keyboard(), 20));
        assert!(!chip.framebuffer_changed());
    }

    #[test]
    fn test_run_stops_on_error() {
        let mut chip = setup_chip(&[0x60, 0x01, 0xFF, 0xFF, 0x61, 0x01]);

        let mut display = MockDisplayCommands::new();
        display.expect_display().never();

        assert_eq!(
            Err(ProcessError::Opcode(OpcodeError::UnknownOpcode {
                opcode: 0xFFFF,
                pc: 0x202
            })),
            run(&mut chip, &mut display, &idle_keyboard(), 10)
        );
        assert_eq!(1, chip.get_registers()[0]);
        assert_eq!(0, chip.get_registers()[1]);
    }

    #[test]
    fn test_run_forwards_keyboard() {
        // wait for a key, then loop forever
        let mut chip = setup_chip(&[0xF3, 0x0A, 0x12, 0x02]);

        let mut keys = [false; keyboard::SIZE];
        keys[0x7] = true;
        let mut board = MockKeyboardCommands::new();
        board.expect_get_keyboard().times(4).return_const(keys);

        let mut display = MockDisplayCommands::new();
        display.expect_display().never();

        assert_eq!(Ok(()), run(&mut chip, &mut display, &board, 4));
        assert_eq!(0x7, chip.get_registers()[0x3]);
        assert_eq!(0x202, chip.get_program_counter());
    }

    #[test]
    fn test_run_zero_cycles() {
        let mut chip = setup_chip(&[0x00, 0xE0]);

        let mut board = MockKeyboardCommands::new();
        board.expect_get_keyboard().never();
        let mut display = MockDisplayCommands::new();
        display.expect_display().never();

        assert_eq!(Ok(()), run(&mut chip, &mut display, &board, 0));
        assert_eq!(0x200, chip.get_program_counter());
    }
}
