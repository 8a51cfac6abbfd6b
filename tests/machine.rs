use riku::constants::{IE_OFFSET, INTERRUPT_VECTOR_OFFSET, RAM_START, ROM_START};
use riku::{Config, CpuError, Flags, Machine, SaveState};

fn config() -> Config {
    Config {
        clock_hz: 1200,
        frame_rate: 60,
        ..Config::default()
    }
}

#[test]
fn vblank_handler_runs_each_frame() {
    let mut machine = Machine::new(&config()).unwrap();
    // Main loop: NOPs. Handler in RAM: LDA #$00 ; RTS
    machine.load_program(&[0x00; 64]).unwrap();
    {
        let bus = machine.bus_mut();
        bus.write(IE_OFFSET, 0x01).unwrap();
        bus.write16(INTERRUPT_VECTOR_OFFSET, RAM_START).unwrap();
        bus.write(RAM_START, 0xA9).unwrap();
        bus.write(RAM_START + 1, 0x00).unwrap();
        bus.write(RAM_START + 2, 0x60).unwrap();
    }

    let stats = machine.run_frame().unwrap();
    assert_eq!(stats.interrupt, Some(0));
    assert_eq!(machine.cpu().pc(), RAM_START);
    let return_pc = ROM_START + stats.instructions as u16;

    machine.step().unwrap();
    assert!(machine.cpu().flags().contains(Flags::ZERO));
    machine.step().unwrap();
    assert_eq!(machine.cpu().pc(), return_pc);
    assert_eq!(machine.cpu().stack_depth(), 0);
}

#[test]
fn strict_machine_halts_on_unknown_instruction() {
    let mut machine = Machine::new(&Config {
        strict: true,
        ..config()
    })
    .unwrap();
    machine.load_program(&[0xFF]).unwrap();

    assert!(matches!(
        machine.run_frame(),
        Err(CpuError::UnknownInstruction { opcode: 0xFF, .. })
    ));
    assert!(matches!(machine.step(), Err(CpuError::Halted { .. })));
}

#[test]
fn save_state_survives_a_file_round_trip() {
    let mut machine = Machine::new(&config()).unwrap();
    machine.load_program(&[0xA9, 0x7F, 0x00, 0x00]).unwrap();
    machine.run_frames(2).unwrap();
    machine.bus_mut().write(RAM_START + 0x10, 0xAB).unwrap();

    let path = std::env::temp_dir().join(format!("riku-machine-{}.state", std::process::id()));
    machine.save_state().save_to_file(&path).unwrap();
    let state = SaveState::load_from_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    let mut restored = Machine::new(&config()).unwrap();
    restored.load_program(&[0xA9, 0x7F, 0x00, 0x00]).unwrap();
    restored.restore_state(&state).unwrap();

    assert_eq!(restored.frame(), 2);
    assert_eq!(restored.cpu().registers(), machine.cpu().registers());
    assert_eq!(restored.cpu().cycles(), machine.cpu().cycles());
    assert_eq!(restored.bus().peek(RAM_START + 0x10), Some(0xAB));
}
