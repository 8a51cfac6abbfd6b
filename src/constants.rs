// Address space layout. Regions are contiguous and cover 0x0000-0xFFFF exactly.

pub const ZP_START: u16 = 0x0000;
pub const ZP_SIZE: usize = 0x0100;

// The stack grows downward from STACK_TOP towards STACK_END.
pub const STACK_END: u16 = 0x0100;
pub const STACK_SIZE: usize = 0x0100;
pub const STACK_TOP: u16 = 0x0200;

pub const IO_START: u16 = 0x0200;
pub const IO_SIZE: usize = 0x0100;

pub const FREE_1_START: u16 = 0x0300;
pub const FREE_1_SIZE: usize = 0x0100;

pub const ROM_START: u16 = 0x0400;
pub const ROM_SIZE: usize = 0x4000;

pub const BANK_ROM_START: u16 = 0x4400;
pub const BANK_ROM_SIZE: usize = 0x2000;

pub const CART_DATA_START: u16 = 0x6400;
pub const CART_DATA_SIZE: usize = 0x0400;

pub const RAM_START: u16 = 0x6800;
pub const RAM_SIZE: usize = 0x6000;

pub const VRAM_START: u16 = 0xC800;
pub const VRAM_SIZE: usize = 0x0400;

pub const SPRITE_TABLE_START: u16 = 0xCC00;
pub const SPRITE_TABLE_SIZE: usize = 0x0200;

pub const SID_START: u16 = 0xCE00;
pub const SID_SIZE: usize = 0x1000;

pub const FREE_2_START: u16 = 0xDE00;
pub const FREE_2_SIZE: usize = 0x0200;

pub const KERNEL_START: u16 = 0xE000;
pub const KERNEL_SIZE: usize = 0x2000;

// Interrupt registers and vector table live in the I/O page.
pub const IF_OFFSET: u16 = IO_START;
pub const IE_OFFSET: u16 = IO_START + 0x01;
pub const INTERRUPT_VECTOR_OFFSET: u16 = IO_START + 0x10;
pub const INTERRUPT_LINES: u8 = 8;

pub const VBLANK_INTERRUPT: u8 = 0;

pub const BOOT_PC: u16 = ROM_START;
pub const BOOT_SP: u16 = STACK_TOP - 2;

pub const DEFAULT_CLOCK_HZ: u64 = 4_194_304;
pub const DEFAULT_FRAME_RATE: u64 = 60;
