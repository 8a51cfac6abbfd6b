use std::env;
use std::path::PathBuf;
use std::process;

use riku::config::{self, Config};
use riku::{Machine, SaveState};

fn parse_u16_hex_or_dec(s: &str) -> Option<u16> {
    let s = s.trim();
    if let Some(stripped) = s.strip_prefix("0x") {
        u16::from_str_radix(stripped, 16).ok()
    } else {
        s.parse::<u16>().ok()
    }
}

// ADDR or ADDR:LEN, LEN defaults to 16
fn parse_dump(s: &str) -> Option<(u16, usize)> {
    match s.split_once(':') {
        Some((addr, len)) => Some((
            parse_u16_hex_or_dec(addr)?,
            parse_u16_hex_or_dec(len)? as usize,
        )),
        None => Some((parse_u16_hex_or_dec(s)?, 16)),
    }
}

struct Args {
    image: PathBuf,
    dumps: Vec<(u16, usize)>,
    save_state: Option<PathBuf>,
    load_state: Option<PathBuf>,
}

fn usage(program: &str) {
    eprintln!(
        "Usage: {} [--frames N] [--strict] [--trace] [--dump ADDR[:LEN]] [--save-state PATH] [--load-state PATH] <image>",
        program
    );
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("riku");

    if args.len() < 2 || args.iter().any(|a| a == "--help" || a == "-h") {
        usage(program);
        process::exit(2);
    }

    let mut image = None;
    let mut dumps = Vec::new();
    let mut save_state = None;
    let mut load_state = None;
    let mut i = 1;

    let value = |i: usize, flag: &str| -> String {
        match args.get(i + 1) {
            Some(v) => v.clone(),
            None => {
                eprintln!("{} requires a value", flag);
                process::exit(2);
            }
        }
    };

    while i < args.len() {
        match args[i].as_str() {
            // Flags feed the same environment toggles Config::from_env reads.
            "--strict" => {
                env::set_var("RIKU_STRICT", "1");
                i += 1;
            }
            "--trace" => {
                env::set_var("RIKU_TRACE", "1");
                i += 1;
            }
            "--frames" => {
                env::set_var("RIKU_FRAMES", value(i, "--frames"));
                i += 2;
            }
            "--dump" => {
                let dump_arg = value(i, "--dump");
                match parse_dump(&dump_arg) {
                    Some(dump) => dumps.push(dump),
                    None => {
                        eprintln!("--dump: cannot parse '{}'", dump_arg);
                        process::exit(2);
                    }
                }
                i += 2;
            }
            "--save-state" => {
                save_state = Some(PathBuf::from(value(i, "--save-state")));
                i += 2;
            }
            "--load-state" => {
                load_state = Some(PathBuf::from(value(i, "--load-state")));
                i += 2;
            }
            s if s.starts_with('-') => {
                eprintln!("Unknown option: {}", s);
                process::exit(2);
            }
            s => {
                image = Some(PathBuf::from(s));
                i += 1;
            }
        }
    }

    let image = match image {
        Some(p) => p,
        None => {
            eprintln!("Image argument missing");
            usage(program);
            process::exit(2);
        }
    };

    Args {
        image,
        dumps,
        save_state,
        load_state,
    }
}

fn main() {
    let args = parse_args();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    log::debug!("{:?}", config);

    let image = match std::fs::read(&args.image) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Failed to read {}: {}", args.image.display(), e);
            process::exit(1);
        }
    };

    let mut machine = match Machine::new(&config) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Failed to build machine: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = machine.load_program(&image) {
        eprintln!("Failed to load {}: {}", args.image.display(), e);
        process::exit(1);
    }

    if let Some(path) = &args.load_state {
        let restored = SaveState::load_from_file(path)
            .map_err(|e| e.to_string())
            .and_then(|state| machine.restore_state(&state).map_err(|e| e.to_string()));
        if let Err(e) = restored {
            eprintln!("Failed to restore {}: {}", path.display(), e);
            process::exit(1);
        }
    }

    let mut exit_code = 0;
    for _ in 0..config.frames {
        if let Err(e) = machine.run_frame() {
            log::error!("Frame {} aborted: {}", machine.frame(), e);
            exit_code = 1;
            break;
        }
    }

    if !config::quiet() {
        println!(
            "frames={} cycles={} faults={}",
            machine.frame(),
            machine.cpu().cycles(),
            machine.bus().fault_count()
        );
        println!("{}", machine.cpu().registers().dump());
    }
    for &(address, len) in &args.dumps {
        println!("{}", machine.bus().inspect(address, len));
    }

    if let Some(path) = &args.save_state {
        if let Err(e) = machine.save_state().save_to_file(path) {
            eprintln!("Failed to write {}: {}", path.display(), e);
            exit_code = 1;
        }
    }

    if exit_code != 0 {
        process::exit(exit_code);
    }
}
