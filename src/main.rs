use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use micro8::builder::{ProgramBuilder, RandomProgramConfig, parse_hex};
use micro8::decoder::disassemble;
use micro8::error::{BusinessError, Result};
use micro8::memory::Address;
use micro8::{Executed, Processor};

#[derive(Parser)]
#[command(name = "micro8", version, about = "Educational 8-bit microprocessor emulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a program and run it to completion.
    Run {
        /// Program file (raw bytes unless --hex is given).
        file: PathBuf,
        /// Read the file as whitespace-separated hex bytes.
        #[arg(long)]
        hex: bool,
        /// Print every executed instruction and the resulting state.
        #[arg(long)]
        trace: bool,
    },
    /// Print the disassembly of a program.
    Disasm {
        file: PathBuf,
        #[arg(long)]
        hex: bool,
    },
    /// Step through a program interactively, reading commands from stdin.
    Debug {
        file: PathBuf,
        #[arg(long)]
        hex: bool,
    },
    /// Generate a random program, disassemble it and run it.
    Random {
        /// Random seed for reproducibility.
        #[arg(long)]
        seed: u64,
        /// Number of instructions to generate.
        #[arg(long, default_value_t = 16)]
        instructions: usize,
        #[arg(long)]
        trace: bool,
    },
}

enum MsgColor {
    Green,
    Cyan,
    Red,
}

fn message(color: MsgColor, left: &str, right: &str) {
    let left = match color {
        MsgColor::Green => left.green(),
        MsgColor::Cyan => left.cyan(),
        MsgColor::Red => left.red(),
    };
    eprintln!("{left:>12} {right}");
}

fn read_program(path: &Path, hex: bool) -> Result<Vec<u8>> {
    let program = if hex {
        parse_hex(&fs::read_to_string(path)?)?
    } else {
        fs::read(path)?
    };
    if program.is_empty() {
        return Err(BusinessError::EmptyProgram.into());
    }
    Ok(program)
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = dispatch(cli.command) {
        message(MsgColor::Red, "Error", &err.to_string());
        std::process::exit(1);
    }
}

fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Run { file, hex, trace } => {
            message(MsgColor::Green, "Loading", &file.display().to_string());
            let program = read_program(&file, hex)?;
            run_program(&program, trace)
        }
        Command::Disasm { file, hex } => {
            let program = read_program(&file, hex)?;
            print!("{}", disassemble(&program));
            Ok(())
        }
        Command::Debug { file, hex } => {
            message(MsgColor::Green, "Loading", &file.display().to_string());
            let program = read_program(&file, hex)?;
            debug(&program)
        }
        Command::Random {
            seed,
            instructions,
            trace,
        } => {
            let config = RandomProgramConfig { instructions, seed };
            let program = ProgramBuilder::random(&config).build()?;
            message(MsgColor::Green, "Generated", &format!("{} bytes (seed {seed})", program.len()));
            print!("{}", disassemble(&program));
            run_program(&program, trace)
        }
    }
}

fn run_program(program: &[u8], trace: bool) -> Result<()> {
    let mut cpu = Processor::new();
    cpu.load_program(program)?;

    message(MsgColor::Green, "Running", &format!("{} bytes", program.len()));
    if trace {
        cpu.start();
        while cpu.has_next() {
            let executed = cpu.step().inspect_err(|_| cpu.stop())?;
            println!("{:<24} {cpu}", executed.instruction().to_string());
        }
        cpu.stop();
    } else {
        cpu.run()?;
    }

    message(MsgColor::Cyan, "Halted", "");
    println!("{cpu}");
    for (addr, value) in cpu.memory().occupied() {
        println!("  mem[{addr}] = {value}");
    }
    Ok(())
}

const DEBUG_HELP: &str = "\
commands:
  step | s        execute the next instruction
  undo | u        undo the last executed instruction
  run  | r        execute every remaining instruction
  regs            show accumulators, counter and status
  mem ADDR        show one data memory cell
  reset           zero registers, counter and memory
  help            show this message
  quit | q        leave the debugger";

fn debug(program: &[u8]) -> Result<()> {
    let mut cpu = Processor::new();
    cpu.load_program(program)?;
    cpu.start();
    let mut history: Vec<Executed> = Vec::new();

    message(MsgColor::Cyan, "Help", "type `help` for commands");
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();
    loop {
        print!("(micro8) ");
        stdout.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };

        let outcome = match command {
            "step" | "s" => cpu.step().map(|executed| {
                println!("{}", executed.instruction());
                history.push(executed);
            }),
            "undo" | "u" => {
                match history.pop() {
                    Some(executed) => {
                        executed.undo(&mut cpu);
                        println!("undid {}", executed.instruction());
                    }
                    None => println!("nothing to undo"),
                }
                Ok(())
            }
            "run" | "r" => run_remaining(&mut cpu, &mut history),
            "regs" => {
                println!("{cpu}");
                Ok(())
            }
            "mem" => show_memory(&cpu, words.next()),
            "reset" => {
                cpu.reset();
                history.clear();
                Ok(())
            }
            "help" => {
                println!("{DEBUG_HELP}");
                Ok(())
            }
            "quit" | "q" => break,
            other => {
                println!("unknown command `{other}`");
                Ok(())
            }
        };

        // Errors are reported and the session continues.
        if let Err(err) = outcome {
            message(MsgColor::Red, "Error", &err.to_string());
        }
    }
    cpu.stop();
    Ok(())
}

fn run_remaining(cpu: &mut Processor, history: &mut Vec<Executed>) -> Result<()> {
    while cpu.has_next() {
        let executed = cpu.step()?;
        history.push(executed);
    }
    message(MsgColor::Cyan, "Halted", "");
    println!("{cpu}");
    Ok(())
}

fn show_memory(cpu: &Processor, arg: Option<&str>) -> Result<()> {
    let Some(arg) = arg else {
        println!("usage: mem ADDR");
        return Ok(());
    };
    let addr = match arg.parse::<usize>() {
        Ok(n) => Address::new(n)?,
        Err(_) => {
            println!("invalid address `{arg}`");
            return Ok(());
        }
    };
    println!("mem[{addr}] = {}", cpu.data(addr));
    Ok(())
}
