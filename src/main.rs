//! quad-asm - CLI Entry Point
//!
//! Commands:
//! - `quad-asm asm <source>` - Assemble to a binary image
//! - `quad-asm run <program>` - Run an ASM file or binary image
//! - `quad-asm build <input> <binary> <log> <result>` - Assemble, save, run, dump
//! - `quad-asm disasm <binary>` - Disassemble a binary image

use clap::{Parser, Subcommand};
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quad-asm")]
#[command(version)]
#[command(about = "Assembler and interpreter for a four-instruction register/memory machine")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble source to a binary image
    Asm {
        /// Path to the source file
        source: String,
        /// Output image (default: source path with a .bin extension)
        #[arg(short, long)]
        output: Option<String>,
        /// Write the assembly log as JSON
        #[arg(short, long)]
        log: Option<String>,
    },
    /// Run a program to its end
    Run {
        /// Path to the ASM file or binary image to execute
        program: String,
        /// Write the final memory dump as JSON
        #[arg(short, long)]
        dump: Option<String>,
        /// Write the execution trace as JSON
        #[arg(short, long)]
        trace: Option<String>,
        /// Print the execution trace
        #[arg(short, long)]
        verbose: bool,
    },
    /// Assemble, save the image and log, run, and save the memory dump
    Build {
        /// Path to the source file
        input: String,
        /// Output binary image
        binary: String,
        /// Output assembly log (JSON)
        log: String,
        /// Output memory dump (JSON)
        result: String,
    },
    /// Disassemble a binary image to readable text
    Disasm {
        /// Path to the binary image
        image: String,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Asm { source, output, log }) => {
            assemble_file(&source, output, log);
        }
        Some(Commands::Run { program, dump, trace, verbose }) => {
            run_program(&program, dump, trace, verbose);
        }
        Some(Commands::Build { input, binary, log, result }) => {
            build(&input, &binary, &log, &result);
        }
        Some(Commands::Disasm { image }) => {
            disassemble_file(&image);
        }
        None => {
            println!("quad-asm v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", context, err);
    std::process::exit(1);
}

fn read_source(path: &str) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| fail("Failed to read file", e))
}

fn assemble_source(path: &str) -> quad::Assembly {
    let source = read_source(path);
    quad::assemble(&source).unwrap_or_else(|e| fail("Assembly error", e))
}

fn assemble_file(source_path: &str, output: Option<String>, log: Option<String>) {
    use quad::report::write_assembly_log;

    let out_path = output.unwrap_or_else(|| {
        Path::new(source_path)
            .with_extension("bin")
            .to_string_lossy()
            .into_owned()
    });

    let program = assemble_source(source_path);
    println!("Assembled {} instructions", program.len());

    if let Err(e) = quad::save_image(&out_path, &program.words) {
        fail("Failed to save image", e);
    }
    println!("Binary file saved to {}", out_path);

    if let Some(log_path) = log {
        if let Err(e) = write_assembly_log(&log_path, &program.log) {
            fail("Failed to save log", e);
        }
        println!("Log file saved to {}", log_path);
    }
}

fn run_program(path: &str, dump: Option<String>, trace: Option<String>, verbose: bool) {
    use quad::report::{write_memory_dump, write_trace};
    use quad::{load_image, Cpu};

    // Load program (either ASM or a binary image)
    let words: Vec<u32> = if path.ends_with(".asm") {
        let program = assemble_source(path);
        println!("Assembled {} instructions", program.len());
        program.words
    } else {
        let words = load_image(path).unwrap_or_else(|e| fail("Failed to load image", e));
        println!("Loaded {} instructions", words.len());
        words
    };

    let mut cpu = Cpu::new();
    let result = cpu.run(&words);

    if verbose {
        for entry in cpu.log() {
            println!("{}", entry);
        }
    }

    if let Some(trace_path) = trace {
        if let Err(e) = write_trace(&trace_path, cpu.log()) {
            fail("Failed to save trace", e);
        }
        println!("Trace saved to {}", trace_path);
    }

    if let Err(e) = result {
        fail("Runtime error", e);
    }
    println!("Executed {} instructions", cpu.cycles);

    if let Some(dump_path) = dump {
        if let Err(e) = write_memory_dump(&dump_path, &cpu.snapshot()) {
            fail("Failed to save memory dump", e);
        }
        println!("Memory dump saved to {}", dump_path);
    }
}

fn build(input: &str, binary: &str, log: &str, result: &str) {
    use quad::report::{write_assembly_log, write_memory_dump};
    use quad::Cpu;

    let program = assemble_source(input);

    if let Err(e) = quad::save_image(binary, &program.words) {
        fail("Failed to save image", e);
    }
    println!("Binary file saved to {}", binary);

    if let Err(e) = write_assembly_log(log, &program.log) {
        fail("Failed to save log", e);
    }
    println!("Log file saved to {}", log);

    let mut cpu = Cpu::new();
    if let Err(e) = cpu.run(&program.words) {
        fail("Runtime error", e);
    }

    if let Err(e) = write_memory_dump(result, &cpu.snapshot()) {
        fail("Failed to save memory dump", e);
    }
    println!("Memory dump saved to {}", result);
}

fn disassemble_file(image_path: &str) {
    use quad::{disassemble, load_image};

    let words = load_image(image_path).unwrap_or_else(|e| fail("Failed to load image", e));
    println!("{}", disassemble(&words));
}
