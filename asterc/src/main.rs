mod cli;
mod rlpl;
mod rppl;

use std::{path::PathBuf, rc::Rc};

use clap::Parser;

use aster_core::{
    analyzer::{analyze, analyze_from_stream},
    codegen::prelude::generate,
    environment::prelude::Value,
    eval::prelude::Interpreter,
    utils::prelude::{Error, Warning, WarningEmitterIO},
};
use cli::{
    print_analyzed, print_analyzing, print_running, print_transpiled, print_transpiling,
};

#[derive(Parser)]
enum Command {
    /// Performs lexical, syntactical and semantical analysis
    Check {
        /// Path of source file
        path: PathBuf,
        /// Print the tree instead of the parsed source code
        #[arg(long, default_value_t = false)]
        print_ast: bool,
    },
    /// Analyzes the program, then interprets it; main's result becomes
    /// the exit status
    Run {
        /// Path of source file
        path: PathBuf,
    },
    /// Analyzes the program and emits equivalent Java source
    Transpile {
        /// Path of source file
        path: PathBuf,
        /// Path of the emitted Java file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Runs Read Lex Print Loop
    Rlpl,
    /// Runs Read Parse Print Loop
    Rppl,
}

fn main() {
    match Command::parse() {
        Command::Check { path, print_ast } => {
            let warning_emitter = Rc::new(ConsoleWarningEmitter);

            let buf_writer = cli::stderr_buffer_writer();
            let mut buf = buf_writer.buffer();

            print_analyzing(&path.to_string_lossy());
            let start = std::time::Instant::now();

            match analyze_from_stream(path, warning_emitter) {
                Ok(source) => {
                    if print_ast {
                        println!("{source:#?}");
                    } else {
                        println!("{source}");
                    }
                },
                Err(error) => {
                    error.pretty(&mut buf);
                    buf_writer.print(&buf).expect("write error to stderr");
                },
            }

            print_analyzed(std::time::Instant::now() - start);
        },
        Command::Run { path } => {
            let warning_emitter = Rc::new(ConsoleWarningEmitter);

            let buf_writer = cli::stderr_buffer_writer();
            let mut buf = buf_writer.buffer();

            print_analyzing(&path.to_string_lossy());
            let start = std::time::Instant::now();

            let source = match analyze_from_stream(path.clone(), warning_emitter) {
                Ok(source) => source,
                Err(error) => {
                    error.pretty(&mut buf);
                    buf_writer.print(&buf).expect("write error to stderr");
                    std::process::exit(1);
                },
            };

            print_analyzed(std::time::Instant::now() - start);
            print_running(&path.to_string_lossy());

            match Interpreter::new().interpret(&source) {
                Ok(value) => {
                    let code = match value {
                        Value::Integer(value) => i32::try_from(value).unwrap_or(1),
                        _ => 0,
                    };
                    std::process::exit(code);
                },
                Err(error) => {
                    Error::Runtime { error }.pretty(&mut buf);
                    buf_writer.print(&buf).expect("write error to stderr");
                    std::process::exit(1);
                },
            }
        },
        Command::Transpile { path, output } => {
            let warning_emitter = Rc::new(ConsoleWarningEmitter);

            let buf_writer = cli::stderr_buffer_writer();
            let mut buf = buf_writer.buffer();

            print_transpiling(&path.to_string_lossy());
            let start = std::time::Instant::now();

            let source = match analyze(path, warning_emitter) {
                Ok(source) => source,
                Err(error) => {
                    error.pretty(&mut buf);
                    buf_writer.print(&buf).expect("write error to stderr");
                    std::process::exit(1);
                },
            };

            let java = generate(&source);

            match output {
                Some(output) => {
                    if let Err(error) = std::fs::write(&output, java) {
                        let error = Error::StdIo { err: error.kind() };
                        error.pretty(&mut buf);
                        buf_writer.print(&buf).expect("write error to stderr");
                        std::process::exit(1);
                    }
                },
                None => println!("{java}"),
            }

            print_transpiled(std::time::Instant::now() - start);
        },
        Command::Rlpl => {
            let _ = rlpl::start();
        },
        Command::Rppl => {
            let _ = rppl::start();
        },
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConsoleWarningEmitter;

impl WarningEmitterIO for ConsoleWarningEmitter {
    fn emit_warning(&self, warning: Warning) {
        let buffer_writer = cli::stderr_buffer_writer();
        let mut buffer = buffer_writer.buffer();
        warning.pretty(&mut buffer);
        buffer_writer
            .print(&buffer)
            .expect("write warning to stderr");
    }
}
