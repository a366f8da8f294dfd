use std::{env, fs, path::Path, process};

use poly::bytecode::CodeBuffer;
use poly::bytecode::disasm::print_code;
use poly::lexer::Lexer;
use poly::token_dumper::TokenDumper;
use poly::{Config, Error, Vm};

struct Options {
    tokens_only: bool,
    no_color: bool,
    bytecode: bool,
    load: bool,
    emit: Option<String>,
    config: Option<String>,
    inline: Option<String>,
    filename: Option<String>,
}

fn main() {
    if let Err(e) = simple_logger::SimpleLogger::new().env().init() {
        eprintln!("Failed to install logger: {}", e);
    }

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    let options = match parse_args(&args) {
        Some(options) => options,
        None => {
            print_usage();
            // FreeBSD EX_USAGE
            process::exit(64);
        }
    };

    let config = match &options.config {
        Some(path) => Config::load(Path::new(path)).unwrap_or_else(|e| fail(e)),
        None => Config::default(),
    };

    let source = match (&options.inline, &options.filename) {
        (Some(source), _) => source.clone(),
        (None, Some(filename)) if options.load => {
            run_encoded(filename, config);
            return;
        }
        (None, Some(filename)) => {
            ensure_extension(filename);
            fs::read_to_string(filename)
                .unwrap_or_else(|e| fail(format!("Failed to read '{}': {}", filename, e)))
        }
        (None, None) => {
            print_usage();
            process::exit(64);
        }
    };

    if options.tokens_only {
        dump_tokens(&source, &config, options.no_color);
        return;
    }

    run_program(&source, config, &options);
}

fn parse_args(args: &[String]) -> Option<Options> {
    let mut options = Options {
        tokens_only: false,
        no_color: false,
        bytecode: false,
        load: false,
        emit: None,
        config: None,
        inline: None,
        filename: None,
    };

    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--tokens" => options.tokens_only = true,
            "--no-color" => options.no_color = true,
            "--bc" | "--bytecode" => options.bytecode = true,
            "--load" => options.load = true,
            "--emit" => options.emit = Some(args.next()?.clone()),
            "--config" => options.config = Some(args.next()?.clone()),
            "-e" => options.inline = Some(args.next()?.clone()),
            flag if flag.starts_with('-') => return None,
            // first non-flag argument is the filename
            name if options.filename.is_none() => options.filename = Some(name.to_string()),
            _ => return None,
        }
    }

    Some(options)
}

fn print_usage() {
    println!("POLY - small indentation-sensitive scripting language");
    println!();
    println!("Usage:");
    println!("  poly <file.poly>               Run a program and print its variables");
    println!("  poly -e <source>               Run inline source");
    println!("  poly --tokens <file.poly>      Show tokens only (--no-color for plain text)");
    println!("  poly --bc <file.poly>          Print bytecode before running");
    println!("  poly --emit <out> <file.poly>  Write encoded bytecode to <out>");
    println!("  poly --load <file>             Run previously emitted bytecode");
    println!("  poly --config <file.yaml> ...  Override VM capacities and limits");
    println!("  poly --help, -h                Show this help");
}

fn ensure_extension(filename: &str) {
    let path = Path::new(filename);
    if path.extension().and_then(|e| e.to_str()) != Some("poly") {
        fail(format!("Error: expected a .poly file, got {}", filename));
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn dump_tokens(source: &str, config: &Config, no_color: bool) {
    match Lexer::with_capacity(source, config.initial_capacity).tokenize() {
        Ok(tokens) => {
            let mut dumper = TokenDumper::new();
            if no_color {
                dumper = dumper.no_color();
            }
            dumper.dump(tokens.as_slice());
        }
        Err(e) => fail(Error::from(e)),
    }
}

fn run_program(source: &str, config: Config, options: &Options) {
    let mut vm = Vm::with_config(config);

    let code = vm.compile(source).unwrap_or_else(|e| fail(e));

    if options.bytecode {
        print_code(&code);
    }

    if let Some(out) = &options.emit {
        write_encoded(&code, out);
    }

    if let Err(e) = vm.run(&code) {
        fail(Error::from(e));
    }
    print_variables(&vm);
}

fn write_encoded(code: &CodeBuffer, out: &str) {
    let bytes = code.encode().unwrap_or_else(|e| fail(e));
    if let Err(e) = fs::write(out, &bytes) {
        fail(format!("Failed to write '{}': {}", out, e));
    }
    log::info!("wrote {} bytes of bytecode to {}", bytes.len(), out);
}

fn run_encoded(filename: &str, config: Config) {
    let bytes = fs::read(filename)
        .unwrap_or_else(|e| fail(format!("Failed to read '{}': {}", filename, e)));

    let mut vm = Vm::with_config(config);
    if let Err(e) = vm.run_encoded(&bytes) {
        fail(Error::from(e));
    }
    print_variables(&vm);
}

/// Prints the top-level scope, one `name = value` per line, sorted by name.
fn print_variables(vm: &Vm) {
    let mut variables: Vec<_> = vm.variables(0).collect();
    variables.sort_by(|a, b| a.identifier.cmp(&b.identifier));

    for var in variables {
        println!("{} = {}", var.identifier, var.value);
    }
}
