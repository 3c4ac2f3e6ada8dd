#[macro_use]
extern crate clap;

use clap::Arg;
use std::fs;
use std::path::Path;
use std::process;

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("The .asm source file to assemble")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Traces the assembled bytecode, disassembled, at the `trace` log level"),
        )
        .get_matches();

    if matches.is_present("verbose") {
        std::env::set_var("RUST_LOG", "trace");
    }
    env_logger::init();

    let input_path = matches.value_of("INPUT").unwrap();

    let source = fs::read_to_string(input_path).unwrap_or_else(|err| {
        eprintln!("vasm: failed to read \"{}\": {}", input_path, err);
        process::exit(1);
    });

    let bytecode = vasm::assemble(&source).unwrap_or_else(|err| {
        eprintln!("vasm: {}", err);
        process::exit(1);
    });

    match vcpu::disassemble::disassemble(&bytecode) {
        Ok(instructions) => {
            for instruction in &instructions {
                log::trace!("{}", vcpu::disassemble::render(std::slice::from_ref(instruction)).trim_end());
            }
        }
        Err(err) => log::warn!("verbose trace failed: {}", err),
    }

    // The output file lands in the current directory under its own stem, regardless of which
    // directory the input came from.
    let stem = Path::new(input_path)
        .file_stem()
        .unwrap_or_else(|| std::ffi::OsStr::new("out"));
    let output_path = Path::new(stem).with_extension("bc");
    if let Err(err) = vexfile::write_file(&output_path, &bytecode) {
        eprintln!(
            "vasm: failed to write \"{}\": {}",
            output_path.display(),
            err
        );
        process::exit(1);
    }
}
