#[macro_use]
extern crate clap;

use clap::Arg;
use std::process;

fn main() {
    env_logger::init();

    let matches = app_from_crate!()
        .arg(
            Arg::with_name("PROGRAM")
                .help("The .bc file to disassemble")
                .required(true)
                .index(1),
        )
        .get_matches();

    let program = matches.value_of("PROGRAM").unwrap();

    match vex::disassemble_file(program) {
        Ok(text) => print!("{}", text),
        Err(err) => {
            eprintln!("disasm: {}", err);
            process::exit(1);
        }
    }
}
