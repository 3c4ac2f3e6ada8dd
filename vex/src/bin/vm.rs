#[macro_use]
extern crate clap;

use clap::Arg;
use std::process;

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("PROGRAM")
                .help("The .bc file to execute")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("memory")
                .short("m")
                .long("memory")
                .takes_value(true)
                .value_name("SIZE")
                .default_value("1024")
                .help("Sets the size of the VM's memory, in bytes"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Traces every dispatched instruction at the `trace` log level"),
        )
        .get_matches();

    if matches.is_present("verbose") {
        std::env::set_var("RUST_LOG", "trace");
    }
    env_logger::init();

    let memory_size = value_t!(matches.value_of("memory"), usize).unwrap_or_else(|e| e.exit());
    let program = matches.value_of("PROGRAM").unwrap();

    match vex::run_file(program, memory_size) {
        Ok((_processor, status)) => process::exit(status as i32),
        Err(err) => {
            eprintln!("vm: {}", err);
            process::exit(1);
        }
    }
}
