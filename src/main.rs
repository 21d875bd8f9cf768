use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: mica <input.mica>");
        process::exit(1);
    }

    match mica::assemble_file(&args[1]) {
        Ok(module) => print!("{}", module),
        Err(err) => {
            eprintln!("{}: {}", args[1], err);
            process::exit(1);
        }
    }
}
