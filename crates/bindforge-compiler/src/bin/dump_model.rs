//! Debug script to see what the front-ends produce for a file.

use std::path::Path;

use bindforge_compiler::{Compiler, CompilerConfig};

fn main() {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: dump_model <file.h|file.pas>");
        std::process::exit(2);
    };

    let config = CompilerConfig {
        continue_on_errors: true,
        ..CompilerConfig::default()
    };
    let compiler = Compiler::new(config);

    match compiler.inspect(Path::new(&path)) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            println!("Error: {:?}", e);
            std::process::exit(1);
        }
    }
}
