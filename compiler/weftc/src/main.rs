//! Weft CLI
//!
//! Lexes sample-language files and prints their token lists.

use weft_lexer::LexerConfig;
use weftc::commands::{lex_file, parse_lex_options, print_language_paths, CommandError};

fn main() {
    weftc::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    let result = match command.as_str() {
        "lex" => {
            if args.len() < 3 {
                eprintln!("Usage: weft lex <file> [options]");
                std::process::exit(1);
            }
            parse_lex_options(&args[3..], LexerConfig::from_env())
                .and_then(|options| lex_file(&args[2], &options))
        }
        "paths" => {
            if args.len() < 3 {
                eprintln!("Usage: weft paths <mime-type>");
                std::process::exit(1);
            }
            print_language_paths(&args[2])
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        "version" | "--version" | "-v" => {
            println!("weft {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(error) = result {
        report(&error);
        std::process::exit(1);
    }
}

fn report(error: &CommandError) {
    eprintln!("error: {error}");
}

fn print_usage() {
    println!("Weft incremental lexer");
    println!();
    println!("Usage: weft <command> [options]");
    println!();
    println!("Commands:");
    println!("  lex <file>           Tokenize a file and display its tokens");
    println!("  paths <mime-type>    List the language paths reachable by embedding");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Lex options:");
    println!("  --lang=<mime-type>        Input language (default: by extension)");
    println!("  --embedded, -e            Also display embedded language tokens");
    println!("  --maintain-la-state       Keep lexer states of every token");
    println!("  --no-flyweights           Store every token as a regular token");
    println!("  --max-fly-sequence=<n>    Longest run of shared flyweight tokens");
    println!();
    println!("Environment:");
    println!("  WEFT_MAINTAIN_LA_STATE    true/1 to keep lexer states");
    println!("  WEFT_MAX_FLY_SEQUENCE     Longest flyweight run (default: 5)");
    println!("  RUST_LOG                  Enable tracing output");
    println!();
    println!("Examples:");
    println!("  weft lex page.wm --embedded");
    println!("  weft lex main.ws --lang=text/x-script");
    println!("  weft paths text/x-markup");
}
