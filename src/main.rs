use log::debug;
use std::{fs, io::Read, process};

use predictive_parser::{ErrorEntries, Grammar, Parser, Token};

fn print_help() {
    println!("Usage: predictive-parser outputs [options] [grammar file]");
    println!("outputs:");
    println!("  prod: Productions");
    println!("  ff: First and follow sets");
    println!("  ll1: LL(1) parsing table");
    println!("  tree: Parse tree of the tokens given with -t");
    println!("options:");
    println!("  -h: Print this help");
    println!("  -l: Print in LaTeX format");
    println!("  -j: Print in JSON format");
    println!("  -e <file>: Error entries used for syntax error messages");
    println!("  -t <file>: Tokens to parse, as a JSON array");
    println!("  -s <file>: Source the tokens came from, quoted in syntax errors");
}

enum OutputFormat {
    Plain,
    LaTeX,
    JSON,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn read_file(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| fail(format!("{}: {}", path, e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| fail(e))
}

fn main() {
    pretty_env_logger::init();

    let mut outputs: Vec<&str> = Vec::new();
    let args = std::env::args().skip(1).collect::<Vec<String>>();
    let mut i: usize = 0;
    while i < args.len() && ["prod", "ff", "ll1", "tree"].contains(&args[i].as_str()) {
        outputs.push(args[i].as_str());
        i += 1;
    }

    let mut output_format = OutputFormat::Plain;
    let mut error_entries_path: Option<&str> = None;
    let mut tokens_path: Option<&str> = None;
    let mut source_path: Option<&str> = None;

    while i < args.len() && ["-h", "--help", "-l", "-j", "-e", "-t", "-s"].contains(&args[i].as_str()) {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return;
            }
            "-l" => output_format = OutputFormat::LaTeX,
            "-j" => output_format = OutputFormat::JSON,
            flag => {
                i += 1;
                let value = match args.get(i) {
                    Some(value) => value.as_str(),
                    None => fail(format!("missing file after {}", flag)),
                };
                match flag {
                    "-e" => error_entries_path = Some(value),
                    "-t" => tokens_path = Some(value),
                    _ => source_path = Some(value),
                }
            }
        }
        i += 1;
    }

    if i + 1 < args.len() || outputs.is_empty() {
        print_help();
        return;
    }

    let input: String = if i == args.len() {
        let mut input = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut input) {
            fail(e);
        }
        input
    } else {
        read_file(args[i].as_str())
    };

    let g = Grammar::parse(&input).unwrap_or_else(|e| fail(e));
    let ff = g.calculate_first_follow().unwrap_or_else(|e| fail(e));

    for output in outputs {
        match output {
            "prod" => {
                let t = g.to_production_output_vec();
                println!(
                    "{}",
                    match output_format {
                        OutputFormat::Plain => t.to_plaintext(),
                        OutputFormat::LaTeX => t.to_latex(),
                        OutputFormat::JSON => to_json(&t),
                    }
                );
            }
            "ff" => {
                let t = g.to_non_terminal_output_vec(&ff);
                println!(
                    "{}",
                    match output_format {
                        OutputFormat::Plain => t.to_plaintext(),
                        OutputFormat::LaTeX => t.to_latex(),
                        OutputFormat::JSON => t.to_json(),
                    }
                );
            }
            "ll1" => {
                let table = g
                    .generate_ll1_parsing_table(&ff)
                    .unwrap_or_else(|e| fail(e));
                let t = g.to_ll1_table_output(&table);
                println!(
                    "{}",
                    match output_format {
                        OutputFormat::Plain => t.to_plaintext(),
                        OutputFormat::LaTeX => t.to_latex(),
                        OutputFormat::JSON => to_json(&t),
                    }
                );
            }
            "tree" => {
                let path = tokens_path.unwrap_or_else(|| fail("tree requires -t <file>"));
                let tokens: Vec<Token> =
                    serde_json::from_str(&read_file(path)).unwrap_or_else(|e| fail(e));
                let mut parser = Parser::new(g.clone()).unwrap_or_else(|e| fail(e));
                if let Some(path) = error_entries_path {
                    parser.set_error_entries(ErrorEntries::parse(&read_file(path)));
                }
                debug!("parsing {} tokens from {}", tokens.len(), path);
                let tree = parser.parse(&tokens).unwrap_or_else(|e| match source_path {
                    Some(source) => fail(e.render(&read_file(source))),
                    None => fail(e),
                });
                match output_format {
                    OutputFormat::JSON => println!("{}", to_json(&tree.to_output())),
                    _ => print!("{}", tree),
                }
            }
            _ => unreachable!(),
        }
    }
}
