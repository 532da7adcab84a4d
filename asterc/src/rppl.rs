use std::io::Write;

use aster_core::parser::prelude::parse_source;

const PROMPT: &str = ">> ";

pub fn start() -> std::io::Result<()> {
    let stdin = std::io::stdin();

    loop {
        let mut input = String::new();

        print!("{}", PROMPT);
        std::io::stdout().flush()?;
        stdin.read_line(&mut input)?;

        if let Some('\n') = input.chars().next_back() {
            input.pop();
        }
        if let Some('\r') = input.chars().next_back() {
            input.pop();
        }

        match input.as_str() {
            "" => {},
            ".exit" => return Ok(()),
            _ => match parse_source(&input) {
                Ok(source) => println!("{source}"),
                Err(error) => {
                    let (message, messages) = error.details();
                    println!("Parse error: {message}");
                    if !messages.is_empty() {
                        println!("\t{}", messages.join(";\n\t"));
                    }
                },
            },
        }
    }
}
