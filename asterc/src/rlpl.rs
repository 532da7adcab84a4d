use std::io::Write;

use aster_core::lexer::prelude::Lexer;

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
            _ => {
                let lexer = Lexer::new(input.char_indices().map(|(i, c)| (i as u32, c)));

                for result in lexer {
                    match result {
                        Ok((start, token, end)) => {
                            println!("[{start}..{end}] {token:?}");
                        },
                        Err(error) => {
                            let (message, messages) = error.details();
                            println!("[at {}] Lexical error: {message}", error.location.start);
                            if !messages.is_empty() {
                                println!("{}", messages.join("\n"));
                            }
                            break;
                        },
                    }
                }
            },
        }
    }
}
