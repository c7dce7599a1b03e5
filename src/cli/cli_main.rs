use super::cli_commands::{analyze, score_pair, search};
use super::cli_commands::CliError;
use crate::settings::{AnalysisSettings, DEFAULT_SETTINGS_FILE};
use std::io::{self, Write};

/// Settings file is read for each analysis, so edits to it apply without a restart
pub fn run_interactive_menu() {
    loop {
        show_main_menu();
        let Some(choice) = get_user_input() else {
            break;
        };

        let result = match choice.trim() {
            "1" => match prompt("Corpus file: ") {
                Some(corpus) => load_settings()
                    .and_then(|settings| analyze(&corpus, &settings, false)),
                None => Ok(()),
            },
            "2" => match (prompt("Corpus file: "), prompt("Formula: ")) {
                (Some(corpus), Some(formula)) => load_settings()
                    .and_then(|settings| search(&corpus, &formula, &settings, false)),
                _ => Ok(()),
            },
            "3" => match (prompt("First identifier: "), prompt("Second identifier: ")) {
                (Some(first), Some(second)) => {
                    score_pair(&first, &second).map(|coeff| println!("similarity: {:.4}", coeff))
                }
                _ => Ok(()),
            },
            "0" => {
                println!("Goodbye!");
                break;
            }
            _ => {
                println!("Invalid choice. Please try again.");
                Ok(())
            }
        };
        if let Err(e) = result {
            println!("\x1b[31m{}\x1b[0m", e);
        }
    }
}
fn load_settings() -> Result<AnalysisSettings, CliError> {
    Ok(AnalysisSettings::load_or_default(DEFAULT_SETTINGS_FILE)?)
}

/* colors
Blue (\x1b[34m) - Welcome header text

Yellow (\x1b[33m) - Menu options

Cyan (\x1b[36m) - prompts

Red (\x1b[31m) - errors

Reset (\x1b[0m) - Returns to normal color after each colored section
*/
fn show_main_menu() {
    println!(
        "\x1b[34m\n BruttoSim: similarity of chemical substances by brutto formulae\n \x1b[0m"
    );
    println!("\x1b[33m1. Cluster similar substances of a corpus\x1b[0m");
    println!("\x1b[33m2. Find documents by formula\x1b[0m");
    println!("\x1b[33m3. Compare two structure identifiers\x1b[0m");
    println!("\x1b[33m0. Exit\x1b[0m");
    print!("\x1b[36mEnter your choice: \x1b[0m");
    io::stdout().flush().ok();
}

fn prompt(message: &str) -> Option<String> {
    print!("\x1b[36m{}\x1b[0m", message);
    io::stdout().flush().ok();
    get_user_input()
        .map(|input| input.trim().to_string())
        .filter(|input| !input.is_empty())
}

// None on end of input
fn get_user_input() -> Option<String> {
    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input),
    }
}
