/// subcommands and their argument parsing
pub mod cli_commands;
/// interactive menu
pub mod cli_main;
