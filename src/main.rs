use bruttosim::cli::cli_commands::{parse_args, run_command, settings_for};
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

fn main() {
    // the logger runs before the settings are read; their level is applied afterwards
    TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .ok();
    log::set_max_level(LevelFilter::Info);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = parse_args(&args).and_then(|command| {
        let settings = settings_for(&command)?;
        log::set_max_level(settings.level_filter().unwrap_or(LevelFilter::Info));
        run_command(command, &settings)
    });
    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
