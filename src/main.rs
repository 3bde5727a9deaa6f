use std::io;
use std::process::ExitCode;

use modsort::config::Config;
use modsort::menu::Menu;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => match Config::load(modsort::filesystem::expand_home(&path)) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Could not load config {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    let stdin = io::stdin();
    let mut menu = Menu::new(stdin.lock(), io::stdout());
    if let Err(e) = menu.run(config) {
        log::error!("Console error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
