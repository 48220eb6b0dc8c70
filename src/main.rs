use lumaflow::{EffectConfig, CONFIG_FILE};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = EffectConfig::load_or_default(CONFIG_FILE)
        .map_err(lumaflow::AppError::from)
        .and_then(lumaflow::run);

    if let Err(err) = result {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
