use log::error;
use recipekeeper_paprika::{convert, ConverterConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ConverterConfig::load()?;
    convert(&config).inspect_err(|e| error!("Conversion failed: {}", e))?;

    Ok(())
}
