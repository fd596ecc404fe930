pub use error::Error;
mod analysis;
mod area;
mod conf;
mod error;
mod geometry;
mod imagery;
mod preview;
mod rest;
mod server;
mod session;
use analysis::AnalysisReport;
use conf::Conf;
use serde_json::json;
use std::{env, fs};
use tracing_subscriber::EnvFilter;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[actix_web::main]
async fn main() -> Result<()> {
    init_logging();

    let conf = Conf::from_env()?;

    let args: Vec<String> = env::args().collect();

    let command = match args.get(1) {
        Some(some) => some,
        None => Err(Error::CLI("No actions passed".into()))?,
    };

    match command.as_str() {
        "server" => server::run(conf).await?,
        "bounds" => {
            let bounds = area::io::import(&read_arg_file(&args)?)?.bounds()?;
            let res = json!({ "bbox": bounds.to_array(), "corners": bounds.corners() });
            println!("{}", serde_json::to_string_pretty(&res)?);
        }
        "analyze" => {
            let report = AnalysisReport::new(&read_arg_file(&args)?, &conf.static_image_size)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        first_arg => Err(Error::CLI(format!("Unknown command: {first_arg}")))?,
    }

    Ok(())
}

fn read_arg_file(args: &[String]) -> Result<String> {
    let path = args
        .get(2)
        .ok_or_else(|| Error::CLI("Missing GeoJSON file argument".into()))?;
    Ok(fs::read_to_string(path)?)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cfg!(debug_assertions) {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt()
            .json()
            .without_time()
            .with_env_filter(filter)
            .init();
    }
}
