//! Generate race cards from a results link (or a JSON result) and write them as PNG files.
//!
//! ```text
//! cargo run --example generate_cards -- "https://live.myrace.info/?f=bases/x.clax&B=320" out/
//! cargo run --example generate_cards -- --data result.json out/
//! ```
//!
//! Set `RACE_CARDS_SETTINGS` to a TOML file to override browser and timing settings.

use std::path::PathBuf;

use race_cards::{RaceCardData, RaceCardService, Settings};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (input, out_dir) = match args.as_slice() {
        [flag, path, out] if flag == "--data" => (Input::Data(PathBuf::from(path)), out),
        [url, out] => (Input::Url(url.clone()), out),
        _ => {
            eprintln!("usage: generate_cards <results link | --data result.json> <out dir>");
            std::process::exit(2);
        }
    };

    let settings = match std::env::var_os("RACE_CARDS_SETTINGS") {
        Some(path) => Settings::load(&PathBuf::from(path)).unwrap(),
        None => Settings::default(),
    };

    let service = RaceCardService::new(settings);
    let result = match input {
        Input::Url(url) => {
            let (ok, reason) = race_cards::validate_url(&url);
            if !ok {
                eprintln!("invalid link: {reason}");
                std::process::exit(2);
            }
            service.generate_from_url(&url).await
        }
        Input::Data(path) => {
            let json = tokio::fs::read_to_string(&path).await.unwrap();
            let data: RaceCardData = serde_json::from_str(&json).unwrap();
            service.generate_from_data(&data).await
        }
    };
    service.close().await.ok();

    let cards = match result {
        Ok(cards) => cards,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    tokio::fs::create_dir_all(out_dir).await.unwrap();
    let names = ["single_post", "slide_1", "slide_2", "slide_3"];
    for (name, image) in names.iter().zip(cards.images()) {
        let path = PathBuf::from(out_dir).join(format!("{name}.png"));
        tokio::fs::write(&path, image).await.unwrap();
        println!("wrote {}", path.display());
    }
}

enum Input {
    Url(String),
    Data(PathBuf),
}
