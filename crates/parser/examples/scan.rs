use unbanner_core::{PageWorker, Visit};
use unbanner_parser::ParserWorker;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut urls: Vec<String> = std::env::args().skip(1).collect();
    if urls.is_empty() {
        urls.push("https://example.com".to_string());
    }

    let worker = ParserWorker::new();
    for (i, url) in urls.into_iter().enumerate() {
        let visit = Visit {
            id: format!("scan-{:03}", i + 1),
            url,
            browser_config: None,
        };
        match worker.execute(&visit).await {
            Ok(report) => println!("{}", serde_json::to_string_pretty(&report)?),
            Err(e) => eprintln!("{}: {}", visit.url, serde_json::to_string(&e)?),
        }
    }
    Ok(())
}
