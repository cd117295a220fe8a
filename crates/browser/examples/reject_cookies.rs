use browser::{ChromiumWorker, TimeoutConfig};
use unbanner_core::{BrowserConfig, EngineConfig, PageWorker, Visit};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut urls: Vec<String> = std::env::args().skip(1).collect();
    if urls.is_empty() {
        urls.push("https://www.theguardian.com/".to_string());
    }

    let worker = ChromiumWorker::with_config(EngineConfig::patient(), TimeoutConfig::patient());

    for (i, url) in urls.into_iter().enumerate() {
        let visit = Visit {
            id: format!("visit-{}", i + 1),
            url,
            browser_config: Some(BrowserConfig {
                headless: true,
                viewport_width: Some(1280),
                viewport_height: Some(800),
            }),
        };
        match worker.execute(&visit).await {
            Ok(report) => println!(
                "{} activated={} attempts={} matched={}",
                report.url,
                report.engine.activated,
                report.engine.attempts,
                report.engine.matched.map(|m| m.to_string()).unwrap_or_else(|| "-".into()),
            ),
            Err(e) => eprintln!("{}: {}", visit.url, e),
        }
    }
    Ok(())
}
