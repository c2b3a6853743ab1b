use rehab_tracker::commands;
use rehab_tracker::terminal::{self, Flow, TerminalPrompt, TerminalRenderer};
use rehab_tracker::{Config, Dashboard, ResourceClient};
use std::io::{self, Write};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    let client = ResourceClient::new(config.api_url.clone());

    match client.health().await {
        Ok(health) => info!(
            status = %health.status,
            db = %health.db,
            "backend reachable at {}",
            config.api_url
        ),
        Err(err) => warn!("health check against {} failed: {err}", config.api_url),
    }

    let mut dashboard = Dashboard::new(client, TerminalRenderer::default(), TerminalPrompt);
    if let Err(err) = dashboard.load().await {
        error!("initial load failed: {err}");
    }
    println!("{}", terminal::render_dashboard(&dashboard));
    println!("type 'help' for commands");

    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let command = match commands::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        match terminal::execute(&mut dashboard, command).await {
            Flow::Continue => {}
            Flow::Redraw => println!("{}", terminal::render_dashboard(&dashboard)),
            Flow::Quit => break,
        }
    }

    info!("bye");
    Ok(())
}
