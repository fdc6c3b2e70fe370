use crate::config::Config;
use crate::prediction::HttpClassifier;
use crate::selection::SelectionHandler;
use crate::session::Session;
use crate::surface::ConsoleSurface;

use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;

/// Wires the selection handler and the prediction session to the console
/// surface and drives them from stdin. `select <path>` plays the file
/// chooser's change event, `predict` the submission trigger's click.
pub async fn start_app(config: Config) -> anyhow::Result<()> {
    let surface = Arc::new(ConsoleSurface);
    let classifier = HttpClassifier::new(&config.backend);
    let mut selection = SelectionHandler::new(Arc::clone(&surface));
    let mut session = Session::new(classifier, Arc::clone(&surface));

    tracing::info!("Predicting against {}", config.backend.predict_url());
    println!("Commands: select <path> | predict | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received, exiting");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim().split_once(char::is_whitespace) {
                    Some(("select", path)) => {
                        selection.handle_selection(Some(Path::new(path.trim()))).await;
                    }
                    _ => match line.trim() {
                        "" => {}
                        "select" => selection.handle_selection(None).await,
                        "predict" => session.submit(selection.selected()).await,
                        "quit" | "exit" => break,
                        other => println!("Unknown command: {other}"),
                    },
                }
            }
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
