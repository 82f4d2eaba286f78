use crate::app::{BackendEvent, BackendTask};
use crate::infra::{FileTreeSource, TreeSource};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub(crate) async fn worker_loop(
    mut task_rx: UnboundedReceiver<BackendTask>,
    event_tx: UnboundedSender<BackendEvent>,
) {
    while let Some(task) = task_rx.recv().await {
        let event = match task {
            BackendTask::LoadTree { path } => {
                let source: Arc<dyn TreeSource> = Arc::new(FileTreeSource::new(path));
                load_tree_event(source).await
            }
        };

        if event_tx.send(event).is_err() {
            break;
        }
    }
}

async fn load_tree_event(source: Arc<dyn TreeSource>) -> BackendEvent {
    let result = tokio::task::spawn_blocking(move || source.load()).await;
    match result {
        Ok(Ok(tree)) => BackendEvent::TreeLoaded { tree },
        other => BackendEvent::Error {
            context: "load".to_string(),
            message: format!("tree load failed: {}", flatten_error(other)),
        },
    }
}

fn flatten_error<T>(res: std::result::Result<anyhow::Result<T>, tokio::task::JoinError>) -> String {
    match res {
        Ok(Ok(_)) => "ok".to_string(),
        Ok(Err(err)) => format!("{err:#}"),
        Err(err) => format!("join error: {err}"),
    }
}
