use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A provider stand-in bound to an ephemeral local port.
pub struct TestServer {
    pub base_url: String,
    shutdown_tx: oneshot::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn(app: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let local_addr = listener
            .local_addr()
            .expect("listener address should resolve");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("test server should run");
        });

        Self {
            base_url: format!("http://{local_addr}"),
            shutdown_tx,
            task,
        }
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        self.task.await.expect("server task should join");
    }
}
