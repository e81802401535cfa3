use hello_edge::config::{ConfigSource, EnvConfig};
use hello_edge::event_handler::function_handler;
use lambda_runtime::{run, service_fn, tracing, Error};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config: Arc<dyn ConfigSource> = Arc::new(EnvConfig);

    run(service_fn(move |event| {
        let config = Arc::clone(&config);
        async move { function_handler(config, event).await }
    }))
    .await
}
