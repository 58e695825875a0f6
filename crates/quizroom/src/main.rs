use quizroom::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), QuizroomError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("quizroom=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let source = HttpQuestionSource::new(config.provider.clone())?;
    let server = QuizServerBuilder::new().config(&config).build(source).await?;

    tracing::info!(
        ws_addr = %server.ws_addr()?,
        http_addr = %server.http_addr()?,
        admin_clear = config.admin_secret.is_some(),
        "quizroom listening"
    );
    server.run().await
}
