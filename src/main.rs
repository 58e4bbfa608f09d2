use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use scholi::config::ScholiConfig;
use scholi::error::Error;
use scholi::intake::{prompts, QuestionCatalog, Session};
use scholi::retrieval::{BedrockAgentClient, ResponseOrchestrator, RetrievalProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = match ScholiConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("  export KNOWLEDGE_BASE_ID=<your Bedrock knowledge base ID>");
            eprintln!("  export AWS_BEARER_TOKEN_BEDROCK=<your Bedrock API key>");
            std::process::exit(1);
        }
    };

    eprintln!("🎓 Scholi v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model_id);
    eprintln!("   Knowledge base: {}", config.knowledge_base_id);
    eprintln!("   Region: {}", config.region);
    eprintln!("   Type an answer and press Enter. /reset to start over, /quit to exit.\n");

    let catalog = QuestionCatalog::standard();
    let provider: Arc<dyn RetrievalProvider> = Arc::new(BedrockAgentClient::from_config(&config));
    let orchestrator = ResponseOrchestrator::new(provider, catalog.clone(), &config);

    let mut session = Session::new(catalog.count());
    greet(&catalog, &mut session)?;

    let stdin = tokio::io::stdin();
    let reader = BufReader::new(stdin);
    let mut lines = reader.lines();

    eprint!("> ");
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => {}
            "/quit" => break,
            "/reset" => {
                session.reset();
                greet(&catalog, &mut session)?;
            }
            _ => {
                eprintln!("⏳ Thinking...");
                match orchestrator.process_turn(&mut session, input).await {
                    Ok(reply) => println!("\n{reply}\n"),
                    Err(e) if e.is_transient() => {
                        println!(
                            "\n⏳ The scholarship service is busy right now — \
                             please try again shortly.\n"
                        );
                    }
                    Err(Error::Retrieval(e)) => {
                        tracing::error!("Retrieval failed: {e}");
                        println!("\n⚠️  Something went wrong talking to the scholarship service.\n");
                    }
                    Err(e) => {
                        tracing::error!("Turn failed: {e}");
                        println!("\n⚠️  Something went wrong. Please try again.\n");
                    }
                }
            }
        }
        eprint!("> ");
    }

    Ok(())
}

/// Print and seed the welcome greeting into the session.
fn greet(catalog: &QuestionCatalog, session: &mut Session) -> anyhow::Result<()> {
    let greeting = prompts::greeting(catalog.get(1)?, catalog.count());
    println!("\n{greeting}\n");
    session.push_assistant(&greeting);
    Ok(())
}
