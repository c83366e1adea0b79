use clap::Parser;
use hs_classify::config::load_completion_config;
use hs_classify::utils::error::{ClassifyError, ErrorSeverity};
use hs_classify::utils::{logger, monitor::ResourceMonitor};
use hs_classify::{ChatCompletionClient, Classifier};

#[derive(Debug, Parser)]
#[command(name = "portfolio")]
#[command(about = "Infer and classify the likely product portfolio of a company")]
struct Args {
    /// Company name to analyze
    company: String,

    /// Path to a TOML configuration file (falls back to environment variables)
    #[arg(long)]
    config: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Log CPU/memory usage per phase
    #[arg(long)]
    monitor: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting portfolio analysis for: {}", args.company);

    let completion_config = match load_completion_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration loading failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let mut monitor = ResourceMonitor::new(args.monitor);

    let classifier = Classifier::new(
        ChatCompletionClient::new(&completion_config),
        completion_config.max_tokens,
    );

    let analysis = match classifier.analyze_portfolio(&args.company).await {
        Ok(analysis) => analysis,
        Err(e) => {
            tracing::error!(
                "❌ Portfolio analysis failed: {} (Severity: {:?})",
                e,
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    };

    monitor.log_phase("Portfolio analysis");

    println!("✅ Portfolio analysis for {}", analysis.company);
    println!("  Industry:   {}", analysis.industry);
    println!("  Risk level: {}", analysis.risk_level);
    println!("  Products ({}):", analysis.products.len());
    for product in &analysis.products {
        println!(
            "    • {} [{}] — {} ({}%){}",
            product.name,
            product.category,
            product.hs_code,
            product.confidence,
            if product.is_dual_use { " ⚠ dual-use" } else { "" }
        );
        if let Some(reasoning) = &product.reasoning {
            println!("      {}", reasoning);
        }
    }

    monitor.log_summary();
    Ok(())
}

fn exit_code(e: &ClassifyError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
