use clap::Parser;
use hs_classify::config::{load_completion_config, load_store_config};
use hs_classify::domain::model::NewClassification;
use hs_classify::utils::error::{ClassifyError, ErrorSeverity};
use hs_classify::utils::{logger, monitor::ResourceMonitor};
use hs_classify::{ChatCompletionClient, ClassificationStore, Classifier, SupabaseStore};

#[derive(Debug, Parser)]
#[command(name = "hs-classify")]
#[command(about = "Classify a product description into an HS tariff code and save it")]
struct Args {
    /// Product description to classify
    description: String,

    /// Customer name to attach to the record
    #[arg(short, long)]
    customer: Option<String>,

    /// Path to a TOML configuration file (falls back to environment variables)
    #[arg(long)]
    config: Option<String>,

    /// Classify only, do not save the result to the store
    #[arg(long)]
    no_save: bool,

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

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting HS code classification");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

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
    if monitor.is_enabled() {
        tracing::info!("🔍 Resource monitoring enabled");
    }

    // 分類管道：這一層失敗就結束，沒有可降級的結果
    let classifier = Classifier::new(
        ChatCompletionClient::new(&completion_config),
        completion_config.max_tokens,
    );

    let result = match classifier
        .classify_product(&args.description, args.customer.as_deref())
        .await
    {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(
                "❌ Classification failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    };

    monitor.log_phase("Classification");
    print_result(&result);

    if args.no_save {
        tracing::info!("📝 --no-save given, skipping store insert");
        monitor.log_summary();
        return Ok(());
    }

    // 存檔失敗不丟棄已取得的分類結果：結果照樣顯示，
    // 只提醒這次結果僅存在於本次會話
    match load_store_config(args.config.as_deref()) {
        Ok(store_config) => {
            let store = SupabaseStore::new(&store_config);
            match store.insert(&result).await {
                Ok(saved) => {
                    tracing::info!("💾 Saved classification {}", saved.id);
                    println!("💾 Saved with id {}", saved.id);
                }
                Err(e) => {
                    tracing::warn!("⚠️ Could not save classification: {}", e);
                    eprintln!("⚠️ {}", e.user_friendly_message());
                    eprintln!("💡 {}", e.recovery_suggestion());
                }
            }
        }
        Err(e) => {
            tracing::warn!("⚠️ Store configuration unavailable: {}", e);
            eprintln!("⚠️ Result not saved: {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
        }
    }

    monitor.log_summary();
    Ok(())
}

fn print_result(result: &NewClassification) {
    println!("✅ Classification complete!");
    println!("  Product:     {}", result.product_name);
    if let Some(customer) = &result.customer_name {
        println!("  Customer:    {}", customer);
    }
    println!("  HS Code:     {}", result.hs_code);
    println!("  Chapter:     {}", result.chapter);
    println!("  Description: {}", result.description);
    println!("  Confidence:  {}%", result.confidence);
    println!(
        "  Dual Use:    {}",
        if result.is_dual_use { "Yes" } else { "No" }
    );
    if let Some(reasoning) = &result.reasoning {
        println!("  Reasoning:   {}", reasoning);
    }
    if let Some(links) = &result.reference_links {
        println!("  References:");
        println!("    Portal:  {}", links.hs_portal);
        println!("    Chapter: {}", links.chapter_lookup);
        println!("    Details: {}", links.detailed_lookup);
        println!("    Search:  {}", links.code_search);
    }
}

// 根據錯誤嚴重程度決定退出碼
fn exit_code(e: &ClassifyError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
