use clap::Parser;
use hs_classify::config::load_store_config;
use hs_classify::core::export;
use hs_classify::domain::model::{Classification, QueryOptions, SortBy, SortOrder};
use hs_classify::utils::error::{ClassifyError, ErrorSeverity};
use hs_classify::utils::{logger, monitor::ResourceMonitor};
use hs_classify::{ClassificationStore, SupabaseStore};

#[derive(Debug, Parser)]
#[command(name = "history")]
#[command(about = "Browse, filter, export and summarize stored classifications")]
struct Args {
    /// Search term; HS-code shaped terms (e.g. 8471.30) match the HS code only
    #[arg(short, long)]
    search: Option<String>,

    /// Only show records flagged as dual-use
    #[arg(long)]
    dual_use_only: bool,

    /// Sort field: created | confidence | product
    #[arg(long, default_value = "created")]
    sort_by: String,

    /// Sort order: asc | desc
    #[arg(long, default_value = "desc")]
    order: String,

    #[arg(long, default_value = "20")]
    limit: u32,

    #[arg(long, default_value = "0")]
    offset: u32,

    /// Export the current page as CSV to this path
    #[arg(long)]
    export: Option<String>,

    /// Show aggregate statistics instead of a listing
    #[arg(long)]
    stats: bool,

    /// Show a single record by id
    #[arg(long)]
    get: Option<String>,

    /// Delete a record by id
    #[arg(long)]
    delete: Option<String>,

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

    // store 設定缺漏是硬性啟動錯誤
    let store_config = match load_store_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration loading failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let store = SupabaseStore::new(&store_config);
    let mut monitor = ResourceMonitor::new(args.monitor);

    let outcome = run(&args, &store).await;
    monitor.log_phase("Store access");
    monitor.log_summary();

    if let Err(e) = outcome {
        tracing::error!(
            "❌ History command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(exit_code(&e));
    }
    Ok(())
}

async fn run(args: &Args, store: &SupabaseStore) -> hs_classify::Result<()> {
    if let Some(id) = &args.get {
        // 找不到是正常結果，不是錯誤
        match store.get_by_id(id).await? {
            Some(record) => print_record_details(&record),
            None => println!("🔍 No record with id {}", id),
        }
        return Ok(());
    }

    if let Some(id) = &args.delete {
        store.delete(id).await?;
        println!("🗑️ Deleted record {}", id);
        return Ok(());
    }

    if args.stats {
        let stats = store.statistics().await?;
        println!("📊 Classification statistics");
        println!("  Total records:      {}", stats.total);
        println!("  Dual-use records:   {}", stats.dual_use_count);
        println!("  Average confidence: {}%", stats.average_confidence);
        println!("  Top chapters:");
        for bucket in &stats.top_chapters {
            println!("    {} — {} records", bucket.chapter, bucket.count);
        }
        return Ok(());
    }

    let sort_by: SortBy = args
        .sort_by
        .parse()
        .map_err(|message| ClassifyError::ValidationError { message })?;
    let sort_order: SortOrder = args
        .order
        .parse()
        .map_err(|message| ClassifyError::ValidationError { message })?;

    let mut options = QueryOptions::new()
        .with_sort(sort_by, sort_order)
        .with_page(args.limit, args.offset);
    options.dual_use_only = args.dual_use_only;
    if let Some(term) = &args.search {
        options.search_term = Some(term.clone());
    }

    let page = store.query(&options).await?;

    println!(
        "📋 {} of {} matching records (offset {})",
        page.records.len(),
        page.total,
        args.offset
    );
    for record in &page.records {
        print_record_line(record);
    }

    if let Some(path) = &args.export {
        export::write_csv_file(&page.records, path)?;
        println!("📁 Exported {} records to {}", page.records.len(), path);
    }

    Ok(())
}

fn print_record_line(record: &Classification) {
    let customer = record
        .customer_name
        .as_deref()
        .map(|c| format!(" ({})", c))
        .unwrap_or_default();
    println!(
        "  • {}  {}%{}  {}{} — {}",
        record.hs_code,
        record.confidence,
        if record.is_dual_use { "  ⚠ dual-use" } else { "" },
        record.product_name,
        customer,
        record.created_at.format("%Y-%m-%d %H:%M")
    );
}

fn print_record_details(record: &Classification) {
    println!("🔍 Record {}", record.id);
    println!("  Product:     {}", record.product_name);
    if let Some(customer) = &record.customer_name {
        println!("  Customer:    {}", customer);
    }
    println!("  HS Code:     {}", record.hs_code);
    println!("  Chapter:     {}", record.chapter);
    println!("  Description: {}", record.description);
    println!("  Confidence:  {}%", record.confidence);
    println!(
        "  Dual Use:    {}",
        if record.is_dual_use { "Yes" } else { "No" }
    );
    if let Some(reasoning) = &record.reasoning {
        println!("  Reasoning:   {}", reasoning);
    }
    println!("  Created:     {}", record.created_at.to_rfc3339());
    println!("  Updated:     {}", record.updated_at.to_rfc3339());
}

fn exit_code(e: &ClassifyError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
