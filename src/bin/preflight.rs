use staffsync::app::dashboard;
use staffsync::infra::config::GatewayConfig;
use staffsync::HttpGateway;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--stats]\n\
         \n\
         Requires env vars:\n\
           STAFFSYNC_API_URL, STAFFSYNC_PROJECT_ID, STAFFSYNC_PUBLIC_KEY\n\
         Optional:\n\
           STAFFSYNC_REQUEST_TIMEOUT_SECS (default 30)\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let with_stats = args.iter().any(|a| a == "--stats");

    // Force-read config (nice error messages if missing)
    let config = GatewayConfig::from_env()?;

    println!("> Preflight:");
    println!("  STAFFSYNC_API_URL={}", config.api_url);
    println!("  STAFFSYNC_PROJECT_ID={}", config.project_id);
    println!("  STAFFSYNC_REQUEST_TIMEOUT_SECS={}", config.timeout.as_secs());

    let gateway = HttpGateway::new(&config)?;

    let health = gateway
        .health()
        .await
        .map_err(|e| anyhow::anyhow!("Record store is not reachable at {}: {}", gateway.base_url(), e))?;
    println!("  Record store is up.");
    if let Some(tables) = health
        .get("data")
        .and_then(|d| d.get("tables"))
        .and_then(|t| t.as_array())
    {
        for t in tables {
            println!(
                "  {}: {} rows",
                t.get("table").and_then(|v| v.as_str()).unwrap_or("?"),
                t.get("rows").and_then(|v| v.as_u64()).unwrap_or(0)
            );
        }
    }

    // Health is unauthenticated; a real query proves the credentials.
    let stats = dashboard::load_stats(&gateway)
        .await
        .map_err(|e| anyhow::anyhow!("Query with the configured credentials failed: {}", e))?;
    println!("  Credentials accepted.");
    if with_stats {
        println!("  Employees: {}", stats.total_employees);
        println!("  Departments: {}", stats.departments);
        println!("  On leave: {}", stats.on_leave);
        println!("  Pending leave requests: {}", stats.pending_leave_requests);
    }

    println!("> Preflight OK.");
    Ok(())
}
