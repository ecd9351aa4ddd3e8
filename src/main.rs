//! `staffsync` command line: browse and edit the HR collections of a record store.
//!
//! Talks to the store named by `STAFFSYNC_API_URL`, or with `--memory` to a
//! seeded in-process store (handy for trying things out).

use anyhow::anyhow;
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;

use staffsync::app::auth::SessionFlag;
use staffsync::app::dashboard;
use staffsync::app::notify::{NotificationKind, NotificationLog};
use staffsync::domain::query::SortDirection;
use staffsync::infra::config::GatewayConfig;
use staffsync::infra::logging;
use staffsync::storage::seed;
use staffsync::{
    Draft, EntityKind, HttpGateway, InMemoryGateway, ListMode, ListViewController, Record,
    RecordGateway, RecordId, RecordStore, SchemaRegistry,
};

#[derive(Parser)]
#[command(name = "staffsync")]
#[command(about = "Browse and edit the StaffSync HR collections")]
#[command(after_help = "Without --memory the store is configured through \
    STAFFSYNC_API_URL, STAFFSYNC_PROJECT_ID and STAFFSYNC_PUBLIC_KEY.")]
struct Cli {
    /// Use a seeded in-process store instead of the configured one.
    #[arg(long, global = true, default_value_t = false)]
    memory: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// One page of a collection.
    List {
        /// employees, departments or leave-requests.
        #[arg(value_name = "COLLECTION")]
        collection: EntityKind,
        #[arg(long)]
        search: Option<String>,
        /// Repeatable, e.g. `--filter status=on leave`.
        #[arg(long = "filter", value_name = "DIM=VALUE", value_parser = parse_assignment)]
        filters: Vec<(String, String)>,
        #[arg(long, value_name = "FIELD")]
        sort: Option<String>,
        #[arg(long, value_enum, requires = "sort")]
        order: Option<OrderCli>,
        #[arg(long)]
        page: Option<usize>,
        #[arg(long)]
        page_size: Option<usize>,
        /// Fetch the whole collection and page in memory.
        #[arg(long, default_value_t = false)]
        local: bool,
    },
    Show {
        /// employees, departments or leave-requests.
        #[arg(value_name = "COLLECTION")]
        collection: EntityKind,
        #[arg(value_parser = parse_record_id)]
        id: RecordId,
    },
    Add {
        /// employees, departments or leave-requests.
        #[arg(value_name = "COLLECTION")]
        collection: EntityKind,
        #[arg(value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
    },
    /// Changes the given fields; `FIELD=` clears an optional field.
    Update {
        /// employees, departments or leave-requests.
        #[arg(value_name = "COLLECTION")]
        collection: EntityKind,
        #[arg(value_parser = parse_record_id)]
        id: RecordId,
        #[arg(value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
    },
    Delete {
        /// employees, departments or leave-requests.
        #[arg(value_name = "COLLECTION")]
        collection: EntityKind,
        #[arg(value_parser = parse_record_id)]
        id: RecordId,
    },
    /// Dashboard counts.
    Stats,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrderCli {
    Asc,
    Desc,
}

impl From<OrderCli> for SortDirection {
    fn from(value: OrderCli) -> Self {
        match value {
            OrderCli::Asc => SortDirection::Asc,
            OrderCli::Desc => SortDirection::Desc,
        }
    }
}

fn parse_record_id(raw: &str) -> Result<RecordId, String> {
    match raw.parse::<RecordId>()? {
        RecordId(id) if id > 0 => Ok(RecordId(id)),
        _ => Err(format!("record ids start at 1, got '{}'", raw)),
    }
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))
}

async fn connect(memory: bool) -> anyhow::Result<Arc<dyn RecordGateway>> {
    if memory {
        let store = Arc::new(RecordStore::new(SchemaRegistry::with_defaults()));
        seed::seed_demo(&store).await?;
        return Ok(Arc::new(InMemoryGateway::new(store)));
    }
    let config = GatewayConfig::from_env()?;
    Ok(Arc::new(HttpGateway::new(&config)?))
}

fn print_records(controller: &ListViewController, records: &[Record]) {
    let columns: Vec<&str> = controller
        .schema()
        .fields()
        .iter()
        .map(|f| f.name)
        .collect();
    println!("Id\t{}", columns.join("\t"));
    for record in records {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| record.get(c).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        println!("{}\t{}", record.id, cells.join("\t"));
    }
}

fn print_notifications(log: &NotificationLog) {
    for n in log.drain() {
        let tag = match n.kind {
            NotificationKind::Success => "ok",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        };
        eprintln!("[{}] {}", tag, n.message);
    }
}

struct Session {
    controller: ListViewController,
    log: NotificationLog,
}

fn open_session(
    gateway: Arc<dyn RecordGateway>,
    kind: EntityKind,
    mode: ListMode,
    page_size: Option<usize>,
) -> anyhow::Result<Session> {
    let schema = SchemaRegistry::with_defaults()
        .by_kind(kind)
        .ok_or_else(|| anyhow!("no schema registered for {}", kind))?;
    let log = NotificationLog::new();
    let mut controller = ListViewController::new(
        schema,
        gateway,
        Arc::new(log.clone()),
        Arc::new(SessionFlag::new(true)),
        mode,
    );
    if let Some(size) = page_size {
        controller = controller.with_page_size(size);
    }
    Ok(Session { controller, log })
}

async fn run(command: Commands, gateway: Arc<dyn RecordGateway>) -> anyhow::Result<()> {
    let (collection, mode, page_size) = match &command {
        Commands::Stats => {
            let stats = dashboard::load_stats(gateway.as_ref()).await?;
            println!("Employees:              {}", stats.total_employees);
            println!("Departments:            {}", stats.departments);
            println!("On leave:               {}", stats.on_leave);
            println!("Pending leave requests: {}", stats.pending_leave_requests);
            return Ok(());
        }
        Commands::List {
            collection,
            local,
            page_size,
            ..
        } => {
            let mode = if *local { ListMode::Local } else { ListMode::Remote };
            (*collection, mode, *page_size)
        }
        Commands::Show { collection, .. }
        | Commands::Add { collection, .. }
        | Commands::Update { collection, .. }
        | Commands::Delete { collection, .. } => (*collection, ListMode::Remote, None),
    };

    let Session {
        mut controller,
        log,
    } = open_session(gateway, collection, mode, page_size)?;
    let outcome = execute(&mut controller, command).await;
    print_notifications(&log);
    outcome
}

async fn execute(controller: &mut ListViewController, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::List {
            search,
            filters,
            sort,
            order,
            page,
            ..
        } => {
            if let Some(term) = &search {
                controller.set_search_term(term);
            }
            for (dim, value) in &filters {
                controller.set_filter(dim, value);
            }
            if let Some(field) = &sort {
                controller.set_sort(field);
                if let Some(order) = order {
                    if controller.state().sort().direction != SortDirection::from(order) {
                        controller.set_sort(field);
                    }
                }
            }
            controller.refresh().await?;
            if let Some(page) = page {
                if page != controller.current_page() {
                    if !controller.go_to_page(page) {
                        return Err(anyhow!(
                            "page {} is out of range (1..={})",
                            page,
                            controller.total_pages()
                        ));
                    }
                    controller.refresh().await?;
                }
            }
            print_records(controller, controller.visible());
            println!(
                "-- page {} of {} ({} matching)",
                controller.current_page(),
                controller.total_pages(),
                controller.match_count()
            );
        }
        Commands::Show { id, .. } => {
            let record = controller.fetch_record(id).await?;
            print_records(controller, std::slice::from_ref(&record));
        }
        Commands::Add { fields, .. } => {
            let draft: Draft = fields.into_iter().collect();
            let record = controller.add_record(&draft).await?;
            println!("Created {} {}", controller.schema().label(), record.id);
        }
        Commands::Update { id, fields, .. } => {
            let current = controller.fetch_record(id).await?;
            let mut draft = Draft::from_record(&current);
            for (field, value) in fields {
                draft = draft.set(&field, value);
            }
            controller.update_record(id, &draft).await?;
        }
        Commands::Delete { id, .. } => {
            controller.remove_record(id).await?;
        }
        Commands::Stats => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_tracing();

    let cli = Cli::parse();
    let gateway = connect(cli.memory).await?;
    run(cli.command, gateway).await
}
