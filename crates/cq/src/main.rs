use clap::{Parser, Subcommand};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "civiq")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve,
    /// Apply database migrations and exit.
    Migrate,
    /// Print the OpenAPI document to stdout.
    Openapi,
    /// Dump service requests (or assist tickets) as CSV to stdout.
    Export {
        /// Export assist tickets instead of service requests.
        #[arg(long)]
        assists: bool,
    },
}

fn export(db_path: &str, assists: bool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = cq_db::schema::open_and_migrate(db_path)?;
    let store = cq_db::DbStore::new(conn);
    print!("{}", render_export(&store, assists)?);
    Ok(())
}

fn render_export(store: &cq_db::DbStore, assists: bool) -> Result<String, cq_core::CiviqError> {
    use cq_core::Store;
    use cq_core::assists::AssistRepository;
    use cq_core::requests::RequestRepository;
    use cq_core::types::io::{AssistFilter, RequestFilter};

    if assists {
        let rows = store.assists().list_all(&AssistFilter::default())?;
        Ok(cq_core::csv::assists_csv(&rows))
    } else {
        let rows = store.requests().list_all(&RequestFilter::default())?;
        Ok(cq_core::csv::requests_csv(&rows))
    }
}

fn db_path() -> String {
    std::env::var("CIVIQ_DB_PATH").unwrap_or_else(|_| ".civiq/civiq.db".to_string())
}

fn uploads_dir() -> PathBuf {
    std::env::var("CIVIQ_UPLOADS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".civiq/uploads"))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve => {
            let db_path = db_path();
            if let Some(parent) = Path::new(&db_path).parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let port = std::env::var("CIVIQ_PORT")
                .ok()
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(4860);
            let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port);
            let state = cq_serve::AppState {
                db_path,
                uploads_dir: uploads_dir(),
            };
            if let Err(err) = cq_serve::serve(state, addr).await {
                eprintln!("serve error: {err}");
            }
        }
        Command::Migrate => {
            let db_path = db_path();
            if let Some(parent) = Path::new(&db_path).parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match cq_db::schema::open_and_migrate(&db_path) {
                Ok(_) => println!("migrated {db_path}"),
                Err(err) => eprintln!("migrate error: {err}"),
            }
        }
        Command::Openapi => {
            let spec = cq_serve::openapi::generate_spec();
            println!("{spec}");
        }
        Command::Export { assists } => {
            if let Err(err) = export(&db_path(), assists) {
                eprintln!("export error: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::render_export;

    #[test]
    fn export_renders_both_csv_shapes() {
        let conn = cq_db::schema::with_test_db().unwrap();
        let store = cq_db::DbStore::new(conn);

        let requests = render_export(&store, false).unwrap();
        assert!(requests.starts_with(
            "id,title,description,categoryId,status,createdBy,assignedTo,latitude,longitude,createdAtUtc"
        ));

        let assists = render_export(&store, true).unwrap();
        assert!(assists.starts_with("id,kind,status,createdBy,elderName"));
    }
}
