use std::path::PathBuf;
use std::sync::Arc;

use campus_api::config::{AppState, Config};
use campus_api::logger;
use campus_api::server::{self, SignalHandler};
use campus_api::store::{self, DocumentStore};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;

    logger::init(&cfg)?;

    // Materialize the database file before the runtime exists so a broken
    // data directory fails fast with a plain error.
    let db_path = store::prepare_database(&cfg.store)?;
    let documents = DocumentStore::load_file(&db_path)?;
    logger::log_store_loaded(&db_path, &documents.summary());

    // 创建 Tokio 运行时，根据 workers 配置设置线程数
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        println!("[CONFIG] Using {workers} worker threads");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(serve(cfg, documents, db_path))
}

async fn serve(
    cfg: Config,
    documents: DocumentStore,
    db_path: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let listener = server::create_listener(addr)?;

    logger::log_server_start(&addr, &cfg, &db_path);

    let state = Arc::new(AppState::new(cfg, documents, db_path));

    let signals = Arc::new(SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    server::run(listener, state, signals).await;

    Ok(())
}
