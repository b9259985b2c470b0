mod ledger;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use ledger::DocumentLedger;
use pdf_rag_core::{
    discover_pdf_files, CharacterNgramEmbedder, GeminiChatClient, RagService, DEFAULT_CHAT_MODEL,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pdf-rag", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding the index snapshot and the upload ledger.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Hosted chat model name.
    #[arg(long, default_value = DEFAULT_CHAT_MODEL)]
    chat_model: String,

    /// API key for the hosted chat model.
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    google_api_key: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest PDF files into the vector index.
    Ingest {
        /// PDF file to ingest; repeatable.
        #[arg(long = "file")]
        files: Vec<PathBuf>,

        /// Folder to scan recursively for PDFs.
        #[arg(long)]
        folder: Option<PathBuf>,
    },
    /// Ask a question answered from the indexed documents.
    Ask {
        /// The question to answer.
        #[arg(long)]
        question: String,

        /// Number of passages to ground the answer on.
        #[arg(long, default_value = "4")]
        top_k: usize,

        /// Print the retrieved source passages after the answer.
        #[arg(long, default_value_t = false)]
        show_sources: bool,
    },
    /// List uploaded documents.
    Documents,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let index_path = cli.data_dir.join("index.json");
    let ledger_path = cli.data_dir.join("documents.json");

    match cli.command {
        Command::Ingest { files, folder } => {
            let service = build_service(cli.google_api_key, &cli.chat_model, index_path)?;

            let mut batch = files;
            if let Some(folder) = folder {
                let discovered = discover_pdf_files(&folder);
                if discovered.is_empty() {
                    warn!(folder = %folder.display(), "no pdf files found in folder");
                }
                batch.extend(discovered);
            }
            if batch.is_empty() {
                bail!("nothing to ingest: pass --file and/or --folder");
            }

            info!(files = batch.len(), "ingesting batch");
            let report = service
                .ingest(&batch)
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            let mut ledger = DocumentLedger::open(&ledger_path)?;
            for document in &report.documents {
                ledger.record(&document.record.document_id)?;
                println!(
                    "{}: {} passage(s)",
                    document.record.document_id, document.passage_count
                );
            }

            if report.is_empty() {
                println!("0 passages indexed (no extractable text in the batch)");
            } else {
                println!(
                    "{} passage(s) from {} file(s) indexed",
                    report.total_passages,
                    report.documents.len()
                );
            }
        }
        Command::Ask {
            question,
            top_k,
            show_sources,
        } => {
            let service =
                build_service(cli.google_api_key, &cli.chat_model, index_path)?.with_top_k(top_k);

            let result = service
                .query(&question)
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            println!("{}", result.answer);

            if show_sources && !result.source_passages.is_empty() {
                println!();
                for (position, passage) in result.source_passages.iter().enumerate() {
                    println!("[source {}]\n{passage}\n", position + 1);
                }
            }
        }
        Command::Documents => {
            let ledger = DocumentLedger::open(&ledger_path)?;
            let entries = ledger.newest_first();
            if entries.is_empty() {
                println!("no documents uploaded yet");
            }
            for entry in entries {
                println!("{}  {}", entry.uploaded_at.to_rfc3339(), entry.filename);
            }
        }
    }

    Ok(())
}

/// Credentials are a startup requirement: commands that reach the chat
/// model refuse to run without a key rather than failing mid-request.
fn build_service(
    api_key: Option<String>,
    chat_model: &str,
    index_path: PathBuf,
) -> Result<RagService<CharacterNgramEmbedder, GeminiChatClient>> {
    let Some(api_key) = api_key.filter(|key| !key.trim().is_empty()) else {
        bail!("GOOGLE_API_KEY is not set; export it or pass --google-api-key");
    };

    let chat = GeminiChatClient::new(api_key).with_model(chat_model);
    Ok(RagService::new(
        CharacterNgramEmbedder::default(),
        chat,
        index_path,
    ))
}
