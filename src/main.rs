mod channel;
mod commands;
mod config;
mod error;
mod feed;
mod idgen;
mod keys;
mod server;
mod store;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::Config;
use feed::FeedDraft;
use store::Store;

/// A tiny feed store: post items into channels, read them back as JSON or RSS
#[derive(Parser)]
#[command(name = "anyrss", version)]
struct Args {
    /// Database file (defaults to $ANYRSS_DB, then the user data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// Listen address (defaults to $ANYRSS_ADDR, then 0.0.0.0:10086)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Manage channels
    Channel {
        #[command(subcommand)]
        command: ChannelCommand,
    },
    /// Post an item into a channel
    Post {
        channel: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "")]
        author: String,
    },
    /// List the items of a channel, newest first
    Show {
        channel: String,
        /// Number of items to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Maximum number of items to print
        #[arg(long)]
        limit: Option<usize>,
        /// Print the items as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a channel as an RSS document
    Rss { channel: String },
    /// Remove an item from a channel by id
    Remove { channel: String, id: u64 },
}

#[derive(Subcommand)]
enum ChannelCommand {
    /// Create a channel
    Add { name: String },
    /// List all channels
    Ls,
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_store(path: &Path) -> anyhow::Result<Store> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Store::open(path).with_context(|| format!("failed to open database {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let serving = matches!(args.command, Command::Serve { .. });
    init_tracing(if serving { "anyrss=info" } else { "anyrss=warn" });

    let addr = match &args.command {
        Command::Serve { addr } => addr.clone(),
        _ => None,
    };
    let config = Config::resolve(args.db, addr);
    let store = open_store(&config.db_path)?;

    match args.command {
        Command::Serve { .. } => commands::serve::cmd_serve(store, &config),
        Command::Channel {
            command: ChannelCommand::Add { ref name },
        } => commands::channel::cmd_channel_add(&store, name),
        Command::Channel {
            command: ChannelCommand::Ls,
        } => commands::channel::cmd_channel_ls(&store),
        Command::Post {
            ref channel,
            title,
            url,
            description,
            author,
        } => commands::post::cmd_post(
            &store,
            channel,
            FeedDraft {
                title,
                url,
                description,
                author,
            },
        ),
        Command::Show {
            ref channel,
            offset,
            limit,
            json,
        } => commands::show::cmd_show(
            &store,
            channel,
            offset,
            limit.unwrap_or(config.list_limit),
            json,
        ),
        Command::Rss { ref channel } => commands::rss::cmd_rss(&store, channel, config.list_limit),
        Command::Remove { ref channel, id } => commands::remove::cmd_remove(&store, channel, id),
    }
}
