use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use collection_memberships::connection::config::{ENV_API_TOKEN, ENV_API_URL};
use collection_memberships::{
    ApiConfig, CollectionPermission, CreateMembership, DeleteMembership, PageParams, RootStore,
};
use serde::Serialize;
use serde_json::json;

#[derive(Parser)]
#[command(name = "memberships")]
#[command(about = "Inspect and edit collection group memberships")]
struct Cli {
    /// Server origin
    #[arg(long, env = ENV_API_URL)]
    url: String,

    /// API token
    #[arg(long, env = ENV_API_TOKEN, hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List memberships, optionally for one collection
    List {
        #[arg(long)]
        collection: Option<String>,
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
        /// Follow pagination until exhausted
        #[arg(long)]
        all: bool,
    },
    /// Grant a group access to a collection
    Add {
        #[arg(long)]
        collection: String,
        #[arg(long)]
        group: String,
        #[arg(long)]
        permission: Option<CollectionPermission>,
    },
    /// Revoke a group's access to a collection
    Remove {
        #[arg(long)]
        collection: String,
        #[arg(long)]
        group: String,
    },
    /// Show the membership linking a collection and a group
    Find {
        #[arg(long)]
        collection: String,
        #[arg(long)]
        group: String,
    },
    /// Show a single group
    Group {
        #[arg(long)]
        id: String,
    },
}

pub struct App {
    cli: Cli,
}

impl App {
    pub fn from_args() -> Self {
        Self { cli: Cli::parse() }
    }

    pub async fn run(self) -> Result<()> {
        let mut config = ApiConfig::from_url(&self.cli.url).context("invalid --url")?;
        if let Some(token) = &self.cli.token {
            config = config.token(token);
        }
        let root = RootStore::connect(config).context("build http client")?;
        let memberships = root.collection_group_memberships();

        match self.cli.command {
            Command::List {
                collection,
                query,
                limit,
                offset,
                all,
            } => {
                let mut params = PageParams::new();
                params.id = collection;
                params.query = query;
                params.limit = limit;
                params.offset = offset;

                if all {
                    let records = memberships
                        .fetch_all(params)
                        .await
                        .context("fetch memberships")?;
                    print_json(&records)?;
                } else {
                    let page = memberships
                        .fetch_page(&params)
                        .await
                        .context("fetch memberships page")?;
                    print_json(&json!({
                        "data": &*page,
                        "pagination": page.pagination(),
                    }))?;
                }
            }
            Command::Add {
                collection,
                group,
                permission,
            } => {
                let mut input = CreateMembership::new(collection, group);
                input.permission = permission;
                let created = memberships.create(input).await.context("add group")?;
                print_json(&created)?;
            }
            Command::Remove { collection, group } => {
                let removed = memberships
                    .delete(DeleteMembership::new(collection.clone(), group.clone()))
                    .await
                    .context("remove group")?;
                print_json(&json!({
                    "collectionId": collection,
                    "groupId": group,
                    "removed": removed,
                }))?;
            }
            Command::Find { collection, group } => {
                memberships
                    .fetch_all(PageParams::new().collection(collection.clone()))
                    .await
                    .context("fetch memberships")?;
                let found = memberships.find(&collection, &group).await;
                print_json(&found)?;
            }
            Command::Group { id } => {
                let group = root.groups().fetch(&id).await.context("fetch group")?;
                print_json(&group)?;
            }
        }

        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{out}");
    Ok(())
}
