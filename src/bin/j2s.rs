use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use json2state::store::ObjectKind;
use json2state::{Json2State, Options, StateStore, Value, logging, storage};
use std::fs;

#[derive(Parser)]
#[command(name = "j2s")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a JSON document into the store below PATH.
    Parse {
        store: String,
        path: String,
        input: String,
        #[arg(long)]
        options: Option<String>,
    },
    Show {
        store: String,
        prefix: Option<String>,
    },
    Delete {
        store: String,
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_console("info");
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            store,
            path,
            input,
            options,
        } => {
            let text = fs::read_to_string(&input)
                .with_context(|| format!("Failed to read file: {}", input))?;
            let value: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("Invalid JSON in {}", input))?;
            let options = match options {
                Some(file) => {
                    let raw = fs::read_to_string(&file)
                        .with_context(|| format!("Failed to read file: {}", file))?;
                    Options::from_json(&raw)?
                }
                None => Options::default(),
            };

            let (objects, memory) = storage::load_or_default(&store)?;
            let mut engine = Json2State::new(objects).with_memory(memory);
            engine.parse(&path, &Value::from(value), &options).await;
            let objects = engine.store().len();
            storage::save(&store, engine.store(), engine.memory())?;
            println!("Parsed {} into {} ({} objects)", input, store, objects);
        }

        Commands::Show { store, prefix } => {
            let (objects, _) = storage::load(&store)?;
            for (path, object) in objects.iter() {
                if let Some(p) = &prefix
                    && !json2state::path::is_within(path, p)
                {
                    continue;
                }
                match object.kind {
                    ObjectKind::Channel => println!("{}/", path),
                    ObjectKind::State => match &object.value {
                        Some(v) => println!("{} = {}", path, v),
                        None => println!("{} = <unset>", path),
                    },
                }
            }
        }

        Commands::Delete { store, path } => {
            let (mut objects, mut memory) = storage::load(&store)?;
            let before = objects.len();
            objects.delete_subtree(&path).await?;
            memory.purge(&path);
            storage::save(&store, &objects, &memory)?;
            println!("Deleted {} objects below {}", before - objects.len(), path);
        }
    }

    Ok(())
}
