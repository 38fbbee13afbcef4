use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use kvtree_engine::{
    canonical_json, ExportedNode, KvTree, TraversalStrategy, TraverseOptions, TreeConfig, Visit,
};
use kvtree_path::{create_path, parse_path};
use kvtree_store::FileKvStore;
use serde_json::Value;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => TreeConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TreeConfig::default(),
    };

    // Codec commands never touch the store.
    match cli.command {
        Command::Encode(args) => return cmd_encode(&config, args),
        Command::Decode(args) => return cmd_decode(&config, args, cli.format),
        _ => {}
    }

    let store = FileKvStore::open(&cli.store)
        .with_context(|| format!("opening store {}", cli.store.display()))?;
    let tree = KvTree::new(Arc::new(store), config);
    let format = cli.format;

    match cli.command {
        Command::Init => cmd_init(&tree).await,
        Command::Create(args) => cmd_create(&tree, args).await,
        Command::Get(args) => cmd_get(&tree, args).await,
        Command::Set(args) => cmd_set(&tree, args).await,
        Command::Ls(args) => cmd_ls(&tree, args, format).await,
        Command::Rm(args) => cmd_rm(&tree, args).await,
        Command::Mv(args) => cmd_mv(&tree, args).await,
        Command::Tree(args) => cmd_tree(&tree, args).await,
        Command::Find(args) => cmd_find(&tree, args, format).await,
        Command::Stats(args) => cmd_stats(&tree, args, format).await,
        Command::Export(args) => cmd_export(&tree, args).await,
        Command::Import(args) => cmd_import(&tree, args).await,
        Command::Encode(_) | Command::Decode(_) => Ok(()),
    }
}

/// Values on the command line are JSON when they parse, plain strings
/// otherwise.
fn parse_value(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn show_path(tree: &KvTree, path: &[String]) -> String {
    format!("/{}", tree.format_path(path))
}

async fn cmd_init(tree: &KvTree) -> anyhow::Result<()> {
    if tree.initialize_root().await? {
        println!("{} Initialized tree {}", "✓".green().bold(), tree.config().prefix.bold());
    } else {
        println!("Tree {} already initialized", tree.config().prefix.bold());
    }
    Ok(())
}

async fn cmd_create(tree: &KvTree, args: CreateArgs) -> anyhow::Result<()> {
    let path = tree.parse_path(&args.path);
    let value = args.value.as_deref().map(parse_value).unwrap_or(Value::Null);
    tree.create_node(&path, &value).await?;
    println!("{} Created {}", "✓".green().bold(), show_path(tree, &path).yellow());
    Ok(())
}

async fn cmd_get(tree: &KvTree, args: PathArgs) -> anyhow::Result<()> {
    let path = tree.parse_path(&args.path);
    let value = tree.get_value(&path).await?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

async fn cmd_set(tree: &KvTree, args: SetArgs) -> anyhow::Result<()> {
    let path = tree.parse_path(&args.path);
    tree.set_value(&path, &parse_value(&args.value)).await?;
    println!("{} Updated {}", "✓".green().bold(), show_path(tree, &path).yellow());
    Ok(())
}

async fn cmd_ls(tree: &KvTree, args: OptionalPathArgs, format: OutputFormat) -> anyhow::Result<()> {
    let path = tree.parse_path(&args.path);
    let children = tree.get_children(&path).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&children)?),
        OutputFormat::Text if children.is_empty() => println!("{}", "(no children)".dimmed()),
        OutputFormat::Text => {
            for child in &children {
                println!("{}", tree.format_path(&[child.clone()]).cyan());
            }
        }
    }
    Ok(())
}

async fn cmd_rm(tree: &KvTree, args: PathArgs) -> anyhow::Result<()> {
    let path = tree.parse_path(&args.path);
    let removed = tree.delete_node(&path).await?;
    println!(
        "{} Deleted {} ({} node{})",
        "✓".green().bold(),
        show_path(tree, &path).yellow(),
        removed,
        if removed == 1 { "" } else { "s" }
    );
    Ok(())
}

async fn cmd_mv(tree: &KvTree, args: MoveArgs) -> anyhow::Result<()> {
    let source = tree.parse_path(&args.source);
    let target = tree.parse_path(&args.target_parent);
    let destination = tree.move_node(&source, &target, &args.new_key).await?;
    println!(
        "{} Moved {} → {}",
        "✓".green().bold(),
        show_path(tree, &source).yellow(),
        show_path(tree, &destination).yellow()
    );
    Ok(())
}

async fn cmd_tree(tree: &KvTree, args: TreeArgs) -> anyhow::Result<()> {
    let start = tree.parse_path(&args.path);
    let options = TraverseOptions {
        strategy: if args.breadth_first {
            TraversalStrategy::BreadthFirst
        } else {
            TraversalStrategy::DepthFirst
        },
        max_depth: args.max_depth,
        ..TraverseOptions::default()
    };

    let mut lines = Vec::new();
    tree.traverse(&start, &options, |node, depth| {
        let label = match node.key() {
            Some(key) => tree.format_path(&[key.to_string()]),
            None => "/".to_string(),
        };
        let line = if args.breadth_first {
            format!("{} {}", show_path(tree, &node.path).cyan(), canonical_json(&node.value).dimmed())
        } else {
            format!("{}{} {}", "  ".repeat(depth), label.cyan(), canonical_json(&node.value).dimmed())
        };
        lines.push(line);
        Visit::Continue
    })
    .await?;

    for line in lines {
        println!("{line}");
    }
    Ok(())
}

async fn cmd_find(tree: &KvTree, args: FindArgs, format: OutputFormat) -> anyhow::Result<()> {
    let start = tree.parse_path(&args.path);
    let found = tree
        .find_nodes(&start, |node| match &node.value {
            Value::String(s) => s.contains(&args.text),
            other => canonical_json(other).contains(&args.text),
        })
        .await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&found)?),
        OutputFormat::Text => {
            for node in &found {
                println!("{} {}", show_path(tree, &node.path).yellow(), canonical_json(&node.value));
            }
            println!("{} match{}", found.len(), if found.len() == 1 { "" } else { "es" });
        }
    }
    Ok(())
}

async fn cmd_stats(tree: &KvTree, args: OptionalPathArgs, format: OutputFormat) -> anyhow::Result<()> {
    let start = tree.parse_path(&args.path);
    let stats = tree.get_stats(&start).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Text => {
            println!("Stats for {}", show_path(tree, &start).yellow().bold());
            println!("  Nodes:    {}", stats.node_count.to_string().bold());
            println!("  Leaves:   {}", stats.leaf_count);
            println!("  Internal: {}", stats.internal_node_count);
            println!("  Depth:    {}", stats.max_depth);
            println!("  Size:     {} bytes", stats.total_size);
        }
    }
    Ok(())
}

async fn cmd_export(tree: &KvTree, args: OptionalPathArgs) -> anyhow::Result<()> {
    let start = tree.parse_path(&args.path);
    let exported = tree.export_tree(&start).await?;
    println!("{}", serde_json::to_string_pretty(&exported)?);
    Ok(())
}

async fn cmd_import(tree: &KvTree, args: ImportArgs) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("reading {}", args.file.display()))?;
    let data: ExportedNode = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", args.file.display()))?;
    let written = tree.import_tree(&data).await?;
    println!("{} Imported {} nodes", "✓".green().bold(), written.to_string().bold());
    Ok(())
}

fn cmd_encode(config: &TreeConfig, args: EncodeArgs) -> anyhow::Result<()> {
    println!("{}", create_path(&args.segments, &config.escapes));
    Ok(())
}

fn cmd_decode(config: &TreeConfig, args: DecodeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let segments = parse_path(&args.path, &config.escapes);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&segments)?),
        OutputFormat::Text => {
            for segment in &segments {
                println!("{segment}");
            }
        }
    }
    Ok(())
}
