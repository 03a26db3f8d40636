use std::io::{self, BufRead};

use anyhow::{bail, Context};
use arbor_sdk::Arbor;
use arbor_store::{ObjectKind, StoredObject};
use arbor_tree::{EntryMode, Tree, TreeEntry};
use arbor_types::ObjectId;
use colored::Colorize;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Mktree(args) => cmd_mktree(args, cli.format),
        Command::LsTree(args) => cmd_ls_tree(args, cli.format),
        Command::HashObject(args) => cmd_hash_object(args, cli.format),
    }
}

fn cmd_mktree(args: MktreeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let arbor = Arbor::in_memory();
    let mut tree = arbor.create_tree();

    for (lineno, line) in io::stdin().lock().lines().enumerate() {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let (attributes, id, name) =
            parse_line(&line).with_context(|| format!("line {}", lineno + 1))?;
        tree.add_entry(id, name, attributes)
            .with_context(|| format!("line {}", lineno + 1))?;
    }

    let id = arbor.save_tree(&mut tree)?;
    debug!(id = %id, entries = tree.len(), "built tree");

    match format {
        OutputFormat::Text => {
            println!("{}", id.to_string().yellow());
            if args.dump {
                println!("{}", hex::encode(tree.to_bytes()).dimmed());
            }
        }
        OutputFormat::Json => {
            let mut out = serde_json::json!({ "id": id, "entries": tree.len() });
            if args.dump {
                out["data"] = hex::encode(tree.to_bytes()).into();
            }
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

fn cmd_ls_tree(args: LsTreeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let data = std::fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let tree = Tree::from_bytes(&data)
        .with_context(|| format!("{} is not a tree object", args.file.display()))?;

    match format {
        OutputFormat::Text => {
            for entry in &tree {
                if args.name_only {
                    println!("{}", entry.name());
                } else {
                    println!("{}", render_entry(entry));
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(tree.entries())?);
        }
    }
    Ok(())
}

fn cmd_hash_object(args: HashObjectArgs, format: OutputFormat) -> anyhow::Result<()> {
    let data = std::fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let kind = ObjectKind::from(args.kind);
    let id = StoredObject::new(kind, data).compute_id();

    match format {
        OutputFormat::Text => println!("{id}"),
        OutputFormat::Json => {
            let out = serde_json::json!({ "id": id, "kind": kind });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

/// Parse one `git ls-tree` line: `<mode> SP <type> SP <id> TAB <name>`.
fn parse_line(line: &str) -> anyhow::Result<(u32, ObjectId, &str)> {
    let Some((meta, name)) = line.split_once('\t') else {
        bail!("expected a tab before the entry name");
    };
    let fields: Vec<&str> = meta.split_whitespace().collect();
    let &[mode, kind, id] = fields.as_slice() else {
        bail!("expected `<mode> <type> <id>`, got {meta:?}");
    };

    let attributes = u32::from_str_radix(mode, 8).with_context(|| format!("bad mode {mode:?}"))?;
    let id: ObjectId = id.parse().with_context(|| format!("bad object id {id:?}"))?;

    if let Some(mode) = EntryMode::from_mode_bits(attributes) {
        if mode.object_kind().as_str() != kind {
            bail!("mode {mode} is a {}, not a {kind}", mode.object_kind());
        }
    }
    Ok((attributes, id, name))
}

fn render_entry(entry: &TreeEntry) -> String {
    let kind = entry.mode().object_kind().as_str();
    let kind = if entry.is_directory() {
        kind.blue().to_string()
    } else {
        kind.normal().to_string()
    };
    format!("{} {} {}\t{}", entry.mode(), kind, entry.id(), entry.name())
}
