use std::path::PathBuf;

use arbor_store::ObjectKind;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "arbor",
    about = "Arbor: build, inspect and hash git-compatible tree objects",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl From<ObjectType> for ObjectKind {
    fn from(ty: ObjectType) -> Self {
        match ty {
            ObjectType::Blob => ObjectKind::Blob,
            ObjectType::Tree => ObjectKind::Tree,
            ObjectType::Commit => ObjectKind::Commit,
            ObjectType::Tag => ObjectKind::Tag,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Build a tree from `ls-tree` formatted lines on stdin and print its id
    Mktree(MktreeArgs),
    /// List the entries of a raw tree object file
    LsTree(LsTreeArgs),
    /// Compute the object id of a file
    HashObject(HashObjectArgs),
}

#[derive(Args)]
pub struct MktreeArgs {
    /// Also print the canonical encoding, hex-dumped
    #[arg(long)]
    pub dump: bool,
}

#[derive(Args)]
pub struct LsTreeArgs {
    /// File holding the canonical tree encoding (no object header)
    pub file: PathBuf,
    /// Show only entry names
    #[arg(long)]
    pub name_only: bool,
}

#[derive(Args)]
pub struct HashObjectArgs {
    pub file: PathBuf,
    #[arg(short, long, default_value = "blob")]
    pub kind: ObjectType,
}
