use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "kvtree",
    about = "Path-addressed trees over a flat key-value store",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// JSON file backing the key-value store
    #[arg(long, global = true, default_value = "kvtree.json")]
    pub store: PathBuf,

    /// TOML file with tree settings (prefix, retries, escapes)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

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

#[derive(Subcommand)]
pub enum Command {
    /// Create the root node if it does not exist
    Init,
    /// Create a node
    Create(CreateArgs),
    /// Print a node's value
    Get(PathArgs),
    /// Replace a node's value
    Set(SetArgs),
    /// List a node's children
    Ls(OptionalPathArgs),
    /// Delete a node and its subtree
    Rm(PathArgs),
    /// Move a subtree under a new parent
    Mv(MoveArgs),
    /// Print a subtree
    Tree(TreeArgs),
    /// Find nodes whose value contains some text
    Find(FindArgs),
    /// Show node counts and depth
    Stats(OptionalPathArgs),
    /// Write a subtree as JSON to stdout
    Export(OptionalPathArgs),
    /// Load an exported JSON tree
    Import(ImportArgs),
    /// Encode segments into an escaped path
    Encode(EncodeArgs),
    /// Decode an escaped path into segments
    Decode(DecodeArgs),
}

#[derive(Args)]
pub struct PathArgs {
    pub path: String,
}

#[derive(Args)]
pub struct OptionalPathArgs {
    #[arg(default_value = "/")]
    pub path: String,
}

#[derive(Args)]
pub struct CreateArgs {
    pub path: String,
    /// JSON value; text that is not valid JSON is stored as a string
    pub value: Option<String>,
}

#[derive(Args)]
pub struct SetArgs {
    pub path: String,
    pub value: String,
}

#[derive(Args)]
pub struct MoveArgs {
    pub source: String,
    pub target_parent: String,
    pub new_key: String,
}

#[derive(Args)]
pub struct TreeArgs {
    #[arg(default_value = "/")]
    pub path: String,
    #[arg(long)]
    pub breadth_first: bool,
    #[arg(long)]
    pub max_depth: Option<usize>,
}

#[derive(Args)]
pub struct FindArgs {
    pub text: String,
    #[arg(default_value = "/")]
    pub path: String,
}

#[derive(Args)]
pub struct ImportArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct EncodeArgs {
    #[arg(required = true)]
    pub segments: Vec<String>,
}

#[derive(Args)]
pub struct DecodeArgs {
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["kvtree", "ls", "docs", "--store", "t.json", "-v"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.store, PathBuf::from("t.json"));
        assert!(matches!(cli.command, Command::Ls(OptionalPathArgs { ref path }) if path == "docs"));
    }

    #[test]
    fn tree_options() {
        let cli = Cli::try_parse_from(["kvtree", "tree", "--breadth-first", "--max-depth", "2"]).unwrap();
        match cli.command {
            Command::Tree(args) => {
                assert_eq!(args.path, "/");
                assert!(args.breadth_first);
                assert_eq!(args.max_depth, Some(2));
            }
            _ => panic!("expected tree"),
        }
    }

    #[test]
    fn encode_needs_a_segment() {
        assert!(Cli::try_parse_from(["kvtree", "encode"]).is_err());
    }
}
