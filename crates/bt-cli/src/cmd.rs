use crate::dump::{run_tokens_command, run_tree_command};
use crate::translate::run_translate_command;
use anyhow::Result;
use clap::{ArgAction, ValueEnum};
use clap::{Args, Parser, Subcommand};

///////// Groups /////////

/// Built-in grammars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GrammarKind {
    /// Canonical bbcode.
    Bbcode,

    /// Html, text escaped.
    Html,

    /// Markdown.
    Markdown,
}

#[derive(Clone, Debug, Args)]
#[group(required = false, multiple = false)]
pub struct GrammarGroup {
    #[arg(
        short = 'g',
        long = "grammar",
        value_enum,
        help = "built-in output grammar, defaults to bbcode"
    )]
    pub grammar: Option<GrammarKind>,

    #[arg(
        long = "grammar-file",
        help = "path to a toml file defining the tags and output grammar"
    )]
    pub grammar_file: Option<String>,
}

///////// Args /////////

#[derive(Clone, Debug, Args)]
pub struct TranslateArgs {
    #[arg(help = "Files to translate. Read stdin when none given")]
    pub files: Vec<String>,

    #[command(flatten)]
    pub grammar: GrammarGroup,

    #[arg(
        short = 'q',
        long = "quiet",
        help = "Do not print progress to stderr",
        default_value = "false",
        action = ArgAction::SetTrue,
    )]
    pub quiet: bool,

    #[arg(
        short = 'j',
        long = "jobs",
        help = "Count of files read at the same time",
        default_value = "8"
    )]
    pub jobs: usize,
}

#[derive(Clone, Debug, Args)]
pub struct DumpArgs {
    #[arg(help = "File path to parse content. Read stdin when omitted")]
    pub file: Option<String>,

    #[command(flatten)]
    pub grammar: GrammarGroup,

    #[arg(
        long = "json",
        help = "Print in json format",
        default_value = "false",
        action = ArgAction::SetTrue,
    )]
    pub json: bool,
}

///////// Subcommand /////////

#[derive(Clone, Debug, Parser)]
#[command(version, about = "Translate bbcode documents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    #[command(about = "translate files and write the result to stdout")]
    Translate(TranslateArgs),

    #[command(about = "print scanned tokens of a file")]
    Tokens(DumpArgs),

    #[command(about = "print parsed document tree of a file")]
    Tree(DumpArgs),
}

/// Main entry of all subcommands.
pub async fn run_command_with_args(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Translate(translate_args) => run_translate_command(translate_args).await,
        Command::Tokens(dump_args) => run_tokens_command(dump_args).await,
        Command::Tree(dump_args) => run_tree_command(dump_args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_translate_args() {
        let cli = Cli::try_parse_from(["bt-cli", "translate", "-g", "html", "-q", "a.txt", "b.txt"])
            .unwrap();
        let Command::Translate(args) = cli.command else {
            panic!("expected translate command");
        };
        assert_eq!(args.files, vec!["a.txt", "b.txt"]);
        assert_eq!(args.grammar.grammar, Some(GrammarKind::Html));
        assert!(args.quiet);
        assert_eq!(args.jobs, 8);
    }

    #[test]
    fn test_grammar_options_conflict() {
        let result = Cli::try_parse_from([
            "bt-cli",
            "translate",
            "--grammar",
            "html",
            "--grammar-file",
            "x.toml",
        ]);
        assert!(result.is_err());
    }
}
