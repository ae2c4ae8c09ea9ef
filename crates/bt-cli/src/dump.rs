use crate::cmd::DumpArgs;
use crate::utils::{load_grammar, read_input};
use anyhow::{Context, Result};
use bt_bbcode_parser::Translator;
use serde::Serialize;
use std::fmt::Debug;

/// Print scanned tokens.
pub async fn run_tokens_command(args: DumpArgs) -> Result<()> {
    let translator = Translator::new(load_grammar(&args.grammar).await?);
    let content = read_input(args.file.as_deref()).await?;
    print_value(&translator.scan(content.as_str()), args.json)
}

/// Print parsed document tree.
pub async fn run_tree_command(args: DumpArgs) -> Result<()> {
    let translator = Translator::new(load_grammar(&args.grammar).await?);
    let content = read_input(args.file.as_deref()).await?;
    print_value(&translator.parse(content.as_str()), args.json)
}

fn print_value<T: Debug + Serialize>(value: &T, json: bool) -> Result<()> {
    if json {
        let data = serde_json::to_string_pretty(value).context("when serializing to json")?;
        println!("{data}");
    } else {
        println!("{value:#?}");
    }
    Ok(())
}
