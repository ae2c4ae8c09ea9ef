use crate::cmd::TranslateArgs;
use crate::utils::{load_grammar, ordered_future, read_input};
use anyhow::{Context, Result};
use bt_bbcode_parser::Translator;
use std::io::Write;
use tracing::trace;

pub async fn run_translate_command(args: TranslateArgs) -> Result<()> {
    trace!("running translate command with args: {args:?}");

    let translator = Translator::new(load_grammar(&args.grammar).await?);

    let outputs = if args.files.is_empty() {
        vec![translator.translate(read_input(None).await?.as_str())]
    } else {
        let translator = &translator;
        let quiet = args.quiet;
        ordered_future(args.files.iter(), args.jobs, |file| async move {
            if !quiet {
                eprintln!("Reading {file}...");
            }
            let content = read_input(Some(file.as_str())).await?;
            Ok(translator.translate(content.as_str()))
        })
        .await?
    };

    let mut stdout = std::io::stdout().lock();
    for output in outputs {
        stdout
            .write_all(output.as_bytes())
            .context("when writing output")?;
    }
    stdout.flush().context("when writing output")?;
    Ok(())
}
