use crate::cmd::{GrammarGroup, GrammarKind};
use anyhow::{Context, Result};
use bt_bbcode_parser::Grammar;
use futures::StreamExt;
use std::future::Future;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::debug;

impl From<GrammarKind> for Grammar {
    fn from(value: GrammarKind) -> Self {
        match value {
            GrammarKind::Bbcode => Grammar::bbcode(),
            GrammarKind::Html => Grammar::html(),
            GrammarKind::Markdown => Grammar::markdown(),
        }
    }
}

/// Load the grammar selected in args.
///
/// # Errors
///
/// When failed to read or parse the grammar file.
pub async fn load_grammar(group: &GrammarGroup) -> Result<Grammar> {
    if let Some(path) = group.grammar_file.as_ref() {
        debug!("loading grammar file {path}");
        let data = fs::read_to_string(path)
            .await
            .with_context(|| format!("when reading grammar file {path}"))?;
        return Grammar::from_toml(data.as_str())
            .with_context(|| format!("invalid grammar file {path}"));
    }

    Ok(group.grammar.unwrap_or(GrammarKind::Bbcode).into())
}

/// Read the whole content of file at `path`, or stdin if `None`.
///
/// # Errors
///
/// When failed to io on file or stdin, or content is not utf-8.
pub async fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .await
            .with_context(|| format!("when reading file {path}")),
        None => {
            let mut content = String::new();
            tokio::io::stdin()
                .read_to_string(&mut content)
                .await
                .context("when reading stdin")?;
            Ok(content)
        }
    }
}

/// Generate a series of tasks from `task_source` by running `closure`, run at most
/// `buffer_size` of them at the same time and return results in source order.
///
/// # Errors
///
/// Return error when any of the generated tasks failed.
#[allow(clippy::future_not_send)]
pub async fn ordered_future<T, U, W, V>(
    task_source: T,
    buffer_size: usize,
    closure: U,
) -> Result<Vec<V>>
where
    T: Iterator,
    U: FnMut(<T as Iterator>::Item) -> W,
    W: Future<Output = Result<V>> + Sized,
{
    let ret = futures::stream::iter(task_source.map(closure))
        .buffered(buffer_size.max(1))
        .collect::<Vec<Result<V>>>()
        .await
        .into_iter()
        .collect::<Result<Vec<V>>>()?;
    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_ordered_future_keeps_order() {
        let ret = ordered_future([30u64, 0, 10].into_iter(), 3, |x| async move {
            tokio::time::sleep(Duration::from_millis(x)).await;
            Ok(x)
        })
        .await
        .unwrap();
        assert_eq!(ret, vec![30, 0, 10]);
    }

    #[tokio::test]
    async fn test_ordered_future_fails() {
        let ret = ordered_future(0..3, 0, |x| async move {
            if x == 1 {
                anyhow::bail!("failed on {x}");
            }
            Ok(x)
        })
        .await;
        assert!(ret.is_err());
    }

    #[tokio::test]
    async fn test_load_default_grammar() {
        let group = GrammarGroup {
            grammar: None,
            grammar_file: None,
        };
        assert_eq!(load_grammar(&group).await.unwrap().name(), "bbcode");
        let group = GrammarGroup {
            grammar: Some(GrammarKind::Markdown),
            grammar_file: None,
        };
        assert_eq!(load_grammar(&group).await.unwrap().name(), "markdown");
    }

    #[tokio::test]
    async fn test_load_missing_grammar_file() {
        let group = GrammarGroup {
            grammar: None,
            grammar_file: Some("/nonexistent/grammar.toml".to_owned()),
        };
        assert!(load_grammar(&group).await.is_err());
    }
}
