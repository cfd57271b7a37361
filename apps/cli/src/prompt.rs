//! Interactive search prompt: each plain line replaces the search query, so
//! typing a few lines quickly behaves like a burst of keystrokes.

use anyhow::{Context, Result};
use client_core::{Dashboard, SearchController};
use shared::domain::ListIntent;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::warn;

use crate::render;

const HELP: &str = "\
type to search; an empty line clears the query
  :w N   add result N to Watched
  :t N   add result N to Want to Watch
  :d     hide the result list
  :l     show your lists
  :q     quit";

#[derive(Debug, Clone, PartialEq)]
pub enum PromptInput {
    Query(String),
    Select { index: usize, intent: ListIntent },
    Dismiss,
    ShowLists,
    Help,
    Quit,
}

pub fn parse_input(line: &str) -> Result<PromptInput, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(command) = line.strip_prefix(':') else {
        return Ok(PromptInput::Query(line.to_string()));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();
    if parts.next().is_some() {
        return Err(format!("too many arguments for :{name}"));
    }

    match (name, arg) {
        ("w", Some(n)) | ("t", Some(n)) => {
            let position: usize = n
                .parse()
                .map_err(|_| format!("'{n}' is not a result number"))?;
            if position == 0 {
                return Err("result numbers start at 1".to_string());
            }
            let intent = if name == "w" {
                ListIntent::Watched
            } else {
                ListIntent::WantToWatch
            };
            Ok(PromptInput::Select {
                index: position - 1,
                intent,
            })
        }
        ("w", None) | ("t", None) => Err(format!(":{name} needs a result number")),
        ("d", None) => Ok(PromptInput::Dismiss),
        ("l", None) => Ok(PromptInput::ShowLists),
        ("h", None) | ("?", None) => Ok(PromptInput::Help),
        ("q", None) => Ok(PromptInput::Quit),
        _ => Err(format!("unknown command ':{command}' (try :h)")),
    }
}

pub async fn run(
    search: SearchController,
    dashboard: &mut Dashboard,
    initial_query: Option<String>,
) -> Result<()> {
    let mut events = search.subscribe_events();
    let mut selections = search
        .take_selections()
        .context("search selections are already consumed elsewhere")?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{HELP}");
    if let Some(query) = initial_query {
        search.on_query_change(query);
    }

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    break;
                };
                match parse_input(&line) {
                    Ok(PromptInput::Query(query)) => search.on_query_change(query),
                    Ok(PromptInput::Select { index, intent }) => {
                        if search.select_index(index, intent).is_none() {
                            println!("  no result number {}", index + 1);
                        }
                    }
                    Ok(PromptInput::Dismiss) => search.on_dismiss(),
                    Ok(PromptInput::ShowLists) => print!("{}", render::dashboard_lists(dashboard)),
                    Ok(PromptInput::Help) => println!("{HELP}"),
                    Ok(PromptInput::Quit) => break,
                    Err(message) => println!("  {message}"),
                }
            }
            event = events.recv() => match event {
                Ok(snapshot) => {
                    if let Some(out) = render::search_snapshot(&snapshot) {
                        println!("{out}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "prompt fell behind search events"),
                Err(RecvError::Closed) => break,
            },
            Some(selection) = selections.recv() => {
                match dashboard.add_selection(&selection).await {
                    Ok(movie) => println!("  added {}", render::movie_line(&movie)),
                    Err(err) => println!("  could not add {}: {err}", selection.candidate.title),
                }
            }
        }
    }

    search.shutdown();
    while let Ok(selection) = selections.try_recv() {
        match dashboard.add_selection(&selection).await {
            Ok(movie) => println!("  added {}", render::movie_line(&movie)),
            Err(err) => println!("  could not add {}: {err}", selection.candidate.title),
        }
    }
    Ok(())
}
