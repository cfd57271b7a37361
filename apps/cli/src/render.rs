use client_core::{Dashboard, SearchPhase, SearchSnapshot};
use shared::domain::TrackedMovie;

pub fn movie_line(movie: &TrackedMovie) -> String {
    let mut line = format!("[{}] {}", movie.id, movie.title);
    if !movie.year.is_empty() {
        line.push_str(&format!(" ({})", movie.year));
    }
    if let Some(rating) = movie.rating {
        line.push_str(&format!(" - {rating}/10"));
    }
    if !movie.review.is_empty() {
        line.push_str(&format!(" \"{}\"", movie.review));
    }
    line
}

pub fn dashboard_lists(dashboard: &Dashboard) -> String {
    let mut out = String::from("Watched Movies\n");
    push_section(&mut out, dashboard.watched());
    out.push_str("\nWant to Watch\n");
    push_section(&mut out, dashboard.want_to_watch());
    if dashboard.unsorted().next().is_some() {
        out.push_str("\nNot on a list yet\n");
        push_section(&mut out, dashboard.unsorted());
    }
    out
}

fn push_section<'a>(out: &mut String, movies: impl Iterator<Item = &'a TrackedMovie>) {
    let mut empty = true;
    for movie in movies {
        empty = false;
        out.push_str("  ");
        out.push_str(&movie_line(movie));
        out.push('\n');
    }
    if empty {
        out.push_str("  (none)\n");
    }
}

/// What the prompt prints for a search state change, if anything.
pub fn search_snapshot(snapshot: &SearchSnapshot) -> Option<String> {
    match snapshot.phase {
        SearchPhase::ResultsShown if snapshot.dropdown_visible => {
            let mut out = String::new();
            for (i, candidate) in snapshot.candidates.iter().enumerate() {
                out.push_str(&format!(
                    "  {:>2}. {} ({})\n",
                    i + 1,
                    candidate.title,
                    candidate.year
                ));
            }
            out.push_str("  select with :w N (watched) or :t N (want to watch)");
            Some(out)
        }
        SearchPhase::ResultsShown => Some("  results hidden".to_string()),
        SearchPhase::NoResults => Some(format!("  no matches for '{}'", snapshot.query)),
        SearchPhase::Waiting => Some(format!("  searching for '{}'...", snapshot.query)),
        SearchPhase::Idle | SearchPhase::Typing => None,
    }
}
