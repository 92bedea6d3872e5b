use std::path::{Path, PathBuf};

use expanduser::expanduser;
use inquire::{autocompletion::Replacement, Autocomplete, CustomUserError};

/// Suggestions shown at once.
const SUGGESTION_LIMIT: usize = 15;

/// Tab completion of filesystem paths for inquire prompts. Directories are
/// suggested with a trailing slash.
#[derive(Clone, Default)]
pub struct PathCompleter {
    input: String,
    suggestions: Vec<String>,
    common_prefix: String,
}

impl PathCompleter {
    fn refresh(&mut self, input: &str) -> Result<(), CustomUserError> {
        if input == self.input {
            return Ok(());
        }
        self.input = input.to_owned();

        let typed = expanduser(input)?;
        let parent = match typed.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let dir = if input.ends_with('/') {
            typed.clone()
        } else {
            parent.clone()
        };

        let entries = match std::fs::read_dir(&dir) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => std::fs::read_dir(&parent),
            other => other,
        }?;

        let typed_str = typed.to_string_lossy();
        let mut suggestions: Vec<String> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path != &typed && path.to_string_lossy().starts_with(&*typed_str))
            .map(|path| display_path(&path))
            .take(SUGGESTION_LIMIT)
            .collect();
        suggestions.sort();

        self.common_prefix = common_prefix(&suggestions);
        self.suggestions = suggestions;
        Ok(())
    }
}

fn display_path(path: &Path) -> String {
    if path.is_dir() {
        format!("{}/", path.to_string_lossy())
    } else {
        path.to_string_lossy().to_string()
    }
}

/// Longest shared prefix of sorted `words`: only the first and last need
/// comparing.
fn common_prefix(words: &[String]) -> String {
    let (Some(first), Some(last)) = (words.first(), words.last()) else {
        return String::new();
    };
    first
        .chars()
        .zip(last.chars())
        .take_while(|(a, b)| a == b)
        .map(|(c, _)| c)
        .collect()
}

impl Autocomplete for PathCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        match self.refresh(input) {
            Ok(()) => Ok(self.suggestions.clone()),
            Err(_) => Ok(vec![]),
        }
    }

    fn get_completion(
        &mut self,
        input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        if self.refresh(input).is_err() {
            return Ok(Replacement::None);
        }

        Ok(match highlighted_suggestion {
            Some(suggestion) => Replacement::Some(suggestion),
            None if self.common_prefix.is_empty() => Replacement::None,
            None => Replacement::Some(self.common_prefix.clone()),
        })
    }
}
