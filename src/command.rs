//! Command Module
//!
//! Line-oriented text commands for driving a `LruCache<String, String>`,
//! and the JSON responses written back for each of them.
//!
//! ```text
//! PUT <key> <value...>
//! GET <key>
//! PEEK <key>
//! KEYS
//! STATS
//! ```
//!
//! Command words are case-insensitive. Blank lines and lines starting with
//! `#` are skipped.

use std::io::{BufRead, Write};

use anyhow::Context;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{CacheStats, LruCache};
use crate::error::{CacheError, Result};

// == Command ==
/// A parsed cache command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Put { key: String, value: String },
    Get { key: String },
    Peek { key: String },
    Keys,
    Stats,
}

impl Command {
    /// Parses one input line.
    ///
    /// Returns `Ok(None)` for blank lines and `#` comments.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (word, rest) = split_token(line);
        let command = match word.to_ascii_uppercase().as_str() {
            "PUT" => {
                let (key, value) = split_token(rest);
                if key.is_empty() || value.is_empty() {
                    return Err(CacheError::InvalidCommand(
                        "PUT requires a key and a value".to_string(),
                    ));
                }
                Command::Put {
                    key: key.to_string(),
                    value: value.to_string(),
                }
            }
            "GET" => Command::Get {
                key: single_key("GET", rest)?,
            },
            "PEEK" => Command::Peek {
                key: single_key("PEEK", rest)?,
            },
            "KEYS" => {
                no_arguments("KEYS", rest)?;
                Command::Keys
            }
            "STATS" => {
                no_arguments("STATS", rest)?;
                Command::Stats
            }
            other => {
                return Err(CacheError::InvalidCommand(format!(
                    "unknown command '{}'",
                    other
                )))
            }
        };
        Ok(Some(command))
    }

    /// Runs the command against `cache` and builds its response.
    pub fn execute(self, cache: &mut LruCache<String, String>) -> Response {
        match self {
            Command::Put { key, value } => {
                let evicted = cache.push(key.clone(), value).map(|(k, _)| k);
                Response::Put { key, evicted }
            }
            Command::Get { key } => {
                let value = cache.get(&key).cloned();
                Response::Get { key, value }
            }
            Command::Peek { key } => {
                let value = cache.peek(&key).cloned();
                Response::Peek { key, value }
            }
            Command::Keys => Response::Keys {
                keys: cache.keys().cloned().collect(),
            },
            Command::Stats => Response::Stats(StatsResponse::from(cache.stats())),
        }
    }
}

/// Splits off the first whitespace-delimited token.
fn split_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim()),
        None => (s, ""),
    }
}

fn single_key(word: &str, rest: &str) -> Result<String> {
    let (key, extra) = split_token(rest);
    if key.is_empty() || !extra.is_empty() {
        return Err(CacheError::InvalidCommand(format!(
            "{} requires exactly one key",
            word
        )));
    }
    Ok(key.to_string())
}

fn no_arguments(word: &str, rest: &str) -> Result<()> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(CacheError::InvalidCommand(format!(
            "{} takes no arguments",
            word
        )))
    }
}

// == Responses ==
/// Response body for a successfully parsed command.
///
/// A `null` value on `get`/`peek` means the key is not cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Response {
    Put {
        key: String,
        evicted: Option<String>,
    },
    Get {
        key: String,
        value: Option<String>,
    },
    Peek {
        key: String,
        value: Option<String>,
    },
    Keys {
        keys: Vec<String>,
    },
    Stats(StatsResponse),
}

/// Response body for the STATS command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub insertions: u64,
    pub updates: u64,
    pub total_entries: usize,
    pub capacity: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            insertions: stats.insertions,
            updates: stats.updates,
            total_entries: stats.total_entries,
            capacity: stats.capacity,
        }
    }
}

/// Error response body for lines that fail to parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

// == Line Processing ==
/// Parses and executes one line, returning the JSON response to emit.
///
/// Skipped lines produce `None`; malformed lines produce an error body.
pub fn process_line(
    cache: &mut LruCache<String, String>,
    line: &str,
) -> serde_json::Result<Option<String>> {
    match Command::parse(line) {
        Ok(None) => Ok(None),
        Ok(Some(command)) => {
            debug!(?command, "executing command");
            serde_json::to_string(&command.execute(cache)).map(Some)
        }
        Err(e) => {
            warn!("{}", e);
            serde_json::to_string(&ErrorResponse::new(e.to_string())).map(Some)
        }
    }
}

/// Replays every line of `input` against `cache`, writing one JSON
/// response per line to `output`.
///
/// A line that is not valid UTF-8 gets an error body like any other
/// malformed line. Only read and write failures end the session.
///
/// Returns the number of responses written.
pub fn run_session<R, W>(
    cache: &mut LruCache<String, String>,
    mut input: R,
    mut output: W,
) -> anyhow::Result<usize>
where
    R: BufRead,
    W: Write,
{
    let mut written = 0;
    let mut buf = Vec::new();
    let mut number = 0;
    loop {
        buf.clear();
        let read = input
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("failed to read input line {}", number + 1))?;
        if read == 0 {
            break;
        }
        number += 1;

        let response = match std::str::from_utf8(&buf) {
            Ok(line) => process_line(cache, line),
            Err(_) => {
                let message = format!("line {} is not valid UTF-8", number);
                warn!("{}", message);
                serde_json::to_string(&ErrorResponse::new(message)).map(Some)
            }
        }
        .with_context(|| format!("failed to encode response for line {}", number))?;

        if let Some(response) = response {
            writeln!(output, "{}", response).context("failed to write response")?;
            written += 1;
        }
    }
    output.flush().context("failed to flush output")?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn cache(capacity: usize) -> LruCache<String, String> {
        LruCache::new(capacity).unwrap()
    }

    fn run(cache: &mut LruCache<String, String>, line: &str) -> Value {
        let json = process_line(cache, line).unwrap().unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_parse_put_keeps_spaces_in_value() {
        let command = Command::parse("put greeting hello  there world").unwrap();
        assert_eq!(
            command,
            Some(Command::Put {
                key: "greeting".to_string(),
                value: "hello  there world".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(
            Command::parse("  Get k1 ").unwrap(),
            Some(Command::Get {
                key: "k1".to_string()
            })
        );
        assert_eq!(Command::parse("stats").unwrap(), Some(Command::Stats));
        assert_eq!(Command::parse("KeYs").unwrap(), Some(Command::Keys));
    }

    #[test]
    fn test_parse_skips_blank_and_comments() {
        assert_eq!(Command::parse("").unwrap(), None);
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(Command::parse("# PUT a b").unwrap(), None);
    }

    #[test]
    fn test_parse_errors() {
        for line in ["PUT", "PUT onlykey", "GET", "GET a b", "PEEK", "KEYS x", "STATS now", "DEL a"] {
            assert!(
                matches!(Command::parse(line), Err(CacheError::InvalidCommand(_))),
                "line {:?} should be rejected",
                line
            );
        }
    }

    #[test]
    fn test_execute_put_reports_eviction() {
        let mut cache = cache(1);

        let first = run(&mut cache, "PUT a 1");
        assert_eq!(first["op"], "put");
        assert!(first["evicted"].is_null());

        let overwrite = run(&mut cache, "PUT a 2");
        assert!(overwrite["evicted"].is_null());

        let second = run(&mut cache, "PUT b 3");
        assert_eq!(second["evicted"], "a");
    }

    #[test]
    fn test_execute_get_and_peek() {
        let mut cache = cache(2);
        run(&mut cache, "PUT a 1");

        let hit = run(&mut cache, "GET a");
        assert_eq!(hit["op"], "get");
        assert_eq!(hit["value"], "1");

        let miss = run(&mut cache, "GET zz");
        assert_eq!(miss["key"], "zz");
        assert!(miss["value"].is_null());

        let peek = run(&mut cache, "PEEK a");
        assert_eq!(peek["op"], "peek");
        assert_eq!(peek["value"], "1");
    }

    #[test]
    fn test_execute_keys_in_recency_order() {
        let mut cache = cache(3);
        run(&mut cache, "PUT a 1");
        run(&mut cache, "PUT b 2");
        run(&mut cache, "GET a");

        let keys = run(&mut cache, "KEYS");
        assert_eq!(keys["keys"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn test_execute_stats() {
        let mut cache = cache(2);
        run(&mut cache, "PUT a 1");
        run(&mut cache, "GET a");
        run(&mut cache, "GET b");

        let stats = run(&mut cache, "STATS");
        assert_eq!(stats["op"], "stats");
        assert_eq!(stats["hits"], 1);
        assert_eq!(stats["misses"], 1);
        assert_eq!(stats["total_entries"], 1);
        assert_eq!(stats["hit_rate"], 0.5);
    }

    #[test]
    fn test_process_line_error_body() {
        let mut cache = cache(2);

        let error = run(&mut cache, "FLY away");
        assert!(error["error"].as_str().unwrap().contains("unknown command"));
    }

    #[test]
    fn test_process_line_skip() {
        let mut cache = cache(2);
        assert_eq!(process_line(&mut cache, "# nothing").unwrap(), None);
    }

    #[test]
    fn test_run_session_counts_responses() {
        let mut cache = cache(2);
        let input = "PUT a 1\n\n# comment\nGET a\nBOGUS\n";
        let mut output = Vec::new();

        let written = run_session(&mut cache, input.as_bytes(), &mut output).unwrap();

        assert_eq!(written, 3);
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_run_session_last_line_without_newline() {
        let mut cache = cache(2);
        let mut output = Vec::new();

        let written =
            run_session(&mut cache, "PUT a 1\r\nGET a".as_bytes(), &mut output).unwrap();

        assert_eq!(written, 2);
        let text = String::from_utf8(output).unwrap();
        let last: Value = serde_json::from_str(text.lines().last().unwrap()).unwrap();
        assert_eq!(last["value"], "1");
    }
}
