//! Interactive choice of an LLM and an embedding model among the models
//! installed on the local Ollama server.

use std::fs;
use std::io::{self, BufRead, StdinLock, Stdout, Write};
use std::path::{Path, PathBuf};

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::rchain::ollama::{LocalModel, OllamaClient};

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LLM_PROMPT: &str = "\nPlease select a Large Language Model (LLM):";
pub const EMBEDDING_PROMPT: &str = "\nPlease select an Embedding Model:";
const CHOICE_PROMPT: &str = "Enter the number of your choice: ";

/// The file written at the end of a selection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    pub llm_model: String,
    pub embedding_model: String,
}

impl SelectionConfig {
    /// Two-space indented JSON, without a trailing newline.
    pub fn to_pretty_json(&self) -> Result<String, SelectionError> {
        serde_json::to_string_pretty(self).map_err(SelectionError::Serialize)
    }

    /// Replaces `path` with this config.
    pub fn save(&self, path: &Path) -> Result<String, SelectionError> {
        let rendered = self.to_pretty_json()?;
        fs::write(path, &rendered).map_err(|source| SelectionError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(rendered)
    }
}

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("'models' key not found in response from Ollama")]
    MissingModels { raw: Value },
    #[error("no local Ollama models found")]
    NoModels,
    #[error("failed to connect to Ollama at {host}: {source}")]
    Unreachable {
        host: String,
        source: reqwest::Error,
    },
    #[error("Ollama API error {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("unexpected response from Ollama: {0}")]
    Malformed(String),
    #[error("input closed before a model was selected")]
    InputClosed,
    #[error("selected model '{0}' is not in the listing")]
    UnknownModel(String),
    #[error("failed to read selection: {0}")]
    Io(#[from] io::Error),
    #[error("failed to write '{}': {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to serialize selection: {0}")]
    Serialize(serde_json::Error),
}

impl SelectionError {
    /// Outcomes reported as plain diagnostics rather than errors.
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::MissingModels { .. } | Self::NoModels)
    }
}

/// Source of model choices.
pub trait ModelSelector {
    /// Returns the `model` of the descriptor picked for `label`.
    fn select(&mut self, label: &str, models: &[LocalModel]) -> Result<String, SelectionError>;
}

/// Numbered menu on a text stream; re-prompts until a valid index is read.
pub struct ConsoleSelector<R, W> {
    input: R,
    output: W,
}

impl ConsoleSelector<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleSelector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> ModelSelector for ConsoleSelector<R, W> {
    fn select(&mut self, label: &str, models: &[LocalModel]) -> Result<String, SelectionError> {
        writeln!(self.output, "{label}")?;
        for (index, model) in models.iter().enumerate() {
            writeln!(self.output, "{}: {}", index + 1, model.model)?;
        }

        let mut line = Vec::new();
        loop {
            write!(self.output, "{CHOICE_PROMPT}")?;
            self.output.flush()?;

            line.clear();
            if self.input.read_until(b'\n', &mut line)? == 0 {
                return Err(SelectionError::InputClosed);
            }

            // Undecodable bytes are just another non-numeric answer.
            let choice = match std::str::from_utf8(&line) {
                Ok(text) => parse_choice(text, models.len()),
                Err(_) => Choice::NotANumber,
            };
            match choice {
                Choice::Index(index) => return Ok(models[index].model.clone()),
                Choice::OutOfRange => writeln!(self.output, "Invalid number. Please try again.")?,
                Choice::NotANumber => {
                    writeln!(self.output, "Invalid input. Please enter a number.")?
                }
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Choice {
    Index(usize),
    OutOfRange,
    NotANumber,
}

fn parse_choice(line: &str, count: usize) -> Choice {
    let line = line.trim();
    match line.parse::<i64>() {
        Ok(number) => match usize::try_from(number) {
            Ok(position) if (1..=count).contains(&position) => Choice::Index(position - 1),
            _ => Choice::OutOfRange,
        },
        // Integers past i64 are still numbers, just never a listed one.
        Err(_) if is_integer(line) => Choice::OutOfRange,
        Err(_) => Choice::NotANumber,
    }
}

fn is_integer(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit())
}

/// Prompts once with the shared menu and returns the picked model name.
pub fn prompt_selection<S: ModelSelector + ?Sized>(
    selector: &mut S,
    label: &str,
    models: &[LocalModel],
) -> Result<String, SelectionError> {
    let picked = selector.select(label, models)?;
    if !models.iter().any(|model| model.model == picked) {
        return Err(SelectionError::UnknownModel(picked));
    }
    debug!(label = label.trim(), model = %picked, "model selected");
    Ok(picked)
}

/// Builds a config from two picks against the same model list. Both picks
/// may name the same model.
pub fn choose_models<S: ModelSelector + ?Sized>(
    selector: &mut S,
    models: &[LocalModel],
) -> Result<SelectionConfig, SelectionError> {
    let llm_model = prompt_selection(selector, LLM_PROMPT, models)?;
    let embedding_model = prompt_selection(selector, EMBEDDING_PROMPT, models)?;
    Ok(SelectionConfig {
        llm_model,
        embedding_model,
    })
}

/// Lists models once, asks for both picks and writes `path`.
///
/// Nothing is written when listing fails or returns no models.
pub async fn select_and_save<S: ModelSelector + ?Sized>(
    ollama: &OllamaClient,
    selector: &mut S,
    path: &Path,
) -> Result<(SelectionConfig, String), SelectionError> {
    let models = ollama.list_models().await?;
    let config = choose_models(selector, &models)?;
    let rendered = config.save(path)?;
    debug!(path = %path.display(), "selection saved");
    Ok((config, rendered))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{
        Choice, ConsoleSelector, ModelSelector, SelectionConfig, SelectionError, choose_models,
        parse_choice, prompt_selection, select_and_save,
    };
    use crate::rchain::ollama::{LocalModel, OllamaClient};

    async fn ollama_returning(body: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    fn models() -> Vec<LocalModel> {
        vec![LocalModel::new("a"), LocalModel::new("b")]
    }

    fn console(input: &str) -> ConsoleSelector<Cursor<Vec<u8>>, Vec<u8>> {
        ConsoleSelector::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn parse_choice_accepts_only_listed_indices() {
        assert_eq!(parse_choice("1\n", 2), Choice::Index(0));
        assert_eq!(parse_choice(" 2 ", 2), Choice::Index(1));
        assert_eq!(parse_choice("0", 2), Choice::OutOfRange);
        assert_eq!(parse_choice("3", 2), Choice::OutOfRange);
        assert_eq!(parse_choice("-1", 2), Choice::OutOfRange);
        assert_eq!(parse_choice("two", 2), Choice::NotANumber);
        assert_eq!(parse_choice("", 2), Choice::NotANumber);
        assert_eq!(parse_choice("-", 2), Choice::NotANumber);
        assert_eq!(parse_choice("1.5", 2), Choice::NotANumber);
    }

    #[test]
    fn integers_beyond_i64_are_out_of_range() {
        assert_eq!(parse_choice("99999999999999999999", 2), Choice::OutOfRange);
        assert_eq!(parse_choice("-99999999999999999999", 2), Choice::OutOfRange);
        assert_eq!(parse_choice("+99999999999999999999\n", 2), Choice::OutOfRange);
    }

    #[test]
    fn invalid_utf8_line_is_treated_as_non_numeric() {
        let input = Cursor::new(b"\xff\xfe\n2\n".to_vec());
        let mut selector = ConsoleSelector::new(input, Vec::new());
        let picked = selector
            .select("Pick:", &models())
            .expect("selection should recover");
        assert_eq!(picked, "b");

        let output = String::from_utf8(selector.into_output()).expect("utf-8 output");
        assert_eq!(output.matches("Invalid input. Please enter a number.").count(), 1);
        assert_eq!(output.matches("Enter the number of your choice: ").count(), 2);
    }

    struct Scripted(Vec<&'static str>);

    impl ModelSelector for Scripted {
        fn select(&mut self, _: &str, _: &[LocalModel]) -> Result<String, SelectionError> {
            self.0.pop().map(str::to_string).ok_or(SelectionError::InputClosed)
        }
    }

    #[test]
    fn prompt_selection_rejects_models_outside_the_listing() {
        let err = prompt_selection(&mut Scripted(vec!["c"]), "Pick:", &models())
            .expect_err("c was never listed");
        assert!(matches!(err, SelectionError::UnknownModel(name) if name == "c"));

        let picked = prompt_selection(&mut Scripted(vec!["a"]), "Pick:", &models())
            .expect("a is listed");
        assert_eq!(picked, "a");
    }

    #[test]
    fn menu_is_numbered_from_one() {
        let mut selector = console("1\n");
        selector
            .select("Pick:", &models())
            .expect("selection should succeed");

        let output = String::from_utf8(selector.into_output()).expect("utf-8 output");
        assert!(output.starts_with("Pick:\n1: a\n2: b\nEnter the number of your choice: "));
    }

    #[test]
    fn invalid_entries_reprompt_until_valid() {
        let mut selector = console("0\n3\nabc\n2\n");
        let picked = selector
            .select("Pick:", &models())
            .expect("selection should succeed");
        assert_eq!(picked, "b");

        let output = String::from_utf8(selector.into_output()).expect("utf-8 output");
        assert_eq!(output.matches("Invalid number. Please try again.").count(), 2);
        assert_eq!(output.matches("Invalid input. Please enter a number.").count(), 1);
        assert_eq!(output.matches("Enter the number of your choice: ").count(), 4);
    }

    #[test]
    fn closed_input_stops_the_loop() {
        let mut selector = console("9\n");
        let err = selector
            .select("Pick:", &models())
            .expect_err("eof should fail");
        assert!(matches!(err, SelectionError::InputClosed));
    }

    #[test]
    fn picks_map_to_model_names_not_indices() {
        let mut selector = console("2\n1\n");
        let config = choose_models(&mut selector, &models()).expect("both picks should succeed");
        assert_eq!(
            config,
            SelectionConfig {
                llm_model: "b".to_string(),
                embedding_model: "a".to_string(),
            }
        );
    }

    #[test]
    fn same_model_may_be_picked_twice() {
        let mut selector = console("1\n1\n");
        let config = choose_models(&mut selector, &models()).expect("both picks should succeed");
        assert_eq!(config.llm_model, config.embedding_model);
    }

    #[test]
    fn config_renders_with_two_space_indent() {
        let config = SelectionConfig {
            llm_model: "b".to_string(),
            embedding_model: "a".to_string(),
        };
        assert_eq!(
            config.to_pretty_json().expect("config should serialize"),
            "{\n  \"llm_model\": \"b\",\n  \"embedding_model\": \"a\"\n}"
        );
    }

    #[test]
    fn save_overwrites_existing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{\"llm_model\": \"old\", \"extra\": true}").expect("seed file");

        let config = SelectionConfig {
            llm_model: "x".to_string(),
            embedding_model: "y".to_string(),
        };
        config.save(&path).expect("save should succeed");

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read back"))
                .expect("saved file should be JSON");
        assert_eq!(
            saved,
            serde_json::json!({"llm_model": "x", "embedding_model": "y"})
        );
    }

    #[tokio::test]
    async fn select_and_save_writes_chosen_models() {
        let server = ollama_returning(json!({"models": [{"model": "a"}, {"model": "b"}]})).await;
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.json");

        let mut selector = console("2\n1\n");
        let (config, rendered) =
            select_and_save(&OllamaClient::new(server.uri()), &mut selector, &path)
                .await
                .expect("selection should succeed");

        assert_eq!(config.llm_model, "b");
        assert_eq!(config.embedding_model, "a");
        assert_eq!(
            std::fs::read_to_string(&path).expect("config should exist"),
            rendered
        );
    }

    #[tokio::test]
    async fn missing_models_key_leaves_existing_file_untouched() {
        let server = ollama_returning(json!({"status": "ok"})).await;
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "previous").expect("seed file");

        let mut selector = console("1\n1\n");
        let err = select_and_save(&OllamaClient::new(server.uri()), &mut selector, &path)
            .await
            .expect_err("missing key should abort");

        assert!(err.is_soft());
        assert_eq!(std::fs::read_to_string(&path).expect("read back"), "previous");
    }

    #[tokio::test]
    async fn empty_model_list_writes_nothing() {
        let server = ollama_returning(json!({"models": []})).await;
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.json");

        let mut selector = console("");
        let err = select_and_save(&OllamaClient::new(server.uri()), &mut selector, &path)
            .await
            .expect_err("empty list should abort");

        assert!(matches!(err, SelectionError::NoModels));
        assert!(!path.exists());
    }
}
