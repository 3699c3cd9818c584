use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::string::FromUtf8Error;

use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::debug;

use crate::ext::PathExt;
use crate::site::{ChangeEvent, ItemKind};

type Mapping<'input> = LinkedHashMap<Yaml<'input>, Yaml<'input>>;

/// An entry the owner constructs before any event is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: PathBuf,
    pub kind: ItemKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Published on the change feed, as a watcher would.
    Event(ChangeEvent),
    Select(PathBuf),
    BeginRename(PathBuf),
    Edit { path: PathBuf, name: String },
    Commit(PathBuf),
    Undo(PathBuf),
}

/// Paths inside a scenario are stored as written; [`Scenario::resolve`] anchors
/// them at `root`.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub root: PathBuf,
    pub tree: Vec<TreeEntry>,
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Loads a scenario file. A relative `root` is taken relative to the file's directory.
    pub async fn from_path(path: &Path) -> Result<Self, ScenarioError> {
        debug!("Reading scenario file: {}", path.best_effort_display());
        let bytes = fs::read(path).await.context(ReadSnafu {
            file_path: path.best_effort_display(),
        })?;
        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.best_effort_display(),
        })?;
        debug!("Read {} bytes of scenario", contents.len());

        let mut scenario = Scenario::try_from(contents.as_str())?;
        if scenario.root.is_relative() {
            let base = path.parent().unwrap_or(Path::new(""));
            scenario.root = base.join(&scenario.root).lexically_normalized();
        }
        Ok(scenario)
    }

    /// Anchors a scenario path at the root. Absolute paths are kept as they are.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path).lexically_normalized()
    }

    fn parse_tree(top_level: &Mapping<'_>) -> Result<Vec<TreeEntry>, ScenarioError> {
        let Some(tree) = lookup(top_level, "tree") else {
            return Ok(Vec::new());
        };
        let entries = tree.as_sequence().context(TreeNotListSnafu)?;

        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let raw = entry.as_str().context(InvalidTreeEntrySnafu { index })?;
                let kind = if raw.ends_with('/') {
                    ItemKind::Folder
                } else {
                    ItemKind::File
                };
                Ok(TreeEntry {
                    path: PathBuf::from(raw.trim_end_matches('/')),
                    kind,
                })
            })
            .collect()
    }

    fn parse_steps(top_level: &Mapping<'_>) -> Result<Vec<Step>, ScenarioError> {
        let Some(steps) = lookup(top_level, "steps") else {
            return Ok(Vec::new());
        };
        let steps = steps.as_sequence().context(StepsNotListSnafu)?;

        steps
            .iter()
            .enumerate()
            .map(|(index, step)| Self::parse_step(index, step))
            .collect()
    }

    fn parse_step(index: usize, step: &Yaml<'_>) -> Result<Step, ScenarioError> {
        let mapping = step.as_mapping().context(InvalidStepSnafu {
            index,
            reason: "a step must be a single-key map",
        })?;
        let mut entries = mapping.iter();
        let (Some((key, value)), None) = (entries.next(), entries.next()) else {
            return InvalidStepSnafu {
                index,
                reason: "a step must be a single-key map",
            }
            .fail();
        };
        let action = key.as_str().context(InvalidStepSnafu {
            index,
            reason: "the step name must be a string",
        })?;

        let step = match action {
            "created" => Step::Event(ChangeEvent::created(path_value(index, value)?)),
            "deleted" => Step::Event(ChangeEvent::deleted(path_value(index, value)?)),
            "renamed" => {
                let fields = field_map(index, value)?;
                Step::Event(ChangeEvent::renamed(
                    path_field(index, fields, "from")?,
                    path_field(index, fields, "to")?,
                ))
            }
            "select" => Step::Select(path_value(index, value)?),
            "begin_rename" => Step::BeginRename(path_value(index, value)?),
            "commit" => Step::Commit(path_value(index, value)?),
            "undo" => Step::Undo(path_value(index, value)?),
            "edit" => {
                let fields = field_map(index, value)?;
                Step::Edit {
                    path: path_field(index, fields, "path")?,
                    name: string_field(index, fields, "name")?.to_string(),
                }
            }
            other => {
                return UnknownStepSnafu {
                    index,
                    name: other.to_string(),
                }
                .fail();
            }
        };
        Ok(step)
    }
}

impl TryFrom<&str> for Scenario {
    type Error = ScenarioError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let document = documents.first().context(MalformedScenarioSnafu)?;
        let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;

        let root = lookup(top_level, "root")
            .and_then(|root| root.as_str())
            .context(MissingRootSnafu)?;

        Ok(Scenario {
            root: PathBuf::from(root),
            tree: Self::parse_tree(top_level)?,
            steps: Self::parse_steps(top_level)?,
        })
    }
}

fn lookup<'a, 'input>(mapping: &'a Mapping<'input>, key: &'static str) -> Option<&'a Yaml<'input>> {
    mapping.get(&Yaml::Value(Scalar::String(Cow::Borrowed(key))))
}

fn path_value(index: usize, value: &Yaml<'_>) -> Result<PathBuf, ScenarioError> {
    value.as_str().map(PathBuf::from).context(InvalidStepSnafu {
        index,
        reason: "expected a path",
    })
}

fn field_map<'a, 'input>(
    index: usize,
    value: &'a Yaml<'input>,
) -> Result<&'a Mapping<'input>, ScenarioError> {
    value.as_mapping().context(InvalidStepSnafu {
        index,
        reason: "expected a map of fields",
    })
}

fn string_field<'a>(
    index: usize,
    fields: &'a Mapping<'_>,
    key: &'static str,
) -> Result<&'a str, ScenarioError> {
    lookup(fields, key)
        .and_then(|value| value.as_str())
        .context(MissingFieldSnafu { index, field: key })
}

fn path_field(index: usize, fields: &Mapping<'_>, key: &'static str) -> Result<PathBuf, ScenarioError> {
    string_field(index, fields, key).map(PathBuf::from)
}

#[derive(Debug, Snafu)]
pub enum ScenarioError {
    #[snafu(display("Failed to read the scenario file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("The scenario file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: FromUtf8Error,
    },
    #[snafu(display("Failed to parse the scenario file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted scenario file"))]
    MalformedScenario,
    #[snafu(display("Top level of the scenario should be a map"))]
    TopLevelNotMap,
    #[snafu(display("The scenario must name a root path"))]
    MissingRoot,
    #[snafu(display("The tree section should be a list"))]
    TreeNotList,
    #[snafu(display("Tree entry #{} should be a path string", index))]
    InvalidTreeEntry { index: usize },
    #[snafu(display("The steps section should be a list"))]
    StepsNotList,
    #[snafu(display("Step #{} is invalid: {}", index, reason))]
    InvalidStep { index: usize, reason: String },
    #[snafu(display("Step #{} is missing the '{}' field", index, field))]
    MissingField { index: usize, field: String },
    #[snafu(display("Step #{} has unknown action '{}'", index, name))]
    UnknownStep { index: usize, name: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const FULL_SCENARIO: &str = r#"
root: /site
tree:
  - docs/
  - docs/intro.md
  - index.md
steps:
  - created: docs/new.md
  - renamed: { from: docs/new.md, to: docs/renamed.md }
  - deleted: docs/renamed.md
  - select: docs
  - begin_rename: index.md
  - edit: { path: index.md, name: home.md }
  - commit: index.md
  - undo: docs
"#;

    #[test]
    fn parses_full_scenario() {
        let scenario = Scenario::try_from(FULL_SCENARIO).expect("Scenario should parse");

        assert_eq!(scenario.root, PathBuf::from("/site"));
        assert_eq!(
            scenario.tree,
            vec![
                TreeEntry {
                    path: PathBuf::from("docs"),
                    kind: ItemKind::Folder
                },
                TreeEntry {
                    path: PathBuf::from("docs/intro.md"),
                    kind: ItemKind::File
                },
                TreeEntry {
                    path: PathBuf::from("index.md"),
                    kind: ItemKind::File
                },
            ]
        );
        assert_eq!(scenario.steps.len(), 8);
        assert_eq!(
            scenario.steps[1],
            Step::Event(ChangeEvent::renamed("docs/new.md", "docs/renamed.md"))
        );
        assert_eq!(
            scenario.steps[5],
            Step::Edit {
                path: PathBuf::from("index.md"),
                name: "home.md".to_string()
            }
        );
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let scenario = Scenario::try_from("root: /site").expect("Scenario should parse");

        assert!(scenario.tree.is_empty());
        assert!(scenario.steps.is_empty());
    }

    #[test]
    fn resolve_anchors_relative_paths_at_root() {
        let scenario = Scenario::try_from("root: /site").unwrap();

        assert_eq!(
            scenario.resolve(Path::new("docs/./intro.md")),
            PathBuf::from("/site/docs/intro.md")
        );
        assert_eq!(
            scenario.resolve(Path::new("/elsewhere/a.md")),
            PathBuf::from("/elsewhere/a.md")
        );
    }

    #[rstest]
    #[case("", "MalformedScenario")]
    #[case("- a\n- b", "TopLevelNotMap")]
    #[case("tree: []", "MissingRoot")]
    #[case("root: /site\ntree: docs", "TreeNotList")]
    #[case("root: /site\ntree:\n  - {a: b}", "InvalidTreeEntry")]
    #[case("root: /site\nsteps: {}", "StepsNotList")]
    #[case("root: /site\nsteps:\n  - created", "InvalidStep")]
    #[case("root: /site\nsteps:\n  - {created: a, deleted: b}", "InvalidStep")]
    #[case("root: /site\nsteps:\n  - renamed: {from: a}", "MissingField")]
    #[case("root: /site\nsteps:\n  - explode: a", "UnknownStep")]
    fn rejects_malformed_scenarios(#[case] contents: &str, #[case] expected: &str) {
        let error = Scenario::try_from(contents).expect_err("Scenario should be rejected");

        let variant = format!("{:?}", error);
        assert!(
            variant.starts_with(expected),
            "Expected {}, got {}",
            expected,
            variant
        );
    }

    #[test]
    fn rejects_invalid_yaml() {
        let result = Scenario::try_from("root: [unclosed");

        assert!(matches!(result, Err(ScenarioError::ParseError { .. })));
    }

    #[compio::test]
    async fn from_path_resolves_relative_root_against_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let script = temp_dir.path().join("scenario.yaml");
        std::fs::write(&script, "root: ./site\n").expect("Failed to write scenario");

        let scenario = Scenario::from_path(&script)
            .await
            .expect("Scenario should load");

        assert_eq!(scenario.root, temp_dir.path().join("site"));
    }

    #[compio::test]
    async fn from_path_reports_missing_file() {
        let result = Scenario::from_path(Path::new("/this/scenario/does/not/exist.yaml")).await;

        assert!(matches!(result, Err(ScenarioError::ReadError { .. })));
    }

    #[compio::test]
    async fn from_path_reports_invalid_utf8() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(&[0xff, 0xfe, 0x00]).expect("Failed to write bytes");

        let result = Scenario::from_path(file.path()).await;

        assert!(matches!(result, Err(ScenarioError::EncodingError { .. })));
    }
}
