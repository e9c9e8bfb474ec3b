//! `graft resolve` command implementation.
//!
//! Loads a fragment declaration, a store snapshot and a set of raw props,
//! runs prop resolution exactly as a mutation constructor would, and prints
//! the resolved props with any warnings as JSON.

use anyhow::{Context, Result};
use graft_core::{GraftConfig, InMemoryStore};
use graft_mutation::{AnyDeclaration, MutationProps, Props, ResolveEnv};
use serde_json::{Value as JsonValue, json};
use std::fs;
use std::path::Path;

pub fn run(
    config: &GraftConfig,
    declaration_path: &Path,
    store_path: &Path,
    props_path: &Path,
) -> Result<()> {
    let declaration: AnyDeclaration = serde_yaml::from_str(&read(declaration_path)?)
        .with_context(|| format!("Invalid declaration in {}", declaration_path.display()))?;

    let snapshot: JsonValue = serde_json::from_str(&read(store_path)?)
        .with_context(|| format!("Invalid JSON in {}", store_path.display()))?;
    let store = InMemoryStore::from_json(snapshot)
        .with_context(|| format!("Store snapshot {} must map ids to records", store_path.display()))?;

    let raw: Props = serde_json::from_str(&read(props_path)?)
        .with_context(|| format!("Props in {} must be a JSON object", props_path.display()))?;

    let output = resolve(config, declaration, &store, raw)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn resolve(
    config: &GraftConfig,
    declaration: AnyDeclaration,
    store: &InMemoryStore,
    raw: Props,
) -> Result<JsonValue> {
    let declaration = declaration.into_declaration();
    tracing::info!(
        mutation = declaration.mutation_name(),
        fragments = declaration.fragment_names().len(),
        records = store.len(),
        "Resolving props"
    );

    let env = ResolveEnv::new(store).with_diagnostics(&config.diagnostics);
    let props = MutationProps::resolve(&declaration, raw, &env)?;

    let warnings: Vec<String> = props.warnings().iter().map(ToString::to_string).collect();
    Ok(json!({
        "mutation": props.mutation_name(),
        "props": props.values(),
        "warnings": warnings,
    }))
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECLARATION: &str = r#"
mutation: LikeStoryMutation
fragments:
  story:
    name: story
    typeName: Story
    concreteId: __story
    children:
      - kind: field
        name: text
  likers:
    name: likers
    typeName: User
    plural: true
    concreteId: __likers
"#;

    fn store() -> InMemoryStore {
        InMemoryStore::from_json(json!({
            "story:1": { "id": "story:1", "text": "hi", "likeCount": 2 },
            "user:1": { "id": "user:1", "name": "Ada" }
        }))
        .unwrap()
    }

    fn props(value: JsonValue) -> Props {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn resolves_against_snapshot() {
        let declaration = serde_yaml::from_str(DECLARATION).unwrap();
        let output = resolve(
            &GraftConfig::default(),
            declaration,
            &store(),
            props(json!({
                "story": { "__story": { "dataID": "story:1" } },
                "likers": [{ "__likers": { "dataID": "user:1" } }]
            })),
        )
        .unwrap();

        assert_eq!(output["mutation"], "LikeStoryMutation");
        assert_eq!(output["props"]["story"], json!({ "text": "hi" }));
        assert_eq!(output["props"]["likers"][0]["name"], "Ada");
        assert_eq!(output["warnings"], json!([]));
    }

    #[test]
    fn reports_warnings_and_fatal_errors() {
        let declaration: AnyDeclaration = serde_yaml::from_str(DECLARATION).unwrap();
        let output = resolve(
            &GraftConfig::default(),
            declaration.clone(),
            &store(),
            props(json!({ "likers": null })),
        )
        .unwrap();
        assert_eq!(output["warnings"].as_array().unwrap().len(), 1);

        let err = resolve(
            &GraftConfig::default(),
            declaration,
            &store(),
            props(json!({ "story": null, "likers": { "__likers": "user:1" } })),
        )
        .unwrap_err();
        assert!(err.to_string().contains("plural"));
    }

    #[test]
    fn declarations_without_concrete_ids_resolve_by_fragment_name() {
        let declaration = serde_yaml::from_str(
            "mutation: LikeStoryMutation\nfragments:\n  story:\n    name: story\n    typeName: Story\n",
        )
        .unwrap();
        let output = resolve(
            &GraftConfig::default(),
            declaration,
            &store(),
            props(json!({ "story": { "__fragment_story": { "dataID": "story:1" } } })),
        )
        .unwrap();

        assert_eq!(output["props"]["story"]["text"], "hi");
        assert_eq!(output["warnings"], json!([]));
    }

    #[test]
    fn run_reads_all_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let declaration = dir.path().join("declaration.yaml");
        let snapshot = dir.path().join("store.json");
        let raw = dir.path().join("props.json");
        fs::write(&declaration, DECLARATION).unwrap();
        fs::write(&snapshot, r#"{ "story:1": { "text": "hi" } }"#).unwrap();
        fs::write(&raw, r#"{ "story": { "__story": "story:1" }, "likers": null }"#).unwrap();

        run(&GraftConfig::default(), &declaration, &snapshot, &raw).unwrap();
    }
}
