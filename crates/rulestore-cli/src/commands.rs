//! Subcommand execution

use anyhow::{Context, Result};
use rulestore_adapter::Adapter;
use rulestore_core::{load_policy_line, Model, POLICY_SECTIONS};
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::{Command, DumpFormat};

/// Run one subcommand against an adapter, writing any output to `out`
pub async fn run<A: Adapter, W: Write>(command: Command, adapter: &mut A, out: &mut W) -> Result<()> {
    match command {
        Command::Dump { format } => {
            let mut model = Model::auto_define();
            adapter.load_policy(&mut model).await?;
            let rendered = match format {
                DumpFormat::Csv => render_csv(&model),
                DumpFormat::Json => serde_json::to_string_pretty(model.get_model())?,
            };
            writeln!(out, "{}", rendered)?;
        }
        Command::Import { file } => {
            let model = read_policy_file(&file)?;
            adapter.save_policy(&model).await?;
            info!(file = %file.display(), rules = model.policy_count(), "Imported policy file");
        }
        Command::Add { ptype, fields } => {
            let sec = section_of(&ptype);
            adapter.add_policy(sec, &ptype, fields).await?;
        }
        Command::Remove { ptype, fields } => {
            let sec = section_of(&ptype);
            adapter.remove_policy(sec, &ptype, fields).await?;
        }
        Command::RemoveFiltered {
            ptype,
            index,
            values,
        } => {
            let sec = section_of(&ptype);
            adapter
                .remove_filtered_policy(sec, &ptype, index, values)
                .await?;
        }
        Command::Clear => adapter.clear_policy().await?,
    }

    Ok(())
}

fn section_of(ptype: &str) -> &str {
    ptype.get(..1).unwrap_or(ptype)
}

/// Parse a CSV policy file into a model defining every ptype it mentions
pub fn read_policy_file(path: &Path) -> Result<Model> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read policy file {}", path.display()))?;

    let mut model = Model::auto_define();
    for (lineno, line) in content.lines().enumerate() {
        load_policy_line(line, &mut model)
            .with_context(|| format!("{}:{}", path.display(), lineno + 1))?;
    }
    Ok(model)
}

/// One `ptype, v0, v1, ...` line per rule, `p` sections first
pub fn render_csv(model: &Model) -> String {
    let mut lines = Vec::new();
    for sec in POLICY_SECTIONS {
        for ast in model.assertions(sec) {
            for rule in &ast.policy {
                let fields = std::iter::once(ast.key.as_str()).chain(rule.iter().map(String::as_str));
                lines.push(fields.collect::<Vec<_>>().join(", "));
            }
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulestore_adapter::{ListAdapter, MemoryListStore, DEFAULT_KEY};

    fn fields(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn policy_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    async fn dump(adapter: &mut ListAdapter<MemoryListStore>) -> String {
        let mut out = Vec::new();
        run(Command::Dump { format: DumpFormat::Csv }, adapter, &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_read_policy_file() {
        let file = policy_file("p, alice, data1, read\n\n# comment\ng, alice, admin\ng2, data1, group\n");
        let model = read_policy_file(file.path()).unwrap();

        assert_eq!(model.policy_count(), 3);
        assert_eq!(
            render_csv(&model),
            "p, alice, data1, read\ng, alice, admin\ng2, data1, group"
        );
    }

    #[test]
    fn test_read_policy_file_reports_line() {
        let file = policy_file("p, alice, data1, read\n, orphan\n");
        let err = read_policy_file(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains(":2"));
    }

    #[tokio::test]
    async fn test_import_then_dump() {
        let file = policy_file("p, alice, data1, read\np, bob, data2, write\ng, alice, admin\n");
        let mut adapter = ListAdapter::<MemoryListStore>::default();

        run(
            Command::Import {
                file: file.path().to_path_buf(),
            },
            &mut adapter,
            &mut std::io::sink(),
        )
        .await
        .unwrap();

        assert_eq!(
            dump(&mut adapter).await,
            "p, alice, data1, read\np, bob, data2, write\ng, alice, admin\n"
        );
    }

    #[tokio::test]
    async fn test_add_remove_and_filter() {
        let mut adapter = ListAdapter::<MemoryListStore>::default();
        for rule in [["alice", "data1", "read"], ["bob", "data1", "read"], ["bob", "data2", "write"]] {
            run(
                Command::Add {
                    ptype: "p".into(),
                    fields: fields(&rule),
                },
                &mut adapter,
                &mut std::io::sink(),
            )
            .await
            .unwrap();
        }

        run(
            Command::Remove {
                ptype: "p".into(),
                fields: fields(&["alice", "data1", "read"]),
            },
            &mut adapter,
            &mut std::io::sink(),
        )
        .await
        .unwrap();
        run(
            Command::RemoveFiltered {
                ptype: "p".into(),
                index: 1,
                values: fields(&["data1"]),
            },
            &mut adapter,
            &mut std::io::sink(),
        )
        .await
        .unwrap();

        assert_eq!(dump(&mut adapter).await, "p, bob, data2, write\n");

        run(Command::Clear, &mut adapter, &mut std::io::sink()).await.unwrap();
        assert!(adapter.store().snapshot(DEFAULT_KEY).is_empty());
    }
}
