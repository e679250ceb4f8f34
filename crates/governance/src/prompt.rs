use crate::error::{GovernanceError, Result};
use std::path::{Path, PathBuf};

pub const PROMPT_FILE_NAME: &str = "PROMPT.md";

pub fn render_prompt(task: &str, do_not_do: &[String]) -> String {
    let task = match task.trim() {
        "" => "(fill in task)",
        trimmed => trimmed,
    };
    let do_not_do = if do_not_do.is_empty() {
        "- (none)".to_string()
    } else {
        do_not_do
            .iter()
            .map(|item| format!("- {item}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "# Context Pack Prompt (paste into ChatGPT/Copilot Chat)

You are collaborating on a long-term software project.

## Hard rules
- Treat status=accepted ADRs referenced by `.project/decisions.json` as hard constraints.
- Prefer explicit behavior over implicit guesses.
- Do not change public APIs unless explicitly requested.

## Inputs provided in this pack
- `manifest.json`, `index.json`, `summary.txt`, `tree.txt`
- `bundle_*.txt` (if present)
- `.project/*` (if included)

## Current task
{task}

## Do NOT do
{do_not_do}
"
    )
}

/// Write `PROMPT.md` into `out_dir`.
pub fn write_prompt(out_dir: &Path, task: &str, do_not_do: &[String]) -> Result<PathBuf> {
    let path = out_dir.join(PROMPT_FILE_NAME);
    std::fs::write(&path, render_prompt(task, do_not_do))
        .map_err(|err| GovernanceError::io(&path, err))?;
    Ok(path)
}
