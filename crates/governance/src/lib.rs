//! # Context Pack Governance
//!
//! Companions to the exporter that travel alongside a context pack:
//!
//! - `PROMPT.md` rendering for the task at hand
//! - copying the `.project/` ledger and accepted ADRs into the pack
//! - seeding a project from governance templates
//! - shape checks for `ledger.json`, `decisions.json` and `intent.json`

mod error;
mod governance;
mod prompt;
mod scaffold;
mod validate;

pub use error::{GovernanceError, Result};
pub use governance::{
    copy_governance, read_decisions, AdrEntry, Decisions, GovernanceCopy, ACCEPTED_STATUS,
    DECISIONS_FILE_NAME, PROJECT_DIR_NAME,
};
pub use prompt::{render_prompt, write_prompt, PROMPT_FILE_NAME};
pub use scaffold::{copy_tree, init_project, ScaffoldReport, SCAFFOLD_DIRS};
pub use validate::{
    check_decisions, check_intent, check_ledger, validate_decisions, validate_intent,
    validate_ledger,
};
