//! Record merging — classified fields into a possibly-edited record.
//!
//! Policy: first non-empty value wins. An incoming value is written only
//! when the record's slot is empty or whitespace, so re-running OCR (or
//! parsing the second card side) can never clobber something the user typed
//! or an earlier pass already filled. A merge never clears a slot.

use super::schema::{CardRecord, ParsedFields};

/// What a merge did. `retained` lists the slots whose existing value beat
/// the incoming one — the non-fatal "conflict" case, kept for observability
/// rather than surfaced as an error.
#[derive(Debug, Default)]
pub struct MergeOutcome {
    pub applied: usize,
    pub retained: Vec<String>,
}

/// Merge `incoming` into `record` under the first-nonempty-wins policy.
///
/// Empty incoming values and unknown keys are ignored. Callers serialize
/// invocations on the shared record; this function itself has no locking.
pub fn merge_fields(record: &mut CardRecord, incoming: &ParsedFields) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for (key, value) in incoming {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if !CardRecord::is_content_key(key) {
            log::debug!("[MERGE] Ignoring unknown field {:?}", key);
            continue;
        }

        if record.is_blank(key) {
            record.set(key, value);
            outcome.applied += 1;
        } else {
            log::debug!(
                "[MERGE] Keeping existing {:?} — incoming value dropped",
                key
            );
            outcome.retained.push(key.clone());
        }
    }

    log::info!(
        "[MERGE] Applied {} field(s), retained {} existing",
        outcome.applied,
        outcome.retained.len()
    );
    outcome
}
