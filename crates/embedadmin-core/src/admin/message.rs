use crate::formset::ChangeSummary;

/// `["a", "b", "c"]` -> `a, b and c`
#[must_use]
pub fn get_text_list(items: &[String], last_word: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [head @ .., last] => format!("{} {last_word} {last}", head.join(", ")),
    }
}

/// Human-readable description of one change, for the history log.
#[must_use]
pub fn construct_change_message(changed_fields: &[String], summaries: &[ChangeSummary]) -> String {
    let mut parts = Vec::new();

    if !changed_fields.is_empty() {
        parts.push(format!("Changed {}.", get_text_list(changed_fields, "and")));
    }

    for summary in summaries {
        let name = &summary.name;
        for added in &summary.added {
            parts.push(format!("Added {name} \"{added}\"."));
        }
        for (object, fields) in &summary.changed {
            parts.push(format!(
                "Changed {} for {name} \"{object}\".",
                get_text_list(fields, "and")
            ));
        }
        for deleted in &summary.deleted {
            parts.push(format!("Deleted {name} \"{deleted}\"."));
        }
    }

    if parts.is_empty() {
        "No fields changed.".to_string()
    } else {
        parts.join(" ")
    }
}

///
/// TESTS
///
