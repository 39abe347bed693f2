//! Structural repair of JSON cut short by a killed solver
//!
//! The text is cut before its last, possibly incomplete, object, then every
//! container still open is closed in reverse order. Only records that were
//! fully emitted survive; nothing is invented.

/// Repair truncated solver JSON.
///
/// Returns `None` when the text holds no object at all or its brackets cannot
/// be balanced (a closer that does not match the innermost opener).
pub fn repair_json(text: &str) -> Option<String> {
    // Drop the trailing record, then the separator before it
    let (head, _) = text.rsplit_once('{')?;
    let head = match head.rsplit_once(',') {
        Some((before, _)) => before,
        None => head,
    };

    let mut open: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for ch in head.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' | '[' => open.push(ch),
            '}' | ']' => {
                let expected = if ch == '}' { '{' } else { '[' };
                if open.pop() != Some(expected) {
                    return None;
                }
            }
            _ => {}
        }
    }

    // A cut inside a string cannot be closed without inventing content
    if in_string || open.is_empty() {
        return None;
    }

    let mut repaired = String::with_capacity(head.len() + open.len() * 4);
    repaired.push_str(head.trim_end());
    for (depth, opener) in open.iter().enumerate().rev() {
        repaired.push('\n');
        repaired.extend(std::iter::repeat_n('\t', depth));
        repaired.push(if *opener == '{' { '}' } else { ']' });
    }
    Some(repaired)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRUNCATED: &str = r#"{
  "Solver": "clingo version 5.7.1",
  "Call": [
    {
      "Witnesses": [
        {
          "Value": [ "seed(\"A\",\"x\")" ]
        },
        {
          "Value": [ "seed(\"B\",\"x\")" ]
        },
        {
          "Value": [ "seed(\"C"#;

    #[test]
    fn test_repair_keeps_complete_witnesses() {
        let repaired = repair_json(TRUNCATED).unwrap();
        let value: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        let witnesses = value["Call"][0]["Witnesses"].as_array().unwrap();
        assert_eq!(witnesses.len(), 2);
        assert_eq!(witnesses[1]["Value"][0], "seed(\"B\",\"x\")");
    }

    #[test]
    fn test_repair_before_first_witness() {
        let text = "{\n  \"Solver\": \"clingo\",\n  \"Input\": [\"a.lp\"],\n  \"Call\": [\n    {";
        let repaired = repair_json(text).unwrap();
        let value: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert!(value.get("Call").is_none());
        assert_eq!(value["Solver"], "clingo");
    }

    #[test]
    fn test_repair_ignores_brackets_inside_strings() {
        let text = "{\"Call\": [{\"Witnesses\": [{\"Value\": [\"p(\\\"}]\\\")\"]}, {\"Value\": [";
        let repaired = repair_json(text).unwrap();
        let value: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["Call"][0]["Witnesses"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_repair_without_object_is_none() {
        assert!(repair_json("").is_none());
        assert!(repair_json("clingo: error").is_none());
    }

    #[test]
    fn test_repair_mismatched_closer_is_none() {
        assert!(repair_json("{\"a\": [1}, {").is_none());
    }

    fn solver_json(models: &[Vec<String>]) -> String {
        let witnesses: Vec<serde_json::Value> = models
            .iter()
            .map(|seeds| {
                let atoms: Vec<String> =
                    seeds.iter().map(|s| format!("seed(\"{s}\",\"x\")")).collect();
                serde_json::json!({ "Value": atoms })
            })
            .collect();
        serde_json::to_string_pretty(&serde_json::json!({
            "Solver": "clingo version 5.7.1",
            "Input": ["instance.lp"],
            "Call": [{ "Witnesses": witnesses }],
            "Result": "SATISFIABLE",
        }))
        .unwrap()
    }

    proptest::proptest! {
        #[test]
        fn test_repaired_witnesses_are_a_prefix(
            models in proptest::collection::vec(
                proptest::collection::vec("[A-Z][a-z0-9_]{0,6}", 1..4),
                1..6,
            ),
            cut in 0usize..2_000,
        ) {
            let full = solver_json(&models);
            let cut = cut.min(full.len());
            let Some(repaired) = repair_json(&full[..cut]) else {
                return Ok(());
            };
            let Ok(value) = serde_json::from_str::<serde_json::Value>(&repaired) else {
                return Ok(());
            };
            let original: serde_json::Value = serde_json::from_str(&full).unwrap();
            let kept = value["Call"][0]["Witnesses"].as_array().cloned().unwrap_or_default();
            let all = original["Call"][0]["Witnesses"].as_array().cloned().unwrap_or_default();
            proptest::prop_assert!(kept.len() <= all.len());
            proptest::prop_assert_eq!(&kept[..], &all[..kept.len()]);
        }
    }
}
