//! Parsing of the textual atoms found in a witness

/// Split `name(arg, ...)` into its predicate name and unquoted arguments.
///
/// Commas and parentheses inside quoted strings or nested terms do not split.
/// Returns `None` for text that is not a well-formed atom.
pub(crate) fn parse_atom(atom: &str) -> Option<(&str, Vec<String>)> {
    let atom = atom.trim();
    let Some(open) = atom.find('(') else {
        return Some((atom, Vec::new()));
    };
    if !atom.ends_with(')') {
        return None;
    }
    let name = &atom[..open];
    let body = &atom[open + 1..atom.len() - 1];

    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for ch in body.chars() {
        if in_string {
            current.push(ch);
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
            '"' => {
                in_string = true;
                current.push(ch);
            }
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth = depth.checked_sub(1)?;
                current.push(ch);
            }
            ',' if depth == 0 => {
                args.push(unquote(&current));
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if in_string || depth != 0 {
        return None;
    }
    args.push(unquote(&current));

    Some((name, args))
}

/// Strip surrounding quotes and undo `\"` / `\\` escapes.
pub(crate) fn unquote(term: &str) -> String {
    let term = term.trim();
    match term.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => term.to_string(),
    }
}

/// Flux value of an `__lpx` assignment, which may be a reduced fraction.
///
/// Rounded to 10 decimal places.
pub(crate) fn parse_flux(raw: &str) -> Option<f64> {
    let value = match raw.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator: f64 = numerator.trim().parse().ok()?;
            let denominator: f64 = denominator.trim().parse().ok()?;
            if denominator == 0.0 {
                return None;
            }
            numerator / denominator
        }
        None => raw.trim().parse().ok()?,
    };
    Some(round_to(value, 10))
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_atom() {
        let (name, args) = parse_atom(r#"seed("M_glc__D_e","exchange")"#).unwrap();
        assert_eq!(name, "seed");
        assert_eq!(args, vec!["M_glc__D_e", "exchange"]);
    }

    #[test]
    fn test_parse_keeps_commas_inside_strings() {
        let (_, args) = parse_atom(r#"seed("M_a,b",x)"#).unwrap();
        assert_eq!(args, vec!["M_a,b", "x"]);
    }

    #[test]
    fn test_parse_nested_terms() {
        let (name, args) = parse_atom(r#"__lpx(flux("R_BIOMASS"),"3/4")"#).unwrap();
        assert_eq!(name, "__lpx");
        assert_eq!(args, vec![r#"flux("R_BIOMASS")"#, "3/4"]);
    }

    #[test]
    fn test_parse_constant_atom() {
        let (name, args) = parse_atom("unsat").unwrap();
        assert_eq!(name, "unsat");
        assert!(args.is_empty());
    }

    #[test]
    fn test_parse_rejects_unbalanced() {
        assert!(parse_atom(r#"seed("A"#).is_none());
    }

    #[test]
    fn test_parse_flux_fraction_and_decimal() {
        assert_eq!(parse_flux("1/3"), Some(0.3333333333));
        assert_eq!(parse_flux("-2.5"), Some(-2.5));
        assert_eq!(parse_flux("1/0"), None);
        assert_eq!(parse_flux("abc"), None);
    }
}
