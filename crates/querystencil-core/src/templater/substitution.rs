//! Plain variable substitution, the last step of the pipeline.
//!
//! Hosts normally supply their own substitution through [`VariableSubstitution`].
//! [`PlainSubstitution`] covers the common reference forms for hosts that do not.

use crate::types::{find_variable, TemplateVariable, VariableValue};
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Replaces variable references in query text.
pub trait VariableSubstitution {
    fn substitute(&self, text: &str, variables: &[TemplateVariable]) -> String;
}

impl<F> VariableSubstitution for F
where
    F: Fn(&str, &[TemplateVariable]) -> String,
{
    fn substitute(&self, text: &str, variables: &[TemplateVariable]) -> String {
        self(text, variables)
    }
}

/// Substitutes `$name`, `${name}`, `${name:format}` and `[[name]]`.
///
/// Unknown names are left as written. Supported formats for multi-value
/// selections are `csv` (the default), `pipe`, `singlequote`, `doublequote`
/// and `raw`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainSubstitution;

impl VariableSubstitution for PlainSubstitution {
    fn substitute(&self, text: &str, variables: &[TemplateVariable]) -> String {
        static REFERENCE_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = REFERENCE_REGEX.get_or_init(|| {
            Regex::new(r"\$\{(\w+)(?::(\w+))?\}|\[\[(\w+)(?::(\w+))?\]\]|\$(\w+)")
                .expect("Invalid regex pattern")
        });

        re.replace_all(text, |caps: &Captures<'_>| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(5))
                .map_or("", |m| m.as_str());
            let format = caps.get(2).or_else(|| caps.get(4)).map(|m| m.as_str());

            match find_variable(variables, name) {
                Some(variable) => format_value(variable.value(), format),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
    }
}

fn format_value(value: &VariableValue, format: Option<&str>) -> String {
    let values: Vec<&str> = match value {
        VariableValue::Single(single) => vec![single.as_str()],
        VariableValue::Multi(many) => many.iter().map(String::as_str).collect(),
    };

    match format {
        Some("pipe") => values.join("|"),
        Some("singlequote") => quote_each(&values, '\''),
        Some("doublequote") => quote_each(&values, '"'),
        _ => values.join(","),
    }
}

fn quote_each(values: &[&str], quote: char) -> String {
    let escaped = format!("\\{quote}");
    values
        .iter()
        .map(|value| format!("{quote}{}{quote}", value.replace(quote, &escaped)))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variables() -> Vec<TemplateVariable> {
        vec![
            TemplateVariable::new("region", "EU"),
            TemplateVariable::new("hosts", vec!["a".to_string(), "b'c".to_string()]),
        ]
    }

    #[test]
    fn substitutes_all_reference_forms() {
        let text = "$region ${region} [[region]] ${region:raw}";
        assert_eq!(
            PlainSubstitution.substitute(text, &variables()),
            "EU EU EU EU"
        );
    }

    #[test]
    fn formats_multi_value() {
        let vars = variables();
        assert_eq!(PlainSubstitution.substitute("$hosts", &vars), "a,b'c");
        assert_eq!(PlainSubstitution.substitute("${hosts:pipe}", &vars), "a|b'c");
        assert_eq!(
            PlainSubstitution.substitute("${hosts:singlequote}", &vars),
            r"'a','b\'c'"
        );
        assert_eq!(
            PlainSubstitution.substitute("${hosts:doublequote}", &vars),
            r#""a","b'c""#
        );
    }

    #[test]
    fn unknown_references_are_kept() {
        let text = "WHERE $__timeFilter(ts) AND x = $unknown AND y = ${other:csv}";
        assert_eq!(PlainSubstitution.substitute(text, &variables()), text);
    }

    #[test]
    fn closures_can_substitute() {
        let upper = |text: &str, _: &[TemplateVariable]| text.to_uppercase();
        assert_eq!(upper.substitute("select", &[]), "SELECT");
    }
}
