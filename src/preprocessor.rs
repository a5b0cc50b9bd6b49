use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

/// Substitute `$name` and `${name}` in a recipe from `variables`
pub fn expand_variables(input: &str, variables: &HashMap<String, String>) -> Result<String> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            output.push(c);
            continue;
        }

        let var_name = if chars.peek() == Some(&'{') {
            chars.next();
            let name = consume_identifier(&mut chars);
            if chars.next() != Some('}') || name.is_empty() {
                return Err(anyhow!("Unterminated variable reference '${{{}'", name));
            }
            name
        } else {
            consume_identifier(&mut chars)
        };

        if var_name.is_empty() {
            // Lone $
            output.push('$');
            continue;
        }

        match variables.get(&var_name) {
            Some(val) => output.push_str(val),
            None => return Err(anyhow!("Variable '${}' not defined", var_name)),
        }
    }

    Ok(output)
}

/// Parse `key=value` pairs as given on the command line
pub fn parse_assignments<S: AsRef<str>>(pairs: &[S]) -> Result<HashMap<String, String>> {
    let mut variables = HashMap::new();
    for pair in pairs {
        let pair = pair.as_ref();
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid variable '{}', expected key=value", pair))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(anyhow!("Invalid variable '{}', empty name", pair));
        }
        variables.insert(key.to_string(), value.to_string());
    }
    Ok(variables)
}

fn consume_identifier(chars: &mut Peekable<Chars>) -> String {
    let mut name = String::new();
    if let Some(&c) = chars.peek() {
        if !c.is_alphabetic() && c != '_' {
            return name;
        }
    }

    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '_' {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_expansion() {
        let vars = vars(&[("pc", "PC3"), ("focus", "Sardinian")]);
        let input = "aes(x: PC1, y: $pc) | highlight(\"$focus\") | point()";
        let output = expand_variables(input, &vars).unwrap();
        assert_eq!(output, "aes(x: PC1, y: PC3) | highlight(\"Sardinian\") | point()");
    }

    #[test]
    fn test_braced_expansion() {
        let vars = vars(&[("n", "2")]);
        let output = expand_variables("aes(x: PC1, y: PC${n}) | point()", &vars).unwrap();
        assert_eq!(output, "aes(x: PC1, y: PC2) | point()");
    }

    #[test]
    fn test_unterminated_brace() {
        let vars = vars(&[("n", "2")]);
        assert!(expand_variables("PC${n", &vars).is_err());
    }

    #[test]
    fn test_lone_dollar() {
        let vars = HashMap::new();
        let output = expand_variables("labs(title: \"Cost ($)\")", &vars).unwrap();
        assert_eq!(output, "labs(title: \"Cost ($)\")");
    }

    #[test]
    fn test_undefined_variable() {
        let vars = HashMap::new();
        assert!(expand_variables("aes(x: $missing, y: PC2)", &vars).is_err());
    }

    #[test]
    fn test_parse_assignments() {
        let parsed = parse_assignments(&["pc=PC4", "title=West = East"]).unwrap();
        assert_eq!(parsed["pc"], "PC4");
        assert_eq!(parsed["title"], "West = East");
        assert!(parse_assignments(&["novalue"]).is_err());
        assert!(parse_assignments(&["=x"]).is_err());
    }
}
