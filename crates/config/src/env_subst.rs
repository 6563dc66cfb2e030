/// Expand `${VAR}` and `${VAR:-fallback}` placeholders from the environment.
///
/// A placeholder whose variable is unset and has no fallback is kept as
/// written, as is an unterminated `${`.
pub fn substitute_env(input: &str) -> String {
    substitute_with(input, |name| std::env::var(name).ok())
}

fn substitute_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let body = &after[..end];
        let (name, fallback) = match body.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (body, None),
        };

        match (name.is_empty(), lookup(name), fallback) {
            (false, Some(value), _) => out.push_str(&value),
            (false, None, Some(fallback)) => out.push_str(fallback),
            _ => out.push_str(&rest[start..start + 3 + end]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_env(name: &str) -> Option<String> {
        match name {
            "SWITCHBOARD_TEST_KEY" => Some("k-123".into()),
            "EMPTY" => Some(String::new()),
            _ => None,
        }
    }

    #[test]
    fn expands_known_variable() {
        assert_eq!(
            substitute_with("api_key = \"${SWITCHBOARD_TEST_KEY}\"", fake_env),
            "api_key = \"k-123\""
        );
    }

    #[test]
    fn keeps_unknown_variable_literal() {
        assert_eq!(
            substitute_with("${SWITCHBOARD_NOPE_XYZ}", fake_env),
            "${SWITCHBOARD_NOPE_XYZ}"
        );
    }

    #[test]
    fn uses_fallback_only_when_unset() {
        assert_eq!(
            substitute_with("${SWITCHBOARD_NOPE_XYZ:-http://localhost:8080}", fake_env),
            "http://localhost:8080"
        );
        assert_eq!(substitute_with("[${EMPTY:-x}]", fake_env), "[]");
    }

    #[test]
    fn unterminated_placeholder_is_literal() {
        assert_eq!(substitute_with("a ${OPEN", fake_env), "a ${OPEN");
        assert_eq!(substitute_with("${}", fake_env), "${}");
    }

    #[test]
    #[allow(unsafe_code)]
    fn reads_process_environment() {
        unsafe { std::env::set_var("SWITCHBOARD_ENV_SUBST_TEST", "live") };
        assert_eq!(substitute_env("${SWITCHBOARD_ENV_SUBST_TEST}"), "live");
        unsafe { std::env::remove_var("SWITCHBOARD_ENV_SUBST_TEST") };
    }
}
