use serde_json::{Map, Value};

/// Claim keys searched for a role, in priority order.
pub const ROLE_CLAIM_KEYS: [&str; 3] = [
    "http://schemas.microsoft.com/ws/2008/06/identity/claims/role",
    "role",
    "roles",
];

/// Returns the first non-empty role claim, if any.
pub fn role_claim(claims: &Map<String, Value>) -> Option<&Value> {
    ROLE_CLAIM_KEYS
        .iter()
        .filter_map(|key| claims.get(*key))
        .find(|value| match value {
            Value::Null | Value::Bool(false) => false,
            Value::String(s) => !s.is_empty(),
            _ => true,
        })
}

/// Picks the first role in `role` (a string or an array of strings) that is allowed.
pub fn matching_role<'a>(role: &'a Value, allowed: &[String]) -> Option<&'a str> {
    let is_allowed = |r: &str| allowed.iter().any(|a| a == r);
    match role {
        Value::String(r) => Some(r.as_str()).filter(|r| is_allowed(*r)),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .find(|r| is_allowed(*r)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    fn allowed() -> Vec<String> {
        vec!["President".into(), "Minister".into(), "Founder".into()]
    }

    #[test]
    fn schema_uri_key_wins_over_role() {
        let c = claims(json!({
            "http://schemas.microsoft.com/ws/2008/06/identity/claims/role": "Minister",
            "role": "Guest",
        }));
        assert_eq!(role_claim(&c), Some(&json!("Minister")));
    }

    #[test]
    fn empty_values_fall_through_to_next_key() {
        let c = claims(json!({ "role": "", "roles": ["Founder"] }));
        assert_eq!(role_claim(&c), Some(&json!(["Founder"])));

        let c = claims(json!({ "role": null }));
        assert_eq!(role_claim(&c), None);
    }

    #[test]
    fn string_role_must_be_allowed() {
        assert_eq!(matching_role(&json!("President"), &allowed()), Some("President"));
        assert_eq!(matching_role(&json!("president"), &allowed()), None);
        assert_eq!(matching_role(&json!("Guest"), &allowed()), None);
    }

    #[test]
    fn array_role_needs_any_allowed_member() {
        assert_eq!(
            matching_role(&json!(["Guest", 3, "Founder"]), &allowed()),
            Some("Founder")
        );
        assert_eq!(matching_role(&json!(["Guest", "Member"]), &allowed()), None);
        assert_eq!(matching_role(&json!([]), &allowed()), None);
    }

    #[test]
    fn other_shapes_never_match() {
        assert_eq!(matching_role(&json!(42), &allowed()), None);
        assert_eq!(matching_role(&json!({ "name": "President" }), &allowed()), None);
    }
}
