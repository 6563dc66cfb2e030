//! Group-shape checks run before any mutation leaves the process.

use std::collections::HashSet;

use {
    switchboard_common::{Error, Invalid},
    switchboard_protocol::{CreateInstanceGroup, InstanceGroup, UpdateInstanceGroup},
};

pub const NAME_MAX_CHARS: usize = 100;
pub const ALIAS_MAX_CHARS: usize = 50;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

pub fn validate_create(spec: &CreateInstanceGroup) -> Result<(), Invalid> {
    check_bounded("name", &spec.name, 1, NAME_MAX_CHARS)?;
    check_bounded("alias", &spec.alias, 1, ALIAS_MAX_CHARS)?;
    if let Some(description) = &spec.description {
        check_bounded("description", description, 0, DESCRIPTION_MAX_CHARS)?;
    }
    check_members(&spec.instances)
}

/// Only the fields present in the patch are checked.
pub fn validate_update(patch: &UpdateInstanceGroup) -> Result<(), Invalid> {
    if let Some(name) = &patch.name {
        check_bounded("name", name, 1, NAME_MAX_CHARS)?;
    }
    if let Some(alias) = &patch.alias {
        check_bounded("alias", alias, 1, ALIAS_MAX_CHARS)?;
    }
    if let Some(description) = &patch.description {
        check_bounded("description", description, 0, DESCRIPTION_MAX_CHARS)?;
    }
    match &patch.instances {
        Some(instances) => check_members(instances),
        None => Ok(()),
    }
}

pub fn validate_member_name(instance_name: &str) -> Result<(), Invalid> {
    if instance_name.trim().is_empty() {
        return Err(Invalid::new("instanceName", "instance name is required"));
    }
    Ok(())
}

/// Adding must not duplicate an existing member (exact, case-sensitive match).
pub fn ensure_can_add(group: &InstanceGroup, instance_name: &str) -> Result<(), Error> {
    validate_member_name(instance_name)?;
    if group.has_member(instance_name) {
        return Err(Error::DuplicateMember {
            group_id: group.id.clone(),
            instance: instance_name.to_string(),
        });
    }
    Ok(())
}

/// Removing must target a member and leave at least one behind.
pub fn ensure_can_remove(group: &InstanceGroup, instance_name: &str) -> Result<(), Error> {
    validate_member_name(instance_name)?;
    if !group.has_member(instance_name) {
        return Err(Invalid::new(
            "instanceName",
            format!("'{instance_name}' is not a member of group {}", group.id),
        )
        .into());
    }
    if group.member_count() <= 1 {
        return Err(Error::InvariantViolation(format!(
            "cannot remove '{instance_name}': group {} must keep at least one instance",
            group.id
        )));
    }
    Ok(())
}

fn check_bounded(field: &'static str, value: &str, min: usize, max: usize) -> Result<(), Invalid> {
    let len = value.chars().count();
    if len < min {
        return Err(Invalid::new(field, format!("{field} is required")));
    }
    if len > max {
        return Err(Invalid::new(
            field,
            format!("{field} must be at most {max} characters"),
        ));
    }
    Ok(())
}

fn check_members(instances: &[String]) -> Result<(), Invalid> {
    if instances.is_empty() {
        return Err(Invalid::new("instances", "at least one instance is required"));
    }
    let mut seen = HashSet::with_capacity(instances.len());
    for name in instances {
        if name.trim().is_empty() {
            return Err(Invalid::new("instances", "instance names must not be blank"));
        }
        if !seen.insert(name.as_str()) {
            return Err(Invalid::new("instances", format!("duplicate instance '{name}'")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> CreateInstanceGroup {
        CreateInstanceGroup::new("Sales", "sales-01", vec!["inst-a".into()])
    }

    fn group(instances: &[&str]) -> InstanceGroup {
        InstanceGroup {
            id: "g1".into(),
            name: "Sales".into(),
            alias: "sales-01".into(),
            description: None,
            enabled: true,
            instances: instances.iter().map(|s| s.to_string()).collect(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn accepts_minimal_spec() {
        assert_eq!(validate_create(&spec()), Ok(()));
    }

    #[test]
    fn name_bounds() {
        let mut s = spec();
        s.name = String::new();
        assert_eq!(validate_create(&s).unwrap_err().field, "name");

        s.name = "n".repeat(NAME_MAX_CHARS);
        assert!(validate_create(&s).is_ok());
        s.name.push('n');
        let err = validate_create(&s).unwrap_err();
        assert_eq!(err.field, "name");
        assert!(err.reason.contains("100"));
    }

    #[test]
    fn alias_bounds() {
        let mut s = spec();
        s.alias = String::new();
        assert_eq!(validate_create(&s).unwrap_err().field, "alias");
        s.alias = "a".repeat(ALIAS_MAX_CHARS + 1);
        assert_eq!(validate_create(&s).unwrap_err().field, "alias");
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        let s = spec().with_description("é".repeat(DESCRIPTION_MAX_CHARS));
        assert!(validate_create(&s).is_ok());
        let s = spec().with_description("é".repeat(DESCRIPTION_MAX_CHARS + 1));
        assert_eq!(validate_create(&s).unwrap_err().field, "description");
    }

    #[test]
    fn empty_description_is_allowed() {
        assert!(validate_create(&spec().with_description("")).is_ok());
    }

    #[test]
    fn members_must_be_present_and_unique() {
        let mut s = spec();
        s.instances.clear();
        assert_eq!(validate_create(&s).unwrap_err().field, "instances");

        s.instances = vec!["inst-a".into(), "inst-a".into()];
        assert!(validate_create(&s).unwrap_err().reason.contains("duplicate"));

        s.instances = vec!["inst-a".into(), "Inst-A".into()];
        assert!(validate_create(&s).is_ok());

        s.instances = vec!["  ".into()];
        assert_eq!(validate_create(&s).unwrap_err().field, "instances");
    }

    #[test]
    fn update_checks_present_fields_only() {
        assert!(validate_update(&UpdateInstanceGroup::default()).is_ok());

        let patch = UpdateInstanceGroup {
            alias: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(validate_update(&patch).unwrap_err().field, "alias");

        let patch = UpdateInstanceGroup {
            instances: Some(Vec::new()),
            ..Default::default()
        };
        assert_eq!(validate_update(&patch).unwrap_err().field, "instances");
    }

    #[test]
    fn add_rejects_existing_member() {
        let g = group(&["inst-a"]);
        assert!(matches!(
            ensure_can_add(&g, "inst-a"),
            Err(Error::DuplicateMember { .. })
        ));
        assert!(ensure_can_add(&g, "inst-b").is_ok());
        assert!(matches!(ensure_can_add(&g, ""), Err(Error::Validation { .. })));
    }

    #[test]
    fn remove_keeps_last_member() {
        assert!(matches!(
            ensure_can_remove(&group(&["inst-a"]), "inst-a"),
            Err(Error::InvariantViolation(_))
        ));
        assert!(ensure_can_remove(&group(&["inst-a", "inst-b"]), "inst-a").is_ok());
        assert!(matches!(
            ensure_can_remove(&group(&["inst-a", "inst-b"]), "inst-c"),
            Err(Error::Validation { .. })
        ));
    }
}
