use serde::{Deserialize, Serialize};

use clubreg_core::ValueObject;

/// Role assigned to a member whose record carries none.
pub const DEFAULT_ROLE: &str = "Athlete";

/// Canonical roster member.
///
/// Every member held by a registration session has gone through
/// [`RawMember::normalize`]; the session never stores loosely-shaped records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterMember {
    /// Case-normalised role ("Athlete", "Coach", ...).
    pub role: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ValueObject for RosterMember {}

impl RosterMember {
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (true, true) => String::new(),
        }
    }
}

/// Member record as it arrives from forms, club rosters and spreadsheet rows.
///
/// All fields are optional and both camelCase and snake_case spellings are
/// accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawMember {
    #[serde(alias = "type", alias = "memberRole", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(alias = "first_name", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(alias = "last_name", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Combined name, split into first/last when those are missing.
    #[serde(alias = "fullName", alias = "full_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(alias = "phoneNumber", alias = "phone_number", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl RawMember {
    /// Fill defaults and canonicalise casing.
    pub fn normalize(self, default_role: &str) -> RosterMember {
        let mut first_name = non_blank(self.first_name).unwrap_or_default();
        let mut last_name = non_blank(self.last_name).unwrap_or_default();

        if first_name.is_empty() && last_name.is_empty() {
            if let Some(full) = non_blank(self.name) {
                match full.split_once(char::is_whitespace) {
                    Some((first, rest)) => {
                        first_name = first.to_string();
                        last_name = rest.trim().to_string();
                    }
                    None => first_name = full,
                }
            }
        }

        RosterMember {
            role: normalize_role(self.role.as_deref(), default_role),
            first_name,
            last_name,
            email: non_blank(self.email),
            phone: non_blank(self.phone),
        }
    }
}

impl From<RosterMember> for RawMember {
    fn from(member: RosterMember) -> Self {
        Self {
            role: Some(member.role),
            first_name: Some(member.first_name),
            last_name: Some(member.last_name),
            name: None,
            email: member.email,
            phone: member.phone,
        }
    }
}

/// First letter upper case, the rest lower case; blank roles fall back to
/// `default_role`.
pub fn normalize_role(raw: Option<&str>, default_role: &str) -> String {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return default_role.to_string();
    }

    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => default_role.to_string(),
    }
}

/// Normalise a whole roster in order.
pub fn normalize_roster(
    members: impl IntoIterator<Item = RawMember>,
    default_role: &str,
) -> Vec<RosterMember> {
    members
        .into_iter()
        .map(|m| m.normalize(default_role))
        .collect()
}

/// Head count of a roster, saturating at `u32::MAX`.
pub fn roster_size(members: &[RosterMember]) -> u32 {
    saturating_u32(members.len())
}

fn saturating_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn role_casing_is_canonicalised() {
        assert_eq!(normalize_role(Some("COACH"), DEFAULT_ROLE), "Coach");
        assert_eq!(normalize_role(Some("  athlete "), DEFAULT_ROLE), "Athlete");
        assert_eq!(normalize_role(Some("aLTERNATE"), DEFAULT_ROLE), "Alternate");
    }

    #[test]
    fn blank_role_uses_default() {
        assert_eq!(normalize_role(None, DEFAULT_ROLE), "Athlete");
        assert_eq!(normalize_role(Some("   "), "Participant"), "Participant");
    }

    #[test]
    fn combined_name_is_split_when_parts_missing() {
        let raw = RawMember {
            name: Some("  Jo  van der Berg ".to_string()),
            ..RawMember::default()
        };
        let member = raw.normalize(DEFAULT_ROLE);
        assert_eq!(member.first_name, "Jo");
        assert_eq!(member.last_name, "van der Berg");
        assert_eq!(member.role, "Athlete");
    }

    #[test]
    fn explicit_parts_win_over_combined_name() {
        let raw = RawMember {
            first_name: Some("Ana".to_string()),
            name: Some("Someone Else".to_string()),
            ..RawMember::default()
        };
        let member = raw.normalize(DEFAULT_ROLE);
        assert_eq!(member.full_name(), "Ana");
    }

    #[test]
    fn blank_contact_fields_become_none() {
        let raw = RawMember {
            email: Some("   ".to_string()),
            phone: Some(" 555-0100 ".to_string()),
            ..RawMember::default()
        };
        let member = raw.normalize(DEFAULT_ROLE);
        assert_eq!(member.email, None);
        assert_eq!(member.phone.as_deref(), Some("555-0100"));
    }

    #[test]
    fn accepts_camel_case_and_aliases() {
        let raw: RawMember = serde_json::from_str(
            r#"{"type":"coach","firstName":"Lee","lastName":"Park","phoneNumber":"1"}"#,
        )
        .unwrap();
        let member = raw.normalize(DEFAULT_ROLE);
        assert_eq!(member.role, "Coach");
        assert_eq!(member.full_name(), "Lee Park");
        assert_eq!(member.phone.as_deref(), Some("1"));
    }

    #[test]
    fn roster_size_counts_members() {
        let roster = normalize_roster(
            vec![RawMember::default(), RawMember::default()],
            DEFAULT_ROLE,
        );
        assert_eq!(roster_size(&roster), 2);
        assert_eq!(roster_size(&[]), 0);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn oversized_counts_saturate() {
        assert_eq!(saturating_u32(usize::MAX), u32::MAX);
        assert_eq!(saturating_u32(u32::MAX as usize + 1), u32::MAX);
    }

    proptest! {
        #[test]
        fn normalisation_is_idempotent(
            role in "[A-Za-z ]{0,12}",
            first in "[A-Za-z]{0,8}",
            last in "[A-Za-z]{0,8}",
        ) {
            let raw = RawMember {
                role: Some(role),
                first_name: Some(first),
                last_name: Some(last),
                ..RawMember::default()
            };
            let once = raw.normalize(DEFAULT_ROLE);
            let twice = RawMember::from(once.clone()).normalize(DEFAULT_ROLE);
            prop_assert_eq!(once, twice);
        }
    }
}
