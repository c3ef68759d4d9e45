//! Tests for the domain user model.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn stored_user() -> User {
    User {
        id: UserId::new(7).expect("valid id"),
        email: "ada@example.com".to_owned(),
        name: "Ada".to_owned(),
        created_at: Utc
            .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp"),
    }
}

#[rstest]
#[case(0)]
#[case(-1)]
#[case(i64::MIN)]
fn user_id_rejects_non_positive_values(#[case] raw: i64) {
    let err = UserId::new(raw).expect_err("non-positive ids rejected");
    assert_eq!(err, UserValidationError::NonPositiveId { id: raw });
}

#[rstest]
fn user_id_deserialisation_enforces_positivity() {
    let err = serde_json::from_value::<UserId>(json!(0));
    assert!(err.is_err());

    let id: UserId = serde_json::from_value(json!(12)).expect("positive id");
    assert_eq!(id.get(), 12);
}

#[rstest]
#[case("", "Ada", UserValidationError::EmptyEmail)]
#[case("   ", "Ada", UserValidationError::EmptyEmail)]
#[case("ada@example.com", "", UserValidationError::EmptyName)]
#[case("ada@example.com", "\t", UserValidationError::EmptyName)]
fn new_user_requires_email_and_name(
    #[case] email: &str,
    #[case] name: &str,
    #[case] expected: UserValidationError,
) {
    let err = NewUser::new(email, name).expect_err("blank input rejected");
    assert_eq!(err, expected);
}

#[rstest]
#[case(" ", "Ada", "email must not be empty or blank")]
#[case("ada@example.com", "  ", "name must not be empty or blank")]
fn whitespace_only_input_is_reported_as_blank(
    #[case] email: &str,
    #[case] name: &str,
    #[case] expected: &str,
) {
    let err = NewUser::new(email, name).expect_err("blank input rejected");
    assert_eq!(err.to_string(), expected);
}

#[rstest]
fn user_changes_reject_noop_updates() {
    let id = UserId::new(1).expect("valid id");
    let err = UserChanges::new(id, Some(String::new()), Some("  ".to_owned()))
        .expect_err("no-op update rejected");
    assert_eq!(err, UserValidationError::NothingToUpdate);
}

#[rstest]
fn user_changes_keep_untouched_fields(stored_user: User) {
    let changes = UserChanges::new(stored_user.id, None, Some("Ada Lovelace".to_owned()))
        .expect("valid change set");

    let updated = changes.apply_to(&stored_user);

    assert_eq!(updated.email, stored_user.email);
    assert_eq!(updated.name, "Ada Lovelace");
    assert_eq!(updated.created_at, stored_user.created_at);
}

#[rstest]
fn user_serialises_for_the_cache(stored_user: User) {
    let value = serde_json::to_value(&stored_user).expect("serialise");
    assert_eq!(value.get("id"), Some(&json!(7)));

    let decoded: User = serde_json::from_value(value).expect("deserialise");
    assert_eq!(decoded, stored_user);
}
