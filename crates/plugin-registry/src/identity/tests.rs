//! Unit tests for creator identities.

use rstest::rstest;

use super::*;

#[test]
fn accessors_return_fields() {
    let identity = CreatorIdentity::new("Foo", "1", "ns");
    assert_eq!(identity.name(), "Foo");
    assert_eq!(identity.version(), "1");
    assert_eq!(identity.namespace(), "ns");
}

#[rstest]
#[case::exact("Foo", "1", "ns", true)]
#[case::name_case("foo", "1", "ns", false)]
#[case::version("Foo", "1.0", "ns", false)]
#[case::empty_namespace("Foo", "1", "", false)]
#[case::padded_name("Foo ", "1", "ns", false)]
fn matching_is_exact(
    #[case] name: &str,
    #[case] version: &str,
    #[case] namespace: &str,
    #[case] expected: bool,
) {
    let identity = CreatorIdentity::new("Foo", "1", "ns");
    assert_eq!(identity.matches(name, version, namespace), expected);
}

#[test]
fn identities_differing_only_in_namespace_are_distinct() {
    let scoped = CreatorIdentity::new("Foo", "1", "ns");
    let unscoped = CreatorIdentity::new("Foo", "1", "");
    assert_ne!(scoped, unscoped);
}

#[test]
fn checked_accepts_largest_legal_field() {
    let name = "n".repeat(MAX_IDENTITY_BYTES - 1);
    let identity = CreatorIdentity::checked(name.as_str(), "1", "").expect("legal length");
    assert_eq!(identity.name().len(), MAX_IDENTITY_BYTES - 1);
}

#[rstest]
#[case::long_name("n".repeat(MAX_IDENTITY_BYTES), String::from("1"), String::new(), IdentityField::Name)]
#[case::long_version(String::from("Foo"), "v".repeat(MAX_IDENTITY_BYTES + 10), String::new(), IdentityField::Version)]
#[case::nul_namespace(String::from("Foo"), String::from("1"), String::from("n\0s"), IdentityField::Namespace)]
fn checked_rejects_contract_violations(
    #[case] name: String,
    #[case] version: String,
    #[case] namespace: String,
    #[case] expected_field: IdentityField,
) {
    let error = CreatorIdentity::checked(name, version, namespace)
        .expect_err("contract violation should be rejected");
    match error {
        RegistryError::ContractViolation { field, .. } => assert_eq!(field, expected_field),
        other => panic!("expected ContractViolation, got {other}"),
    }
}

#[test]
fn checked_never_truncates() {
    let name = "x".repeat(MAX_IDENTITY_BYTES * 2);
    let error = CreatorIdentity::checked(name, "1", "").expect_err("should reject");
    assert!(matches!(
        error,
        RegistryError::ContractViolation { len, .. } if len == MAX_IDENTITY_BYTES * 2
    ));
}

#[test]
fn check_lookup_flags_oversized_namespace() {
    let namespace = "n".repeat(MAX_IDENTITY_BYTES);
    assert!(check_lookup("Foo", "1", &namespace).is_err());
    assert!(check_lookup("Foo", "1", "ns").is_ok());
}
