//! End-to-end tests for the `stackbuild validate` command.

#[allow(dead_code)]
mod common;
use common::prelude::*;

#[test]
fn test_validate_valid_profile() {
    let fixture = TestFixture::new().with_profile(profiles::TWO_COMPONENTS);
    fixture
        .command()
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile 'pair' is valid (2 component(s))"))
        .stdout(predicate::str::contains("#0 nginx-1.0.5 (http, http-gzip)"))
        .stdout(predicate::str::contains("#1 nginx-0.8.55 (no modules)"));
}

#[test]
fn test_validate_explicit_profile_path() {
    let fixture = TestFixture::new().with_file("profiles/web.yaml", profiles::SINGLE);
    fixture
        .command()
        .arg("validate")
        .arg("--profile")
        .arg(fixture.path().join("profiles/web.yaml"))
        .assert()
        .success();
}

#[test]
fn test_validate_profile_from_env() {
    let fixture = TestFixture::new().with_file("web.yaml", profiles::SINGLE);
    fixture
        .command()
        .env("STACKBUILD_PROFILE", fixture.path().join("web.yaml"))
        .arg("validate")
        .assert()
        .success();
}

#[test]
fn test_validate_unsupported_version() {
    let fixture = TestFixture::new().with_profile(profiles::UNSUPPORTED_VERSION);
    fixture
        .command()
        .arg("validate")
        .assert()
        .code(65)
        .stdout(predicate::str::contains("[ERR] Profile is invalid"))
        .stderr(predicate::str::contains("Unsupported version '1.25.3'"))
        .stderr(predicate::str::contains("newest supported version is 1.0.5"));
}

#[test]
fn test_validate_relative_path_override() {
    let fixture = TestFixture::new().with_profile(profiles::RELATIVE_PATH);
    fixture
        .command()
        .arg("validate")
        .assert()
        .code(65)
        .stderr(predicate::str::contains("Invalid path 'etc/nginx.conf'"));
}

#[test]
fn test_validate_unknown_application() {
    let fixture = TestFixture::new().with_profile(profiles::UNKNOWN_APPLICATION);
    fixture
        .command()
        .arg("validate")
        .assert()
        .code(65)
        .stderr(predicate::str::contains("Unknown application 'apache'"))
        .stderr(predicate::str::contains("registered applications are: nginx"));
}

#[test]
fn test_validate_missing_metadata() {
    let fixture = TestFixture::new().with_profile(profiles::MISSING_DESCRIPTION);
    fixture
        .command()
        .arg("validate")
        .assert()
        .code(65)
        .stderr(predicate::str::contains("missing required key 'description'"));
}

#[test]
fn test_validate_extra_key_warns_by_default() {
    let fixture = TestFixture::new().with_profile(profiles::EXTRA_KEY);
    fixture
        .command()
        .arg("validate")
        .assert()
        .success()
        .stderr(predicate::str::contains("Ignoring unrecognized key 'user'"));
}

#[test]
fn test_validate_output_level_hides_warnings_from_terminal() {
    let fixture = TestFixture::new().with_profile(profiles::EXTRA_KEY);
    fixture
        .command()
        .arg("--output-level")
        .arg("error")
        .arg("validate")
        .assert()
        .success()
        .stderr(predicate::str::contains("Ignoring unrecognized key").not());
}

#[test]
fn test_validate_extra_key_rejected_when_strict() {
    let fixture = TestFixture::new().with_profile(profiles::EXTRA_KEY);
    fixture
        .command()
        .arg("validate")
        .arg("--strict")
        .assert()
        .code(65)
        .stderr(predicate::str::contains("Unrecognized key 'user' in component #0"));
}

#[test]
fn test_validate_missing_profile() {
    let fixture = TestFixture::new();
    fixture
        .command()
        .arg("validate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Profile not found"))
        .stderr(predicate::str::contains("hint: Use -p/--profile"));
}
