use insta_cmd::assert_cmd_snapshot;

use crate::{PACKAGE_TREE, TestCase};

#[test]
fn callbacks_from_modwalk_toml() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;
    case.write_file("modwalk.toml", r#"callbacks = ["packages_only", "print"]"#)?;

    assert_cmd_snapshot!(case.command().args(["-M", "pkg"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    pkg
    pkg.sub

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn command_line_callbacks_win() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;
    case.write_file("modwalk.toml", r#"callbacks = ["packages_only", "print"]"#)?;

    assert_cmd_snapshot!(case.command().args(["-m", "pkg.a", "-c", "members"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    pkg.a: first, Thing

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn search_paths_are_relative_to_the_configuration() -> anyhow::Result<()> {
    let case = TestCase::with_files([
        ("modwalk.toml", r#"search-paths = ["src"]"#),
        ("src/app/__init__.py", ""),
        ("src/app/main.py", ""),
        ("docs/readme.txt", ""),
    ])?;

    assert_cmd_snapshot!(case.command().args(["-M", "app", "-c", "path"]).current_dir(case.root().join("docs")), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    <temp_dir>/src/app/__init__.py
    <temp_dir>/src/app/main.py

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn pyproject_tool_section() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;
    case.write_file(
        "pyproject.toml",
        r#"
        [project]
        name = "demo"

        [tool.modwalk]
        ignore-import-errors = true

        [tool.modwalk.log]
        explicit-import-level = "warn"
        "#,
    )?;

    assert_cmd_snapshot!(case.command().args(["-m", "nope", "-m", "pkg"]), @r#"
    success: true
    exit_code: 0
    ----- stdout -----
    pkg

    ----- stderr -----
     WARN unable to load "nope" (skipping)
    "#);

    Ok(())
}

#[test]
fn command_line_overrides_ignore_import_errors() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;
    case.write_file("modwalk.toml", "ignore-import-errors = true")?;

    assert_cmd_snapshot!(case.command().args(["-I", "-m", "nope"]), @r"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    modwalk failed
      Cause: Failed to load a requested module
      Cause: no module named `nope`
    ");

    Ok(())
}

#[test]
fn discovered_import_level() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;
    case.write_files([
        ("pkg/broken.py", "def oops(:\n"),
        (
            "modwalk.toml",
            r#"
            [log]
            discovered-import-level = "error"
            "#,
        ),
    ])?;

    assert_cmd_snapshot!(case.command().args(["-M", "pkg", "-C"]), @r#"
    success: true
    exit_code: 0
    ----- stdout -----

    ----- stderr -----
    ERROR unable to load "pkg.broken" (skipping)
    "#);

    Ok(())
}

#[test]
fn explicit_config_file() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;
    case.write_files([
        ("modwalk.toml", r#"callbacks = ["path"]"#),
        ("configs/custom.toml", r#"
            search-paths = [".."]
            callbacks = ["doc"]
            "#),
    ])?;

    assert_cmd_snapshot!(case.command().args(["--config-file", "configs/custom.toml", "-m", "pkg"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    pkg: The package.

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn config_file_from_environment() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;
    case.write_file("custom.toml", r#"callbacks = ["members"]"#)?;

    assert_cmd_snapshot!(case.command().args(["-m", "pkg.sub.c"]).env("MODWALK_CONFIG_FILE", "custom.toml"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    pkg.sub.c: helper

    ----- stderr -----
    ");

    Ok(())
}

#[cfg(unix)]
#[test]
fn user_configuration_is_a_fallback() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;
    case.write_files([
        (
            ".config/modwalk/modwalk.toml",
            r#"
            callbacks = ["path"]
            ignore-import-errors = true
            "#,
        ),
        ("modwalk.toml", r#"callbacks = ["print"]"#),
    ])?;

    assert_cmd_snapshot!(case.command().args(["-m", "missing", "-m", "pkg.b"]), @r#"
    success: true
    exit_code: 0
    ----- stdout -----
    pkg.b

    ----- stderr -----
    ERROR unable to load "missing" (skipping)
    "#);

    Ok(())
}

#[test]
fn empty_search_paths_are_rejected() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;
    case.write_file("modwalk.toml", "search-paths = []")?;

    assert_cmd_snapshot!(case.command().args(["-m", "pkg"]), @r"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    modwalk failed
      Cause: Invalid configuration
      Cause: `search-paths` must contain at least one directory
    ");

    Ok(())
}

#[test]
fn unknown_options_are_rejected() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;
    case.write_file("modwalk.toml", "recurse = true")?;

    let output = case.command().args(["-m", "pkg"]).output()?;
    let stderr = String::from_utf8(output.stderr)?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.starts_with("modwalk failed"), "{stderr}");
    assert!(stderr.contains("unknown field `recurse`"), "{stderr}");

    Ok(())
}

#[test]
fn import_error_flag_applies_to_configured_callbacks() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;
    case.write_file("modwalk.toml", r#"callbacks = ["shout", "print"]"#)?;

    assert_cmd_snapshot!(case.command().args(["-m", "pkg", "-i"]), @r#"
    success: true
    exit_code: 0
    ----- stdout -----
    pkg

    ----- stderr -----
    ERROR unable to load "shout" (skipping)
    "#);

    Ok(())
}
