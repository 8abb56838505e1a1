use insta_cmd::assert_cmd_snapshot;

use crate::{PACKAGE_TREE, TestCase};

#[test]
fn walks_package_tree() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;

    assert_cmd_snapshot!(case.command().args(["-M", "pkg"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    pkg
    pkg.a
    pkg.b
    pkg.sub
    pkg.sub.c

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn non_recursive_module_is_alone() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;

    assert_cmd_snapshot!(case.command().args(["-m", "pkg"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    pkg

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn roots_are_walked_in_command_line_order() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;
    case.write_file("tool.py", "")?;

    assert_cmd_snapshot!(case.command().args(["-m", "tool", "-M", "pkg.sub", "-m", "pkg.b"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    tool
    pkg.sub
    pkg.sub.c
    pkg.b

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn duplicate_roots_are_skipped() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;

    assert_cmd_snapshot!(case.command().args(["-M", "pkg", "-m", "pkg.a"]), @r#"
    success: true
    exit_code: 0
    ----- stdout -----
    pkg
    pkg.a
    pkg.b
    pkg.sub
    pkg.sub.c

    ----- stderr -----
     WARN module "pkg.a" already visited (skipping)
    "#);

    Ok(())
}

#[test]
fn broken_sub_modules_are_skipped() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;
    case.write_files([
        ("pkg/broken.py", "def oops(:\n"),
        ("pkg/not-a-module.py", ""),
        ("pkg/1st.py", ""),
        ("pkg/notes.txt", ""),
    ])?;

    assert_cmd_snapshot!(case.command().args(["-v", "-M", "pkg"]), @r#"
    success: true
    exit_code: 0
    ----- stdout -----
    pkg
    pkg.a
    pkg.b
    pkg.sub
    pkg.sub.c

    ----- stderr -----
     INFO unable to load "pkg.broken" (skipping)
    "#);

    Ok(())
}

#[test]
fn broken_sub_modules_are_silent_by_default() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;
    case.write_file("pkg/broken.py", "def oops(:\n")?;

    assert_cmd_snapshot!(case.command().args(["-M", "pkg"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    pkg
    pkg.a
    pkg.b
    pkg.sub
    pkg.sub.c

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn missing_module_aborts() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;

    assert_cmd_snapshot!(case.command().args(["-M", "pkg", "-M", "nope"]), @r"
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
fn missing_module_is_reported_when_ignored() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;

    assert_cmd_snapshot!(case.command().args(["-i", "-m", "nope", "-m", "pkg"]), @r#"
    success: true
    exit_code: 0
    ----- stdout -----
    pkg

    ----- stderr -----
    ERROR unable to load "nope" (skipping)
    "#);

    Ok(())
}

#[test]
fn last_import_error_flag_wins() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;

    assert_cmd_snapshot!(case.command().args(["-i", "-I", "-m", "nope"]), @r"
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
fn import_error_flags_apply_to_later_modules() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;

    assert_cmd_snapshot!(case.command().args(["-m", "pkg", "-i", "-m", "nope"]), @r#"
    success: true
    exit_code: 0
    ----- stdout -----
    pkg

    ----- stderr -----
    ERROR unable to load "nope" (skipping)
    "#);

    assert_cmd_snapshot!(case.command().args(["-m", "nope", "-i", "-m", "pkg"]), @r"
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
fn invalid_module_name() -> anyhow::Result<()> {
    let case = TestCase::new()?;

    assert_cmd_snapshot!(case.command().args(["-m", "not-valid"]), @r"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    modwalk failed
      Cause: Failed to load a requested module
      Cause: `not-valid` is not a valid module name
    ");

    Ok(())
}

#[test]
fn children_of_plain_modules_fail() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;

    assert_cmd_snapshot!(case.command().args(["-m", "pkg.a.inner"]), @r"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    modwalk failed
      Cause: Failed to load a requested module
      Cause: `pkg.a` is not a package, so `pkg.a.inner` cannot be imported from it
    ");

    Ok(())
}

#[test]
fn search_path_flag() -> anyhow::Result<()> {
    let case = TestCase::with_files([("src/lib_mod.py", ""), ("lib_mod.py", "")])?;

    assert_cmd_snapshot!(case.command().args(["-p", "src", "-m", "lib_mod", "-c", "path"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    <temp_dir>/src/lib_mod.py

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn arguments_from_file() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;
    case.write_file("args.txt", "-M\npkg.sub\n")?;

    assert_cmd_snapshot!(case.command().arg("@args.txt"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    pkg.sub
    pkg.sub.c

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn help_without_modules() -> anyhow::Result<()> {
    let case = TestCase::new()?;

    let output = case.command().output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(output.status.success());
    assert!(stdout.contains("Usage: modwalk"), "{stdout}");
    assert!(stdout.contains("-M <MODULE>..."), "{stdout}");

    Ok(())
}

#[test]
fn version() -> anyhow::Result<()> {
    let case = TestCase::new()?;

    assert_cmd_snapshot!(case.command().arg("--version"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    modwalk 0.1.0

    ----- stderr -----
    ");

    Ok(())
}

#[cfg(unix)]
#[test]
fn dangling_links_are_ignored() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;
    std::os::unix::fs::symlink(
        case.root().join("missing.py"),
        case.root().join("pkg/dangling.py"),
    )?;

    assert_cmd_snapshot!(case.command().args(["-M", "pkg"]).env("MODWALK_LOG", "modwalk_core::diagnostic=debug"), @r#"
    success: true
    exit_code: 0
    ----- stdout -----
    pkg
    pkg.a
    pkg.b
    pkg.sub
    pkg.sub.c

    ----- stderr -----
    DEBUG "<temp_dir>/pkg/dangling.py" is of unknown type (skipping)
    "#);

    Ok(())
}
